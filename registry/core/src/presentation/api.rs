// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::application::registry_service::{Presence, RegisterAgent, RegistryError, RegistryService};
use crate::domain::agent::AgentId;
use crate::presentation::types::{
    AgentList, ErrorResponse, HealthResponse, LookupResponse, PresenceStatus, RegisterRequest, RegisterResponse,
};

pub const PING_FRAME: &str = r#"{"type":"ping"}"#;
pub const MISSING_AGENT_FRAME: &str = r#"{"error":"missing agent ID"}"#;

pub struct AppState {
    pub registry: Arc<RegistryService>,
    pub heartbeat_interval: Duration,
    /// Callback URL host when the request has no Host header
    pub public_host: Option<String>,
    /// Fired on process shutdown; ends every WebSocket session
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(registry: Arc<RegistryService>, heartbeat_interval: Duration) -> Self {
        Self {
            registry,
            heartbeat_interval,
            public_host: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_public_host(mut self, host: Option<String>) -> Self {
        self.public_host = host;
        self
    }

    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/register", post(register_agent))
        .route("/v1/lookup", get(missing_agent_id))
        .route("/v1/lookup/", get(missing_agent_id))
        .route("/v1/lookup/{agent_id}", get(lookup_agent))
        .route("/v1/agents", get(list_agents))
        .route("/v1/ws", get(heartbeat_socket))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegistryError::AttestationRejected(_) => StatusCode::FORBIDDEN,
            RegistryError::MissingField(_)
            | RegistryError::MalformedBody(_)
            | RegistryError::MissingAgentId => StatusCode::BAD_REQUEST,
        };
        debug!(status = status.as_u16(), error = %self, "Rejected client request");
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn register_agent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RegisterResponse>, RegistryError> {
    let request: RegisterRequest =
        serde_json::from_slice(&body).map_err(|e| RegistryError::MalformedBody(e.to_string()))?;

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| state.public_host.clone())
        .unwrap_or_else(|| "localhost".to_string());

    let command = RegisterAgent {
        agent_id: request.agent_id,
        endpoint: request.endpoint,
        mode: request.mode,
        attestation: request.attestation,
    };
    let registration = state.registry.register(command, &host).await?;

    Ok(Json(RegisterResponse {
        confirmed: true,
        url: registration.callback_url,
        status: "online".to_string(),
    }))
}

async fn missing_agent_id() -> RegistryError {
    RegistryError::MissingAgentId
}

async fn lookup_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Result<Json<LookupResponse>, RegistryError> {
    let response = match state.registry.lookup(&agent_id).await? {
        Presence::Unknown => LookupResponse::not_found(),
        Presence::Known {
            agent,
            online,
            attestation_valid,
        } => LookupResponse {
            status: if online { PresenceStatus::Online } else { PresenceStatus::Offline },
            endpoint: Some(agent.endpoint),
            mode: agent.mode,
            attestation_valid,
            last_seen: Some(agent.last_seen.to_rfc3339_opts(SecondsFormat::Secs, true)),
            error: None,
        },
    };
    Ok(Json(response))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<AgentList> {
    let agents = state.registry.list_online();
    let count = agents.len();
    Json(AgentList { agents, count })
}

#[derive(Debug, Deserialize)]
struct HeartbeatParams {
    agent: Option<String>,
}

async fn heartbeat_socket(
    ws: WebSocketUpgrade,
    Query(params): Query<HeartbeatParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| heartbeat_session(socket, params.agent, state))
}

/// Per-agent heartbeat loop.
///
/// Every interval the server writes a ping frame and, only if that write
/// succeeded, touches the agent. The client is never required to answer.
/// Inbound frames are drained so a client close is noticed; they never count
/// as heartbeats.
async fn heartbeat_session(mut socket: WebSocket, agent: Option<String>, state: Arc<AppState>) {
    let Some(agent_id) = agent.filter(|a| !a.is_empty()).map(AgentId::new) else {
        let _ = socket.send(Message::Text(MISSING_AGENT_FRAME.into())).await;
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    info!(agent_id = %agent_id, "WebSocket connected");

    let period = state.heartbeat_interval;
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = socket.send(Message::Text(PING_FRAME.into())).await {
                    warn!(agent_id = %agent_id, "Ping failed: {}", e);
                    break;
                }
                state.registry.heartbeat(&agent_id);
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    debug!(agent_id = %agent_id, "Client closed WebSocket");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(agent_id = %agent_id, "WebSocket receive failed: {}", e);
                    break;
                }
            },
            _ = state.shutdown.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    info!(agent_id = %agent_id, "WebSocket session ended");
}

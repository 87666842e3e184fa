// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::types::{AgentList, ClientError, ErrorResponse, HealthResponse, LookupResponse, RegisterRequest, RegisterResponse};

pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a BotCall registry.
#[derive(Clone)]
pub struct BotcallClient {
    base_url: String,
    client: Client,
}

impl BotcallClient {
    /// Create a new client for the registry at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(base_url, client)
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_http_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register (or re-register) an agent.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        let url = format!("{}/v1/register", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let registered: RegisterResponse = decode(response).await?;

        if !registered.confirmed {
            return Err(ClientError::Rejected);
        }
        Ok(registered)
    }

    /// Look up an agent. Unknown agents come back as `offline` with an error
    /// message, not as an `Err`.
    pub async fn lookup(&self, agent_id: &str) -> Result<LookupResponse, ClientError> {
        let url = format!("{}/v1/lookup/{}", self.base_url, encode(agent_id));
        decode(self.client.get(&url).send().await?).await
    }

    /// Every agent the registry currently considers online.
    pub async fn list_agents(&self) -> Result<AgentList, ClientError> {
        let url = format!("{}/v1/agents", self.base_url);
        decode(self.client.get(&url).send().await?).await
    }

    /// Registry process health.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        decode(self.client.get(&url).send().await?).await
    }

    /// WebSocket URL whose server-sent pings keep `agent_id` online.
    pub fn heartbeat_url(&self, agent_id: &str) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/v1/ws?agent={}", ws_base, encode(agent_id))
    }

    /// Re-register every `interval`, starting immediately, until the returned
    /// handle is stopped or dropped. Failures are logged and retried on the
    /// next tick.
    pub fn start_keepalive(&self, request: RegisterRequest, interval: Duration) -> KeepaliveHandle {
        let token = CancellationToken::new();
        let client = self.clone();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        match client.register(&request).await {
                            Ok(resp) => debug!(agent_id = %request.agent_id, status = %resp.status, "Keepalive registration confirmed"),
                            Err(e) => warn!(agent_id = %request.agent_id, "Keepalive failed: {}", e),
                        }
                    }
                    _ = cancelled.cancelled() => break,
                }
            }
            info!(agent_id = %request.agent_id, "Keepalive stopped");
        });

        KeepaliveHandle { token, handle: Some(handle) }
    }
}

impl Default for BotcallClient {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

/// Owns a keepalive task. Dropping it stops the task.
pub struct KeepaliveHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl KeepaliveHandle {
    /// Stop re-registering and wait for the task to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_url_scheme() {
        let client = BotcallClient::new("http://localhost:8080/");
        assert_eq!(client.heartbeat_url("orion"), "ws://localhost:8080/v1/ws?agent=orion");

        let client = BotcallClient::new("https://registry.example.com");
        assert_eq!(client.heartbeat_url("my bot"), "wss://registry.example.com/v1/ws?agent=my%20bot");
    }

    #[test]
    fn test_default_points_at_local_registry() {
        assert_eq!(BotcallClient::default().base_url(), DEFAULT_REGISTRY_URL);
    }
}

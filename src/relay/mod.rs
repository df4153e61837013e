pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::info;

pub use dto::RelayEvent;

/// Where and how outbound events are delivered. `api_key` doubles as the
/// shared secret inbound n8n calls must present.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("n8n webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("n8n webhook URL not configured")]
    NotConfigured,
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn deliver(&self, event: &RelayEvent) -> Result<(), RelayError>;

    fn is_configured(&self) -> bool;
}

pub struct HttpRelayClient {
    client: Client,
    config: RelayConfig,
}

impl HttpRelayClient {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn deliver(&self, event: &RelayEvent) -> Result<(), RelayError> {
        let url = self
            .config
            .webhook_url
            .as_deref()
            .ok_or(RelayError::NotConfigured)?;

        let mut request = self.client.post(url).json(event);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::HttpStatus(status.as_u16()));
        }

        info!("delivered {} event {} to n8n", event.name(), event.event_id());
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.config.webhook_url.is_some()
    }
}

/// Used when no webhook URL is configured. Every delivery is refused.
pub struct NoopRelayClient;

#[async_trait]
impl RelayClient for NoopRelayClient {
    async fn deliver(&self, _event: &RelayEvent) -> Result<(), RelayError> {
        Err(RelayError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

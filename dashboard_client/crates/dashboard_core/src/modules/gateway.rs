use crate::modules::config::DashboardConfig;
use crate::modules::protocol::RawPayload;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const MAX_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("plugin api request failed: status={status} body={body}")]
    BadStatus { status: StatusCode, body: String },
    #[error("plugin api response decode failed: {0}")]
    Decode(String),
    #[error("plugin api unavailable: {0}")]
    Unavailable(String),
    #[error("exhausted retries")]
    Exhausted,
}

/// Where the raw payload lives. The dashboard only ever reads the whole
/// document and writes the whole document back.
#[trait_variant::make(RemoteGateway: Send)]
pub trait LocalRemoteGateway {
    async fn fetch(&self) -> Result<RawPayload, GatewayError>;

    /// Replaces the remote document. Last writer wins.
    async fn persist(&self, payload: &RawPayload) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    url: String,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl HttpGateway {
    pub fn new(config: &DashboardConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.api_url.to_string(),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_with_retry(
        &self,
        what: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let mut backoff = self.initial_backoff;
        for attempt in 1..=self.max_attempts {
            let last = attempt == self.max_attempts;
            match build().send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    let retryable =
                        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                    if !retryable || last {
                        return Err(GatewayError::BadStatus { status, body });
                    }
                    tracing::warn!(attempt, %status, "{what} failed, retrying in {backoff:?}");
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect() || e.is_request();
                    if !retryable || last {
                        return Err(GatewayError::Http(e));
                    }
                    tracing::warn!(attempt, error = %e, "{what} failed, retrying in {backoff:?}");
                }
            }
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }

        Err(GatewayError::Exhausted)
    }
}

impl RemoteGateway for HttpGateway {
    async fn fetch(&self) -> Result<RawPayload, GatewayError> {
        let resp = self
            .send_with_retry("GET", || self.client.get(&self.url))
            .await?;
        let body = resp.text().await?;
        let payload: RawPayload =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        tracing::info!(
            tabs = payload.tab_data.len(),
            plugins = payload.plugins.len(),
            "fetched plugin payload"
        );
        Ok(payload)
    }

    async fn persist(&self, payload: &RawPayload) -> Result<(), GatewayError> {
        self.send_with_retry("POST", || self.client.post(&self.url).json(payload))
            .await?;
        tracing::info!("persisted plugin payload");
        Ok(())
    }
}

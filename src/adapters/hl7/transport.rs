//! HTTP transport for rendered HL7 messages

use crate::config::{NotifierConfig, RetryConfig};
use crate::domain::errors::{SyncError, TransportError};
use crate::domain::result::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Submits one message and returns the raw response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, message: &str) -> std::result::Result<String, TransportError>;
}

/// POSTs messages to the configured endpoint
///
/// # Example
///
/// ```no_run
/// use ward_sync::adapters::hl7::{HttpTransport, Transport};
/// use ward_sync::config::NotifierConfig;
///
/// # async fn example(config: NotifierConfig) -> ward_sync::domain::Result<()> {
/// let transport = HttpTransport::new(&config)?;
/// let body = transport.submit("MSH|^~\\&|HUAP").await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    content_type: String,
    bearer: Option<String>,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Builds the HTTP client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client cannot be built
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            content_type: config.content_type.clone(),
            bearer: config.token.as_ref().map(|token| {
                let token: &str = token.expose_secret().as_ref();
                format!("Bearer {token}")
            }),
            retry: config.retry.clone(),
        })
    }

    async fn send_once(&self, message: &str) -> std::result::Result<String, TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, self.content_type.as_str())
            .body(message.to_string());

        if let Some(auth) = &self.bearer {
            request = request.header(AUTHORIZATION, auth.as_str());
        }

        let resp = request.send().await.map_err(classify)?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        let factor = self.retry.backoff_multiplier.powf((attempt - 1) as f64);
        let delay_ms = (self.retry.initial_delay_ms as f64 * factor) as u64;
        Duration::from_millis(delay_ms.min(self.retry.max_delay_ms))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Sends with bounded exponential backoff on retryable failures
    async fn submit(&self, message: &str) -> std::result::Result<String, TransportError> {
        let mut attempt = 0;

        loop {
            match self.send_once(message).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    if !e.is_retryable() || attempt > self.retry.max_retries {
                        return Err(e);
                    }

                    let delay = self.backoff_delay(attempt);
                    crate::log_retry_attempt!(attempt, self.retry.max_retries, delay, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

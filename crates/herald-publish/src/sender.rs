//! Message transport seam
//!
//! Announcers hand their rendered [`Message`] to a [`Sender`]. Production
//! senders talk HTTP; [`RecordingSender`] keeps messages in memory so the
//! pipeline can be exercised without a network.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::SendError;
use crate::processor::Message;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers one message to an external service
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, message: &Message) -> Result<(), SendError>;
}

/// HTTP client for a single delivery; connections are released on drop
pub(crate) fn http_client() -> Result<reqwest::Client, SendError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SendError::from)
}

/// Join `path` onto an API base URL
pub(crate) fn endpoint(base: &str, path: &str) -> Result<url::Url, SendError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    url::Url::parse(&raw).map_err(|e| SendError::InvalidEndpoint {
        url: raw,
        message: e.to_string(),
    })
}

/// Map a non-success response to [`SendError::Http`], body included
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), SendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(SendError::Http {
        status: status.as_u16(),
        body,
    })
}

/// In-memory sender that records every message it is given
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<Message>>>,
    failure: Option<(u16, String)>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender that records, then answers with an HTTP error
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some((status, body.into())),
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.sent().len()
    }
}

#[async_trait]
impl Sender for RecordingSender {
    async fn send(&self, message: &Message) -> Result<(), SendError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());

        match &self.failure {
            Some((status, body)) => Err(SendError::Http {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

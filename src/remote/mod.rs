//! Remote-call plumbing shared by both catalog adapters: the error taxonomy
//! and the retry/pagination primitives built on it.

pub mod fetch;

use thiserror::Error;

/// Failure of a single remote catalog call.
///
/// Transient failures (network trouble, rate limits, server errors) are worth
/// retrying; everything else propagates immediately.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("rate limited by remote service (retry-after: {retry_after:?})")]
    RateLimited { retry_after: Option<u64> },

    #[error("remote service error: http {status}: {message}")]
    Service { status: u16, message: String },

    #[error("remote request rejected: http {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::RateLimited { .. } | RemoteError::Service { .. } => true,
            RemoteError::Transport(err) => !err.is_decode(),
            RemoteError::Rejected { .. } | RemoteError::Decode(_) => false,
        }
    }
}

/// Classify a non-success HTTP response, consuming its body for the message.
pub async fn classify_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok());
    let message = response.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Err(RemoteError::RateLimited { retry_after })
    } else if status.is_server_error() {
        Err(RemoteError::Service {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

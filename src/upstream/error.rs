use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    Url(String),

    /// Final error of an operation, after retries are exhausted
    #[error("{operation} failed: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<UpstreamError>,
    },
}

impl UpstreamError {
    pub(crate) fn operation(operation: &'static str, source: UpstreamError) -> Self {
        UpstreamError::Operation {
            operation,
            source: Box::new(source),
        }
    }

    /// The innermost error, with any operation wrappers removed
    pub fn root(&self) -> &UpstreamError {
        match self {
            UpstreamError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self.root() {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 4xx responses are terminal; retrying cannot change the answer
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

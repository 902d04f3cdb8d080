use kerbside_core::SyncFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<RestError> for SyncFailure {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Api { status, message } => SyncFailure::Rejected { status, message },
            other => SyncFailure::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_becomes_rejection() {
        let failure: SyncFailure = RestError::Api {
            status: 404,
            message: Some("Bin not found".to_string()),
        }
        .into();
        assert_eq!(
            failure,
            SyncFailure::Rejected {
                status: 404,
                message: Some("Bin not found".to_string())
            }
        );
    }

    #[test]
    fn decode_error_becomes_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let failure: SyncFailure = RestError::Json(json_err).into();
        assert!(matches!(failure, SyncFailure::Transport(_)));
        assert_eq!(failure.user_message(), "Backend unreachable");
    }
}

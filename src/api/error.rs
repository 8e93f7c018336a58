//! Errors surfaced by the backend client.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable credential. Raised before any request leaves the client.
    #[error("not authenticated")]
    Unauthorized,

    /// Non-success response, status and body passed through untouched.
    #[error("backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Client-side upload constraints. No request is made when these fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported format: .{0}\nSupported formats: mp4, mov")]
    UnsupportedFormat(String),

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_is_verbatim() {
        let err = ApiError::Upstream {
            status: 404,
            body: r#"{"detail":"not found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"backend returned 404: {"detail":"not found"}"#);
    }

    #[test]
    fn test_validation_converts() {
        let err: ApiError = ValidationError::UnsupportedFormat("avi".to_string()).into();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("Unsupported format: .avi"));
    }
}

//! Error types for the ACL client

use thiserror::Error;

/// Result type alias for ACL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ACL client operations
#[derive(Error, Debug)]
pub enum Error {
    /// A PolicyLink or ServiceIdentity failed its structural check.
    /// Raised before any request is sent.
    #[error("ACL policy format error: {0}")]
    AclPolicyFormat(String),

    /// The service answered 403
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested ACL object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if this is a local validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::AclPolicyFormat(_))
    }

    /// Returns true if the service refused the call (403)
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden(_))
    }

    /// Returns true if the object was absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Status code of the response that produced this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Forbidden(_) => Some(403),
            Error::Request { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the failure looks transient. The client never
    /// retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Request { status, .. } => *status >= 500,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(Error::AclPolicyFormat("{}".into()).is_validation_error());
        assert!(Error::Forbidden("denied".into()).is_forbidden());
        assert!(Error::NotFound("ACL not found".into()).is_not_found());
        assert!(!Error::Config("bad".into()).is_not_found());
    }

    #[test]
    fn test_status_code_and_retryable() {
        let server_error = Error::Request {
            status: 503,
            body: "No cluster leader".into(),
        };
        assert_eq!(server_error.status_code(), Some(503));
        assert!(server_error.is_retryable());

        let client_error = Error::Request {
            status: 400,
            body: "Bad request".into(),
        };
        assert!(!client_error.is_retryable());
        assert_eq!(Error::Forbidden(String::new()).status_code(), Some(403));
        assert_eq!(Error::NotFound(String::new()).status_code(), None);
    }

    #[test]
    fn test_display() {
        let err = Error::Request {
            status: 500,
            body: "rpc error".into(),
        };
        assert_eq!(err.to_string(), "request failed with status 500: rpc error");
    }
}

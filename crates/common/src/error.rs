//! Error types for ocipower

use thiserror::Error;

/// Result type alias using the ocipower Error
pub type Result<T> = std::result::Result<T, Error>;

/// ocipower error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad or missing local credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credentials that cannot be used to sign, or that the provider rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The provider refused the action
    #[error("Remote action rejected ({status} {code}): {message}{}", request_id_suffix(.request_id))]
    RemoteAction {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// Transport failure before the provider answered
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid instance id: {0}")]
    InvalidInstanceId(String),

    #[error("Invalid power action: {0}")]
    InvalidAction(String),
}

fn request_id_suffix(request_id: &Option<String>) -> String {
    match request_id {
        Some(id) => format!(" [opc-request-id: {}]", id),
        None => String::new(),
    }
}

impl Error {
    /// True when the provider answered and refused the request
    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Error::RemoteAction { .. })
    }

    /// Provider error code, if any
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Error::RemoteAction { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_action_display() {
        let err = Error::RemoteAction {
            status: 404,
            code: "NotAuthorizedOrNotFound".to_string(),
            message: "instance not found".to_string(),
            request_id: Some("ABC123".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Remote action rejected (404 NotAuthorizedOrNotFound): instance not found [opc-request-id: ABC123]"
        );
        assert!(err.is_remote_rejection());
        assert_eq!(err.remote_code(), Some("NotAuthorizedOrNotFound"));
    }

    #[test]
    fn test_only_remote_action_is_rejection() {
        assert!(!Error::Configuration("x".into()).is_remote_rejection());
        assert!(!Error::Authentication("x".into()).is_remote_rejection());
        assert!(!Error::Network("x".into()).is_remote_rejection());
        assert!(!Error::InvalidAction("x".into()).is_remote_rejection());
        assert_eq!(Error::Network("x".into()).remote_code(), None);
    }
}

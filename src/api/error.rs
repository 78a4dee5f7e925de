use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
///
/// Three kinds matter to the dashboard:
/// - transport failures (`Timeout`, `Network`, `HttpStatus`, `Decode`, ...)
///   surface as a generic notice,
/// - application failures (`Rejected`) carry the backend's message,
/// - `Unauthorized` ends the session and pre-empts everything else.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session expired or invalid")]
    Unauthorized,
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("Response has no data")]
    MissingData,
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required except for local or private hosts")]
    InsecureBaseUrl,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Text shown to the user for a failed operation.
    ///
    /// Backend-provided messages are shown verbatim; application failures
    /// without one fall back to `default`; transport failures get a generic
    /// retry hint.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Rejected { .. } | ApiError::MissingData => default.to_string(),
            ApiError::Unauthorized => "Session expired, please log in again".to_string(),
            ApiError::Timeout(_) | ApiError::Network(_) => {
                "Network error, please try again".to_string()
            }
            other => format!("{}: {}", default, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = ApiError::Rejected {
            message: Some("Keyword already subscribed".to_string()),
        };
        assert_eq!(
            err.user_message("Failed to add subscription"),
            "Keyword already subscribed"
        );
    }

    #[test]
    fn test_rejected_without_message_uses_default() {
        let err = ApiError::Rejected { message: None };
        assert_eq!(err.user_message("RSS update failed"), "RSS update failed");

        let blank = ApiError::Rejected {
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message("RSS update failed"), "RSS update failed");
    }

    #[test]
    fn test_timeout_is_generic_network_notice() {
        let err = ApiError::Timeout(15);
        assert_eq!(err.user_message("ignored"), "Network error, please try again");
    }

    #[test]
    fn test_http_status_mentions_code() {
        let msg = ApiError::HttpStatus(502).user_message("Failed to load stats");
        assert!(msg.starts_with("Failed to load stats"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_only_unauthorized_is_unauthorized() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::HttpStatus(403).is_unauthorized());
        assert!(!ApiError::Rejected { message: None }.is_unauthorized());
    }
}

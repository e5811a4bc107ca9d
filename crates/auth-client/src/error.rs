//! Auth client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unauthorized")]
    Unauthorized { message: Option<String> },

    #[error("API error: {status}")]
    Api { status: u16, message: Option<String> },
}

impl AuthError {
    /// Message supplied by the backend in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AuthError::Unauthorized { message } | AuthError::Api { message, .. } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// True for a 401 response (expired or invalid token class of error).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized { .. })
    }

    /// True when the request never produced a usable response: the backend
    /// was unreachable, timed out, or answered with a body we could not parse.
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Http(_) | AuthError::Json(_))
    }
}

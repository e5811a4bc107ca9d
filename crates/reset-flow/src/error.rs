//! Reset flow errors.
//!
//! The `Display` text of each variant is the message shown to the user.

use crate::password::PasswordError;
use crate::storage::StorageError;
use auth_client::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("A request is already in progress")]
    Busy,

    #[error("This action is not available on the current step")]
    WrongStep,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please enter the complete 4-digit OTP")]
    IncompleteOtp,

    #[error("Invalid OTP. Please try again.")]
    InvalidOtp,

    #[error("OTP has expired. Please request a new one.")]
    OtpExpired,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    #[error("{0}")]
    Backend(String),

    #[error("Network error. Please check your connection and try again.")]
    Network,

    #[error("Could not store the verification code on this device")]
    Storage(#[from] StorageError),

    #[error("The password reset was closed")]
    Dismissed,
}

impl FlowError {
    /// Reduce a backend failure to a user-facing error.
    ///
    /// A 401 only gets its own variant when `unauthorized_closes` is set;
    /// otherwise it is reported like any other rejection.
    pub(crate) fn from_backend(err: &AuthError, fallback: &str, unauthorized_closes: bool) -> Self {
        if unauthorized_closes && err.is_unauthorized() {
            return FlowError::Unauthorized;
        }
        if err.is_transport() {
            return FlowError::Network;
        }
        FlowError::Backend(err.server_message().unwrap_or(fallback).to_string())
    }

    /// Whether this failure should be shown in the step's message banner.
    pub(crate) fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            FlowError::Busy | FlowError::WrongStep | FlowError::Dismissed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_preferred() {
        let err = AuthError::Api {
            status: 404,
            message: Some("User not found".into()),
        };
        let flow = FlowError::from_backend(&err, "fallback", true);
        assert_eq!(flow.to_string(), "User not found");
    }

    #[test]
    fn test_backend_fallback_when_no_message() {
        let err = AuthError::Api {
            status: 500,
            message: None,
        };
        let flow = FlowError::from_backend(&err, "Failed to send OTP", true);
        assert_eq!(flow.to_string(), "Failed to send OTP");

        let blank = AuthError::Api {
            status: 500,
            message: Some("  ".into()),
        };
        let flow = FlowError::from_backend(&blank, "Failed to send OTP", true);
        assert_eq!(flow.to_string(), "Failed to send OTP");
    }

    #[test]
    fn test_unauthorized_only_special_when_requested() {
        let err = AuthError::Unauthorized {
            message: Some("Token expired".into()),
        };

        assert!(matches!(
            FlowError::from_backend(&err, "fallback", true),
            FlowError::Unauthorized
        ));
        assert_eq!(
            FlowError::from_backend(&err, "fallback", false).to_string(),
            "Token expired"
        );
    }

    #[test]
    fn test_transport_failure_is_network_error() {
        let err = AuthError::Json(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(matches!(
            FlowError::from_backend(&err, "fallback", true),
            FlowError::Network
        ));
    }

    #[test]
    fn test_password_error_display_passes_through() {
        let err: FlowError = PasswordError::Mismatch.into();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert!(err.is_user_facing());
        assert!(!FlowError::Busy.is_user_facing());
    }
}

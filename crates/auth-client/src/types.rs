//! Request and response bodies for the password-reset endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /user/forgot-password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest<'a> {
    pub phone_number: &'a str,
}

/// Successful reply to `POST /user/forgot-password`.
///
/// The backend returns the issued OTP directly to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordResponse {
    #[serde(default)]
    pub message: String,
    pub otp: String,
}

/// Body of `POST /user/reset-password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub phone_number: &'a str,
    pub new_password: &'a str,
}

/// Successful reply to `POST /user/reset-password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

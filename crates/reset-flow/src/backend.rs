//! Seam between the reset flow and the HTTP backend.

use async_trait::async_trait;
use auth_client::{AuthClient, AuthError, ForgotPasswordResponse, ResetPasswordResponse};
use secrecy::SecretString;

/// The two backend calls the reset flow depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetBackend: Send + Sync {
    /// Issue an OTP for `phone_number` (`POST /user/forgot-password`).
    async fn initiate_reset(&self, phone_number: &str) -> Result<ForgotPasswordResponse, AuthError>;

    /// Apply the new password (`POST /user/reset-password`).
    async fn commit_reset(
        &self,
        phone_number: &str,
        new_password: &SecretString,
    ) -> Result<ResetPasswordResponse, AuthError>;
}

#[async_trait]
impl ResetBackend for AuthClient {
    async fn initiate_reset(&self, phone_number: &str) -> Result<ForgotPasswordResponse, AuthError> {
        self.forgot_password(phone_number).await
    }

    async fn commit_reset(
        &self,
        phone_number: &str,
        new_password: &SecretString,
    ) -> Result<ResetPasswordResponse, AuthError> {
        self.reset_password(phone_number, new_password).await
    }
}

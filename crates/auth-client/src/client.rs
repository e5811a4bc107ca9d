//! Timetable backend HTTP client.

use crate::error::AuthError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the backend's `/user` password-reset endpoints.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a new client rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend to issue a reset OTP for `phone_number`.
    #[instrument(skip(self))]
    pub async fn forgot_password(
        &self,
        phone_number: &str,
    ) -> Result<ForgotPasswordResponse, AuthError> {
        let request = ForgotPasswordRequest { phone_number };

        let response = self
            .client
            .post(format!("{}/user/forgot-password", self.base_url))
            .json(&request)
            .send()
            .await?;

        let reply: ForgotPasswordResponse = self.handle_response(response).await?;
        debug!("OTP issued");
        Ok(reply)
    }

    /// Apply `new_password` to the account behind `phone_number`.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(
        &self,
        phone_number: &str,
        new_password: &SecretString,
    ) -> Result<ResetPasswordResponse, AuthError> {
        let request = ResetPasswordRequest {
            phone_number,
            new_password: new_password.expose_secret(),
        };

        let response = self
            .client
            .post(format!("{}/user/reset-password", self.base_url))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        if response.status().is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(AuthError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .unwrap_or_default()
            .message;

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Backend rejected request as unauthorized");
                AuthError::Unauthorized { message }
            }
            _ => {
                warn!(status = status.as_u16(), "Backend request failed");
                AuthError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

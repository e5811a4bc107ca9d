//! Persistence of the pending reset (issued OTP plus its expiry).
//!
//! Exactly one record lives under a fixed storage key. Anything that cannot
//! be read back as a live record (missing, malformed, expired) is treated as
//! "no OTP issued" and purged.

use crate::clock::Clock;
use crate::storage::{Storage, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Storage key holding the pending reset.
pub const DEFAULT_STORAGE_KEY: &str = "pending_password_reset";

/// How long an issued OTP stays valid.
pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// An issued OTP awaiting verification.
///
/// Serialized as `{"otp": "...", "expiresAt": <epoch ms>, "phoneNumber": "..."}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReset {
    pub otp: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at: i64,
    pub phone_number: String,
}

impl PendingReset {
    /// Create a record issued at `issued_at` that expires `ttl` later.
    pub fn new(
        otp: impl Into<String>,
        phone_number: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            otp: otp.into(),
            expires_at: issued_at.timestamp_millis().saturating_add(ttl_ms),
            phone_number: phone_number.into(),
        }
    }

    /// Valid only while `now < expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_at
    }

    /// Validity left at `now`, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        let left = self.expires_at.saturating_sub(now.timestamp_millis());
        Duration::from_millis(u64::try_from(left).unwrap_or(0))
    }
}

impl fmt::Debug for PendingReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReset")
            .field("otp", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Outcome of comparing an entered code with the stored OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Match,
    Mismatch,
    /// No live record: never issued, cleared, or expired.
    Missing,
}

/// Reads and writes the single pending-reset record.
#[derive(Clone)]
pub struct OtpStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    key: String,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            key: DEFAULT_STORAGE_KEY.to_string(),
            ttl: DEFAULT_OTP_TTL,
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Use a different OTP lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Read the live pending reset, purging it if expired or unreadable.
    pub async fn load(&self) -> Option<PendingReset> {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read pending reset, treating as absent: {}", e);
                return None;
            }
        };

        let reset: PendingReset = match serde_json::from_str(&raw) {
            Ok(reset) => reset,
            Err(e) => {
                warn!("Discarding malformed pending reset: {}", e);
                self.purge().await;
                return None;
            }
        };

        if reset.is_expired_at(self.clock.now()) {
            info!(phone_number = %reset.phone_number, "Pending reset expired, discarding");
            self.purge().await;
            return None;
        }

        Some(reset)
    }

    /// Persist `reset`, overwriting any previous record.
    pub async fn save(&self, reset: &PendingReset) -> Result<(), StorageError> {
        let raw = serde_json::to_string(reset)?;
        self.storage.set(&self.key, &raw).await?;
        debug!(phone_number = %reset.phone_number, "Saved pending reset");
        Ok(())
    }

    /// Record a freshly issued OTP for `phone_number`.
    pub async fn issue(
        &self,
        otp: &str,
        phone_number: &str,
    ) -> Result<PendingReset, StorageError> {
        let reset = PendingReset::new(otp, phone_number, self.clock.now(), self.ttl);
        self.save(&reset).await?;
        Ok(reset)
    }

    /// Remove the pending reset.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key).await?;
        debug!("Cleared pending reset");
        Ok(())
    }

    /// Compare `code` with the freshest stored OTP, re-checking expiry now.
    pub async fn verify(&self, code: &str) -> OtpCheck {
        match self.load().await {
            None => OtpCheck::Missing,
            Some(reset) if reset.otp == code => OtpCheck::Match,
            Some(_) => OtpCheck::Mismatch,
        }
    }

    /// Validity left on the stored OTP, if one is live.
    pub async fn time_remaining(&self) -> Option<Duration> {
        let reset = self.load().await?;
        Some(reset.remaining_at(self.clock.now()))
    }

    async fn purge(&self) {
        if let Err(e) = self.clear().await {
            warn!("Failed to purge pending reset: {}", e);
        }
    }
}

//! The forgot-password wizard: phone → otp → password.
//!
//! [`ResetFlow`] is a cloneable handle over shared state so the host can keep
//! rendering (and closing) while a backend call is outstanding. The state
//! lock is never held across a backend call. Every dismissal bumps a
//! generation counter; responses and delayed actions that belong to an older
//! generation are dropped.

use crate::backend::ResetBackend;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::FlowError;
use crate::otp_input::{FocusHint, OtpDigits, OTP_LENGTH};
use crate::otp_store::{OtpCheck, OtpStore};
use crate::password::{check_confirmation, password_checklist, validate_password, PasswordRule};
use crate::phone::{is_valid_phone, normalize_phone};
use crate::storage;
use anyhow::Result;
use auth_client::AuthClient;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const OTP_SENT_FALLBACK: &str = "OTP sent to your phone number";
const OTP_SEND_FAILED: &str = "Failed to send OTP. Please try again.";
const OTP_VERIFIED: &str = "OTP verified. Please set your new password.";
const RESET_SUCCESS_FALLBACK: &str = "Password reset successfully";
const RESET_FAILED: &str = "Failed to reset password. Please try again.";

/// Host callback.
pub type Callback = Box<dyn Fn() + Send + Sync>;

/// Callbacks supplied by the host that mounts the flow.
pub struct FlowCallbacks {
    on_close: Callback,
    on_success: Option<Callback>,
}

impl FlowCallbacks {
    /// `on_close` runs whenever the flow is dismissed.
    pub fn new(on_close: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            on_close: Box::new(on_close),
            on_success: None,
        }
    }

    /// `on_success` runs after a password was reset, before dismissal.
    pub fn on_success(mut self, on_success: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(on_success));
        self
    }
}

/// Delays applied before the flow dismisses itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    pub success_delay: Duration,
    pub unauthorized_close_delay: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_secs(2),
            unauthorized_close_delay: Duration::from_secs(2),
        }
    }
}

/// Last feedback shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMessage {
    pub text: String,
    pub is_error: bool,
}

impl FlowMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Which step the wizard is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Phone,
    Otp,
    Password,
}

/// Password fields of the last step.
#[derive(Debug)]
pub struct NewPassword {
    new_password: SecretString,
    confirm_password: SecretString,
}

impl Default for NewPassword {
    fn default() -> Self {
        Self {
            new_password: SecretString::new(String::new()),
            confirm_password: SecretString::new(String::new()),
        }
    }
}

impl NewPassword {
    fn can_submit(&self) -> bool {
        let new = self.new_password.expose_secret();
        let confirm = self.confirm_password.expose_secret();
        !new.is_empty()
            && !confirm.is_empty()
            && check_confirmation(new, confirm).is_ok()
            && validate_password(new).is_ok()
    }

    /// Policy first, then confirmation.
    fn check(&self) -> Result<(), FlowError> {
        let new = self.new_password.expose_secret();
        validate_password(new)?;
        check_confirmation(new, self.confirm_password.expose_secret())?;
        Ok(())
    }
}

/// Wizard position. Reaching `Password` is the proof that the OTP matched.
#[derive(Debug)]
pub enum Step {
    Phone,
    Otp { digits: OtpDigits },
    Password(NewPassword),
}

impl Step {
    fn otp() -> Self {
        Step::Otp {
            digits: OtpDigits::new(),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Phone => StepKind::Phone,
            Step::Otp { .. } => StepKind::Otp,
            Step::Password(_) => StepKind::Password,
        }
    }
}

#[derive(Debug)]
struct FlowState {
    step: Step,
    phone_number: String,
    message: Option<FlowMessage>,
    is_loading: bool,
    /// The backend accepted the new password; dismissal must report success.
    committed: bool,
    generation: u64,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            step: Step::Phone,
            phone_number: String::new(),
            message: None,
            is_loading: false,
            committed: false,
            generation: 0,
        }
    }
}

impl FlowState {
    /// Back to the initial state, invalidating anything in flight.
    fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = FlowState {
            generation,
            ..FlowState::default()
        };
    }

    /// Surface `err` in the message banner and hand it back.
    fn fail(&mut self, err: FlowError) -> FlowError {
        if err.is_user_facing() {
            self.message = Some(FlowMessage::error(err.to_string()));
        }
        err
    }

    fn clear_error(&mut self) {
        if self.message.as_ref().is_some_and(|m| m.is_error) {
            self.message = None;
        }
    }

    fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.is_loading {
            Err(FlowError::Busy)
        } else {
            Ok(())
        }
    }
}

/// Everything the presentation layer needs to render the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub step: StepKind,
    pub phone_number: String,
    pub phone_valid: bool,
    pub otp_digits: [String; OTP_LENGTH],
    pub otp_verified: bool,
    pub message: Option<FlowMessage>,
    pub is_loading: bool,
    pub password_checklist: Vec<(PasswordRule, bool)>,
    pub can_submit_password: bool,
}

struct Inner {
    state: Mutex<FlowState>,
    backend: Arc<dyn ResetBackend>,
    store: OtpStore,
    callbacks: FlowCallbacks,
    settings: FlowSettings,
}

/// Handle to one mounted password-reset wizard.
#[derive(Clone)]
pub struct ResetFlow {
    inner: Arc<Inner>,
}

impl ResetFlow {
    pub fn new(
        backend: Arc<dyn ResetBackend>,
        store: OtpStore,
        callbacks: FlowCallbacks,
        settings: FlowSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(FlowState::default()),
                backend,
                store,
                callbacks,
                settings,
            }),
        }
    }

    /// Wire up the HTTP backend, storage and timings from configuration.
    pub fn from_config(config: &Config, callbacks: FlowCallbacks) -> Result<Self> {
        let backend = AuthClient::new(&config.api.base_url, config.api.timeout)?;
        let store = OtpStore::new(
            storage::from_dir(config.storage.dir.as_deref()),
            Arc::new(SystemClock),
        )
        .with_key(&config.reset.storage_key)
        .with_ttl(config.reset.otp_ttl);
        let settings = FlowSettings {
            success_delay: config.reset.success_delay,
            unauthorized_close_delay: config.reset.unauthorized_close_delay,
        };

        Ok(Self::new(Arc::new(backend), store, callbacks, settings))
    }

    async fn state(&self) -> MutexGuard<'_, FlowState> {
        self.inner.state.lock().await
    }

    /// Resume an in-flight reset left in storage (e.g. after a reload).
    ///
    /// Returns true when a live pending reset moved the flow to the OTP step.
    pub async fn mount(&self) -> bool {
        let pending = self.inner.store.load().await;
        let mut state = self.state().await;

        match pending {
            Some(reset) if matches!(state.step, Step::Phone) && !state.is_loading => {
                info!(phone_number = %reset.phone_number, "Resuming pending password reset");
                state.phone_number = reset.phone_number;
                state.step = Step::otp();
                true
            }
            _ => false,
        }
    }

    /// Current wizard step.
    pub async fn step(&self) -> StepKind {
        self.state().await.step.kind()
    }

    /// Render-ready view of the flow.
    pub async fn snapshot(&self) -> FlowSnapshot {
        let state = self.state().await;

        let otp_digits = match &state.step {
            Step::Otp { digits } => digits.as_strings(),
            _ => Default::default(),
        };
        let (checklist, can_submit_password) = match &state.step {
            Step::Password(fields) => (
                password_checklist(fields.new_password.expose_secret()),
                fields.can_submit() && !state.is_loading,
            ),
            _ => (password_checklist(""), false),
        };

        FlowSnapshot {
            step: state.step.kind(),
            phone_number: state.phone_number.clone(),
            phone_valid: is_valid_phone(&state.phone_number),
            otp_digits,
            otp_verified: matches!(state.step, Step::Password(_)),
            message: state.message.clone(),
            is_loading: state.is_loading,
            password_checklist: checklist,
            can_submit_password,
        }
    }

    /// Update the phone field, returning its normalized value.
    pub async fn set_phone(&self, input: &str) -> Result<String, FlowError> {
        let mut state = self.state().await;
        if !matches!(state.step, Step::Phone) {
            return Err(FlowError::WrongStep);
        }
        state.ensure_idle()?;

        state.phone_number = normalize_phone(input);
        state.clear_error();
        Ok(state.phone_number.clone())
    }

    /// Request an OTP for the entered phone number.
    pub async fn submit_phone(&self) -> Result<(), FlowError> {
        let (phone, generation) = {
            let mut state = self.state().await;
            if !matches!(state.step, Step::Phone) {
                return Err(FlowError::WrongStep);
            }
            state.ensure_idle()?;
            if !is_valid_phone(&state.phone_number) {
                return Err(state.fail(FlowError::InvalidPhone));
            }
            state.is_loading = true;
            state.message = None;
            (state.phone_number.clone(), state.generation)
        };

        self.request_otp(phone, generation).await
    }

    /// Apply new contents of OTP slot `index`.
    pub async fn otp_input(&self, index: usize, value: &str) -> Result<FocusHint, FlowError> {
        let mut state = self.state().await;
        let Step::Otp { digits } = &mut state.step else {
            return Err(FlowError::WrongStep);
        };
        let hint = digits.input(index, value);
        state.clear_error();
        Ok(hint)
    }

    /// Backspace in OTP slot `index`.
    pub async fn otp_backspace(&self, index: usize) -> Result<FocusHint, FlowError> {
        let mut state = self.state().await;
        let Step::Otp { digits } = &mut state.step else {
            return Err(FlowError::WrongStep);
        };
        Ok(digits.backspace(index))
    }

    /// Paste a whole code. Returns `None` when the text is not a 4-digit code.
    pub async fn otp_paste(&self, text: &str) -> Result<Option<FocusHint>, FlowError> {
        let mut state = self.state().await;
        let Step::Otp { digits } = &mut state.step else {
            return Err(FlowError::WrongStep);
        };
        let hint = digits.paste(text);
        if hint.is_some() {
            state.clear_error();
        }
        Ok(hint)
    }

    /// Compare the entered digits with the stored OTP. Local only.
    pub async fn verify_otp(&self) -> Result<(), FlowError> {
        let mut state = self.state().await;
        let code = match &state.step {
            Step::Otp { digits } => digits.code(),
            _ => return Err(FlowError::WrongStep),
        };
        state.ensure_idle()?;

        let Some(code) = code else {
            return Err(state.fail(FlowError::IncompleteOtp));
        };

        match self.inner.store.verify(&code).await {
            OtpCheck::Match => {
                info!(phone_number = %state.phone_number, "OTP verified");
                state.step = Step::Password(NewPassword::default());
                state.message = Some(FlowMessage::info(OTP_VERIFIED));
                Ok(())
            }
            OtpCheck::Mismatch => {
                debug!("Entered OTP does not match");
                Err(state.fail(FlowError::InvalidOtp))
            }
            OtpCheck::Missing => {
                debug!("No live OTP to compare against");
                Err(state.fail(FlowError::OtpExpired))
            }
        }
    }

    /// Request a fresh OTP for the same phone number.
    pub async fn resend_otp(&self) -> Result<(), FlowError> {
        let (phone, generation) = {
            let mut state = self.state().await;
            if !matches!(state.step, Step::Otp { .. }) {
                return Err(FlowError::WrongStep);
            }
            state.ensure_idle()?;
            if let Step::Otp { digits } = &mut state.step {
                digits.clear();
            }
            state.is_loading = true;
            state.message = None;
            (state.phone_number.clone(), state.generation)
        };

        self.request_otp(phone, generation).await
    }

    /// Validity left on the issued OTP, for a countdown.
    pub async fn otp_time_remaining(&self) -> Option<Duration> {
        if self.step().await != StepKind::Otp {
            return None;
        }
        self.inner.store.time_remaining().await
    }

    /// Return to the phone step. The pending OTP stays stored.
    pub async fn back(&self) -> Result<(), FlowError> {
        let mut state = self.state().await;
        if !matches!(state.step, Step::Otp { .. }) {
            return Err(FlowError::WrongStep);
        }
        state.ensure_idle()?;

        state.step = Step::Phone;
        state.message = None;
        Ok(())
    }

    pub async fn set_new_password(&self, value: &str) -> Result<(), FlowError> {
        let mut state = self.state().await;
        let Step::Password(fields) = &mut state.step else {
            return Err(FlowError::WrongStep);
        };
        fields.new_password = SecretString::new(value.to_string());
        state.clear_error();
        Ok(())
    }

    pub async fn set_confirm_password(&self, value: &str) -> Result<(), FlowError> {
        let mut state = self.state().await;
        let Step::Password(fields) = &mut state.step else {
            return Err(FlowError::WrongStep);
        };
        fields.confirm_password = SecretString::new(value.to_string());
        state.clear_error();
        Ok(())
    }

    /// Apply the new password.
    ///
    /// On success this waits for the configured delay, fires `on_success`
    /// and dismisses the flow before returning.
    pub async fn submit_password(&self) -> Result<(), FlowError> {
        let (phone, password, generation) = {
            let mut state = self.state().await;
            let Step::Password(fields) = &state.step else {
                return Err(FlowError::WrongStep);
            };
            state.ensure_idle()?;
            let checked = fields.check();
            let password = SecretString::new(fields.new_password.expose_secret().clone());
            if let Err(e) = checked {
                return Err(state.fail(e));
            }
            state.is_loading = true;
            state.message = None;
            (state.phone_number.clone(), password, state.generation)
        };

        let result = self.inner.backend.commit_reset(&phone, &password).await;

        let mut state = self.state().await;
        if state.generation != generation {
            debug!("Dropping reset-password response for a dismissed flow");
            return Err(FlowError::Dismissed);
        }

        match result {
            Ok(reply) => {
                info!(phone_number = %phone, "Password reset");
                if let Err(e) = self.inner.store.clear().await {
                    warn!("Failed to clear pending reset: {}", e);
                }
                state.message = Some(FlowMessage::info(non_empty_or(
                    reply.message,
                    RESET_SUCCESS_FALLBACK,
                )));
                state.committed = true;
                // Stays loading until dismissal so the form cannot resubmit.
                drop(state);

                tokio::time::sleep(self.inner.settings.success_delay).await;
                if self.dismiss(Some(generation)).await {
                    debug!("Reset flow finished");
                }
                Ok(())
            }
            Err(e) => {
                warn!(phone_number = %phone, "Reset password failed: {}", e);
                state.is_loading = false;
                Err(state.fail(FlowError::from_backend(&e, RESET_FAILED, false)))
            }
        }
    }

    /// Dismiss the flow from any step: clear all state and the stored OTP,
    /// then notify the host.
    pub async fn close(&self) {
        self.dismiss(None).await;
    }

    /// Reset everything and run the host callbacks. With `expected` set, only
    /// dismisses if no other dismissal happened since that generation.
    ///
    /// `on_success` fires for whichever dismissal ends a committed reset, so a
    /// `close` during the success delay still reports it exactly once.
    async fn dismiss(&self, expected: Option<u64>) -> bool {
        let committed = {
            let mut state = self.state().await;
            if expected.is_some_and(|g| g != state.generation) {
                return false;
            }
            let committed = state.committed;
            state.reset();
            // Must stay under the state lock: a request issued after this close keeps its record.
            if let Err(e) = self.inner.store.clear().await {
                warn!("Failed to clear pending reset on close: {}", e);
            }
            committed
        };

        if committed {
            if let Some(on_success) = &self.inner.callbacks.on_success {
                on_success();
            }
        }
        (self.inner.callbacks.on_close)();
        info!("Password reset flow dismissed");
        true
    }

    /// Shared by submit and resend: call the backend, then persist the OTP
    /// and land on the OTP step.
    async fn request_otp(&self, phone: String, generation: u64) -> Result<(), FlowError> {
        let result = self.inner.backend.initiate_reset(&phone).await;

        let mut state = self.state().await;
        if state.generation != generation {
            debug!("Dropping forgot-password response for a dismissed flow");
            return Err(FlowError::Dismissed);
        }

        match result {
            Ok(reply) => {
                if let Err(e) = self.inner.store.issue(&reply.otp, &phone).await {
                    warn!("Failed to persist issued OTP: {}", e);
                    state.is_loading = false;
                    return Err(state.fail(e.into()));
                }
                info!(phone_number = %phone, "Reset OTP issued");
                state.is_loading = false;
                state.step = Step::otp();
                state.message = Some(FlowMessage::info(non_empty_or(
                    reply.message,
                    OTP_SENT_FALLBACK,
                )));
                Ok(())
            }
            Err(e) => {
                warn!(phone_number = %phone, "Forgot password failed: {}", e);
                let err = state.fail(FlowError::from_backend(&e, OTP_SEND_FAILED, true));
                if !matches!(err, FlowError::Unauthorized) {
                    state.is_loading = false;
                    return Err(err);
                }
                // Stays loading until the forced close.
                drop(state);

                tokio::time::sleep(self.inner.settings.unauthorized_close_delay).await;
                self.dismiss(Some(generation)).await;
                Err(err)
            }
        }
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

//! Forgot-password flow for the timetable front-end.
//!
//! A three-step wizard (phone → otp → password) that normalizes the phone
//! number, asks the backend to issue an OTP, keeps the issued OTP with its
//! expiry in client-local storage, verifies the entered code locally and
//! finally commits the new password.
//!
//! Presentation is left to the host: it forwards user events to
//! [`ResetFlow`] and renders [`FlowSnapshot`]s.

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod flow;
pub mod otp_input;
pub mod otp_store;
pub mod password;
pub mod phone;
pub mod storage;
pub mod telemetry;

pub use backend::ResetBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::FlowError;
pub use flow::{
    FlowCallbacks, FlowMessage, FlowSettings, FlowSnapshot, ResetFlow, StepKind,
};
pub use otp_input::{FocusHint, OtpDigits, OTP_LENGTH};
pub use otp_store::{OtpCheck, OtpStore, PendingReset};
pub use password::{
    check_confirmation, password_checklist, validate_password, PasswordError, PasswordRule,
};
pub use phone::{is_valid_phone, normalize_phone};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

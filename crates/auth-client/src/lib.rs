//! Timetable backend client for the forgot-password endpoints.

mod client;
mod error;
mod types;

pub use client::AuthClient;
pub use error::AuthError;
pub use types::*;

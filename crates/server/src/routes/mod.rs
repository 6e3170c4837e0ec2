//! Relay endpoint implementations.

pub mod save_token;
pub mod send_notification;

//! Session management for the engine connection
//!
//! This module tracks the connection and fix-session lifecycle, keeps the
//! registered event mask in step with it and reacts to engine power and
//! service availability changes.

mod manager;

pub use manager::{operation_mode, start_request, SessionManager};

/// Connection and fix-session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection to the engine
    #[default]
    Closed,
    /// Connected, no fix session
    Idle,
    /// Connected with a fix session running
    Active,
}

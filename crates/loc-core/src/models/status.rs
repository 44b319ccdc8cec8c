//! Engine and session status notifications

use serde::{Deserialize, Serialize};

/// Status transitions reported upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GnssStatus {
    None,
    SessionBegin,
    SessionEnd,
    EngineOn,
    EngineOff,
}

/// Outcome carried by a position report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Final fix
    Success,
    /// Fix produced while the session is still computing
    Intermediate,
    /// No usable fix
    Failure,
}

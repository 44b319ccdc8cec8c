//! Position fix criteria

use serde::{Deserialize, Serialize};

/// How the engine should compute positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    #[default]
    Standalone,
    MsBased,
    MsAssisted,
    CellId,
    Wwan,
}

/// Single-shot or periodic reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Periodic,
    Single,
}

/// Requested horizontal accuracy class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAccuracy {
    /// Within 100 m
    High,
    /// Within 1000 m
    Medium,
    /// Worse than 1000 m
    Low,
}

impl HorizontalAccuracy {
    pub fn from_meters(meters: u32) -> Self {
        if meters <= 100 {
            HorizontalAccuracy::High
        } else if meters <= 1000 {
            HorizontalAccuracy::Medium
        } else {
            HorizontalAccuracy::Low
        }
    }
}

/// Identity of the application requesting the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredentials {
    pub name: String,
    pub provider: String,
}

/// Parameters of a positioning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixCriteria {
    pub mode: PositionMode,
    pub recurrence: Recurrence,
    /// Minimum interval between reports in milliseconds
    pub min_interval_ms: u32,
    /// Desired horizontal accuracy in meters; `None` leaves the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_accuracy_m: Option<u32>,
    /// Whether the engine may share the position with other clients
    #[serde(default = "default_share_position")]
    pub share_position: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AppCredentials>,
}

fn default_share_position() -> bool {
    true
}

impl Default for FixCriteria {
    fn default() -> Self {
        Self {
            mode: PositionMode::Standalone,
            recurrence: Recurrence::Periodic,
            min_interval_ms: 1000,
            preferred_accuracy_m: None,
            share_position: default_share_position(),
            credentials: None,
        }
    }
}

impl FixCriteria {
    pub fn horizontal_accuracy(&self) -> Option<HorizontalAccuracy> {
        self.preferred_accuracy_m.map(HorizontalAccuracy::from_meters)
    }
}

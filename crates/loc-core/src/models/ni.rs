//! Network-initiated location request models

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Kind of network-initiated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NiType {
    Voice,
    UmtsSupl,
    UmtsCtrlPlane,
    EmergencySupl,
}

/// User decision on a network-initiated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NiResponse {
    Accept,
    Deny,
    NoResponse,
}

/// Encoding of NI text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NiEncoding {
    #[default]
    None,
    Gsm7Bit,
    Utf8,
    Ucs2,
    Unknown,
}

bitflags! {
    /// What the framework must do with an NI request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct NiNotifyFlags: u32 {
        const NEED_NOTIFY = 0x0001;
        const NEED_VERIFY = 0x0002;
        const PRIVACY_OVERRIDE = 0x0004;
    }
}

/// Network-initiated request presented to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiNotification {
    /// Identifier to pass back with the user response
    pub id: u32,
    pub ni_type: NiType,
    pub notify_flags: NiNotifyFlags,
    /// Seconds to wait for the user; 0 lets the framework decide
    pub timeout_s: u32,
    pub default_response: NiResponse,
    pub requestor_id: String,
    pub requestor_id_encoding: NiEncoding,
    pub text: String,
    pub text_encoding: NiEncoding,
    pub extras: String,
}

impl NiNotification {
    pub fn new(id: u32, ni_type: NiType) -> Self {
        Self {
            id,
            ni_type,
            notify_flags: NiNotifyFlags::empty(),
            timeout_s: 0,
            default_response: NiResponse::NoResponse,
            requestor_id: String::new(),
            requestor_id_encoding: NiEncoding::None,
            text: String::new(),
            text_encoding: NiEncoding::None,
            extras: String::new(),
        }
    }
}

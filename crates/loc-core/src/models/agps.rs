//! Assisted-GNSS models: data connections, location servers and XTRA

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Kind of data connection the engine asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgpsType {
    WwanAny,
    Supl,
    SuplEs,
}

/// IP family of an established data connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtlBearer {
    Ipv4,
    Ipv6,
    Ipv4v6,
    Invalid,
}

/// Engine request for a data connection (ATL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AtlRequest {
    Open { handle: u32, agps_type: AgpsType },
    Close { handle: u32 },
}

/// Address of an assistance server given as IPv4 + port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKind {
    Mpc,
    CustomPde,
    CdmaPde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddr {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub kind: ServerKind,
}

/// Predicted-orbit download servers advertised by the engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XtraServers {
    pub urls: Vec<String>,
}

/// SUPL protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuplVersion {
    V1_0,
    V2_0,
    V2_0_2,
}

impl From<u32> for SuplVersion {
    fn from(raw: u32) -> Self {
        match raw {
            0x0002_0000 => SuplVersion::V2_0,
            0x0002_0002 => SuplVersion::V2_0_2,
            _ => SuplVersion::V1_0,
        }
    }
}

/// XTRA data version check policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XtraVersionCheck {
    Disabled,
    Auto,
    Xtra2,
    Xtra3,
}

/// Maximum number of SUPL certificate slots in the engine
pub const AGPS_CERTIFICATE_MAX_SLOTS: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supl_version_mapping() {
        assert_eq!(SuplVersion::from(0x0002_0000), SuplVersion::V2_0);
        assert_eq!(SuplVersion::from(0x0002_0002), SuplVersion::V2_0_2);
        assert_eq!(SuplVersion::from(0x0001_0000), SuplVersion::V1_0);
        assert_eq!(SuplVersion::from(0), SuplVersion::V1_0);
    }

    #[test]
    fn test_atl_request_serialization() {
        let req = AtlRequest::Open {
            handle: 7,
            agps_type: AgpsType::Supl,
        };
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["action"], "open");
        assert_eq!(json["agps_type"], "supl");
    }
}

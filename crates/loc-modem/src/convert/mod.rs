//! Conversion of engine indications into normalized reports
//!
//! Every converter is a pure function of its indication (plus the clock
//! continuity state for raw measurements). The dispatcher delivers the
//! result to the [`LocationReporter`](loc_core::LocationReporter).

mod clock;
mod measurement;
mod ni;
mod polynomial;
mod position;
mod sv;

pub use clock::{ClockTracker, C_GPS_WEEK_UNKNOWN, MPS_TO_NSPS, WEEK_MSECS};
pub use measurement::{convert_gnss_data, convert_gnss_measurement, convert_measurement_set};
pub use ni::{convert_encoding, convert_ni_request, decode_bcd_address, hexcode};
pub use polynomial::convert_polynomial;
pub use position::{convert_position, convert_zpp, scale_accuracy_to_68, sv_used_masks};
pub use sv::{constellation_of, convert_sv_info, map_sv_id};

use loc_core::{AgpsType, AtlRequest, GnssStatus, XtraServers};

use crate::wire::{
    FixSessionStateInd, InjectPredictedOrbitsReqInd, ServerConnReqInd, ServerRequestType, WwanType,
};

/// Most predicted-orbit servers reported upward
pub const MAX_XTRA_SERVERS: usize = 3;

/// Map a data connection request onto an ATL open or close
pub fn convert_atl_request(ind: &ServerConnReqInd) -> AtlRequest {
    match ind.request_type {
        ServerRequestType::Open => {
            let agps_type = match ind.wwan_type {
                Some(WwanType::Agnss) => AgpsType::Supl,
                Some(WwanType::AgnssEmergency) => AgpsType::SuplEs,
                Some(WwanType::Internet) | None => AgpsType::WwanAny,
            };
            AtlRequest::Open {
                handle: ind.conn_handle,
                agps_type,
            }
        }
        ServerRequestType::Close => AtlRequest::Close {
            handle: ind.conn_handle,
        },
    }
}

/// Up to [`MAX_XTRA_SERVERS`] non-empty server URLs
pub fn xtra_servers(urls: &[String]) -> XtraServers {
    XtraServers {
        urls: urls
            .iter()
            .filter(|url| !url.is_empty())
            .take(MAX_XTRA_SERVERS)
            .cloned()
            .collect(),
    }
}

pub fn convert_xtra_request(ind: &InjectPredictedOrbitsReqInd) -> XtraServers {
    xtra_servers(&ind.server_list)
}

pub fn convert_fix_session_state(ind: FixSessionStateInd) -> GnssStatus {
    match ind {
        FixSessionStateInd::Started => GnssStatus::SessionBegin,
        FixSessionStateInd::Finished => GnssStatus::SessionEnd,
        FixSessionStateInd::Unknown(_) => GnssStatus::None,
    }
}

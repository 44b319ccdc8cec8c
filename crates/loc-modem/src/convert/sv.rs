//! Satellite info conversion

use loc_core::{Constellation, SvFlags, SvInfo, SvSearchStatus, SvStatus, GNSS_MAX_SVS};
use tracing::trace;

use crate::wire::{SvInfoInd, SvInfoMask, SvSystem, WireSvInfo};

/// Constellation of an engine satellite system
pub fn constellation_of(system: SvSystem) -> Constellation {
    match system {
        SvSystem::Gps => Constellation::Gps,
        SvSystem::Galileo => Constellation::Galileo,
        SvSystem::Sbas => Constellation::Sbas,
        SvSystem::Glonass => Constellation::Glonass,
        SvSystem::Bds => Constellation::Beidou,
        SvSystem::Qzss => Constellation::Qzss,
        SvSystem::Compass => Constellation::Unknown,
    }
}

/// Constellation and constellation-local id of an engine satellite id
pub fn map_sv_id(system: SvSystem, gnss_sv_id: u16) -> (Constellation, u16) {
    let svid = match system {
        SvSystem::Galileo => gnss_sv_id.saturating_sub(300),
        SvSystem::Bds => gnss_sv_id.saturating_sub(200),
        _ => gnss_sv_id,
    };
    (constellation_of(system), svid)
}

fn convert_one(sv: &WireSvInfo) -> Option<SvInfo> {
    let system = sv.system?;
    let gnss_sv_id = sv.gnss_sv_id.filter(|&id| id != 0)?;
    let (constellation, svid) = map_sv_id(system, gnss_sv_id);

    let mut flags = SvFlags::empty();
    if let Some(info) = sv.sv_info_mask {
        if info.contains(SvInfoMask::HAS_EPHEMERIS) {
            flags |= SvFlags::HAS_EPHEMERIS;
        }
        if info.contains(SvInfoMask::HAS_ALMANAC) {
            flags |= SvFlags::HAS_ALMANAC;
        }
    }

    // The engine keeps reporting dropped satellites with zero SNR
    let snr = sv.snr.unwrap_or(0.0);
    let tracked = sv.sv_status == Some(SvSearchStatus::Track);
    let has_orbit = flags.intersects(SvFlags::HAS_EPHEMERIS | SvFlags::HAS_ALMANAC);
    if tracked && snr > 0.0 && has_orbit {
        flags |= SvFlags::USED_IN_FIX;
    }

    Some(SvInfo {
        svid,
        constellation,
        c_n0_dbhz: snr,
        elevation: sv.elevation.unwrap_or(0.0),
        azimuth: sv.azimuth.unwrap_or(0.0),
        flags,
    })
}

/// Build a satellite snapshot of at most [`GNSS_MAX_SVS`] entries.
///
/// Entries without a system or with a missing or zero id are skipped.
pub fn convert_sv_info(ind: &SvInfoInd) -> SvStatus {
    if ind.sv_list.len() > GNSS_MAX_SVS {
        trace!(len = ind.sv_list.len(), "Truncating satellite list");
    }
    SvStatus {
        svs: ind
            .sv_list
            .iter()
            .take(GNSS_MAX_SVS)
            .filter_map(convert_one)
            .collect(),
    }
}

//! Satellite orbit/clock polynomial

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const SV_POLY_XYZ_0_TH_ORDER_COEFF_SIZE: usize = 3;
pub const SV_POLY_XYZ_N_TH_ORDER_COEFF_SIZE: usize = 9;
pub const SV_POLY_SV_CLKBIAS_COEFF_SIZE: usize = 4;
pub const SV_POLY_VELOCITY_COEF_SIZE: usize = 12;

bitflags! {
    /// Which optional polynomial fields are present
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PolyValidity: u32 {
        const GLO_FREQ = 1 << 0;
        const T0 = 1 << 1;
        const IODE = 1 << 2;
        const FLAG = 1 << 3;
        const POLYCOEFF_XYZ0 = 1 << 4;
        const POLYCOEFF_XYZN = 1 << 5;
        const POLYCOEFF_OTHER = 1 << 6;
        const SV_POSUNC = 1 << 7;
        const IONODELAY = 1 << 8;
        const IONODOT = 1 << 9;
        const SBAS_IONODELAY = 1 << 10;
        const SBAS_IONODOT = 1 << 11;
        const TROPODELAY = 1 << 12;
        const ELEVATION = 1 << 13;
        const ELEVATIONDOT = 1 << 14;
        const ELEVATIONUNC = 1 << 15;
        const VELO_COEFF = 1 << 16;
        const ENHANCED_IOD = 1 << 17;
    }
}

/// Polynomial description of one satellite's orbit and clock
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvPolynomial {
    pub gnss_sv_id: u16,
    /// Reference time of the polynomial
    pub t0: f64,
    pub validity: PolyValidity,
    pub sv_poly_flags: u8,
    /// GLONASS frequency number
    pub freq_num: i8,
    pub iode: u16,
    pub sv_pos_unc: f32,
    /// Position at t0 followed by the 0th order clock term
    pub poly_coeff_xyz0: [f64; SV_POLY_XYZ_0_TH_ORDER_COEFF_SIZE + 1],
    pub poly_coeff_xyzn: [f64; SV_POLY_XYZ_N_TH_ORDER_COEFF_SIZE],
    pub poly_coeff_other: [f32; SV_POLY_SV_CLKBIAS_COEFF_SIZE],
    pub iono_delay: f32,
    pub iono_dot: f32,
    pub sbas_iono_delay: f32,
    pub sbas_iono_dot: f32,
    pub tropo_delay: f32,
    pub elevation: f32,
    pub elevation_dot: f32,
    pub elevation_unc: f32,
    pub velocity_coeff: [f64; SV_POLY_VELOCITY_COEF_SIZE],
    pub enhanced_iod: u32,
}

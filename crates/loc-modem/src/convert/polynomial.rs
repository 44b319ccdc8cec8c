//! Satellite polynomial conversion

use loc_core::{PolyValidity, SvPolynomial};

use crate::wire::SvPolynomialInd;

fn take<T: Copy>(value: Option<T>, validity: &mut PolyValidity, bit: PolyValidity, out: &mut T) {
    if let Some(v) = value {
        *validity |= bit;
        *out = v;
    }
}

/// Convert a polynomial indication; indications for satellite 0 are dropped
pub fn convert_polynomial(ind: &SvPolynomialInd) -> Option<SvPolynomial> {
    if ind.gnss_sv_id == 0 {
        return None;
    }

    let mut poly = SvPolynomial {
        gnss_sv_id: ind.gnss_sv_id,
        t0: ind.t0,
        ..Default::default()
    };
    let v = &mut poly.validity;

    take(ind.glo_frequency, v, PolyValidity::GLO_FREQ, &mut poly.freq_num);
    take(ind.iode, v, PolyValidity::IODE, &mut poly.iode);
    take(ind.sv_pos_unc, v, PolyValidity::SV_POSUNC, &mut poly.sv_pos_unc);
    take(ind.sv_poly_flags, v, PolyValidity::FLAG, &mut poly.sv_poly_flags);
    take(ind.poly_coeff_xyz0, v, PolyValidity::POLYCOEFF_XYZ0, &mut poly.poly_coeff_xyz0);
    take(ind.poly_coeff_xyzn, v, PolyValidity::POLYCOEFF_XYZN, &mut poly.poly_coeff_xyzn);
    take(ind.poly_coeff_other, v, PolyValidity::POLYCOEFF_OTHER, &mut poly.poly_coeff_other);
    take(ind.iono_dot, v, PolyValidity::IONODOT, &mut poly.iono_dot);
    take(ind.iono_delay, v, PolyValidity::IONODELAY, &mut poly.iono_delay);
    take(ind.sbas_iono_dot, v, PolyValidity::SBAS_IONODOT, &mut poly.sbas_iono_dot);
    take(ind.sbas_iono_delay, v, PolyValidity::SBAS_IONODELAY, &mut poly.sbas_iono_delay);
    take(ind.tropo_delay, v, PolyValidity::TROPODELAY, &mut poly.tropo_delay);
    take(ind.elevation, v, PolyValidity::ELEVATION, &mut poly.elevation);
    take(ind.elevation_dot, v, PolyValidity::ELEVATIONDOT, &mut poly.elevation_dot);
    take(ind.elevation_unc, v, PolyValidity::ELEVATIONUNC, &mut poly.elevation_unc);
    take(ind.velocity_coeff, v, PolyValidity::VELO_COEFF, &mut poly.velocity_coeff);
    take(ind.enhanced_iod, v, PolyValidity::ENHANCED_IOD, &mut poly.enhanced_iod);

    Some(poly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_sv_dropped() {
        assert!(convert_polynomial(&SvPolynomialInd::default()).is_none());
    }

    #[test]
    fn test_validity_tracks_present_fields() {
        let ind = SvPolynomialInd {
            gnss_sv_id: 12,
            t0: 1234.5,
            iode: Some(77),
            poly_coeff_xyz0: Some([1.0, 2.0, 3.0, 4.0]),
            velocity_coeff: Some([0.5; 12]),
            ..Default::default()
        };

        let poly = convert_polynomial(&ind).unwrap();
        assert_eq!(
            poly.validity,
            PolyValidity::IODE | PolyValidity::POLYCOEFF_XYZ0 | PolyValidity::VELO_COEFF
        );
        assert_eq!(poly.iode, 77);
        assert_eq!(poly.t0, 1234.5);
        assert_eq!(poly.poly_coeff_xyz0, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(poly.velocity_coeff, [0.5; 12]);
        assert_eq!(poly.enhanced_iod, 0);
    }
}

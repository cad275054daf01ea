// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Unit conversions at the model boundary.
//!
//! Inside the model every quantity is canonical SI; importers convert on
//! entry and exporters convert on exit. Only the pairs the spreadsheet
//! exporter actually writes are covered.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    // SI
    M,
    M2,
    M3,
    M3PerHour,
    WPerM2K,
    WPerMK,
    DegC,
    Liter,
    // IP
    Ft,
    Ft2,
    Ft3,
    Cfm,
    BtuPerHrFt2F,
    BtuPerHrFtF,
    DegF,
    Gallon,
}

/// Convert `value` between units, or `None` for an unsupported pair.
/// Identity conversions are always supported.
pub fn convert(value: f64, from: Unit, to: Unit) -> Option<f64> {
    use Unit::*;
    if from == to {
        return Some(value);
    }
    let converted = match (from, to) {
        (M, Ft) => value * 3.280_839_895,
        (Ft, M) => value / 3.280_839_895,
        (M2, Ft2) => value * 10.763_910_417,
        (Ft2, M2) => value / 10.763_910_417,
        (M3, Ft3) => value * 35.314_666_721,
        (Ft3, M3) => value / 35.314_666_721,
        (M3PerHour, Cfm) => value * 0.588_577_779,
        (Cfm, M3PerHour) => value / 0.588_577_779,
        (WPerM2K, BtuPerHrFt2F) => value * 0.176_110_184,
        (BtuPerHrFt2F, WPerM2K) => value / 0.176_110_184,
        (WPerMK, BtuPerHrFtF) => value * 0.577_789_236,
        (BtuPerHrFtF, WPerMK) => value / 0.577_789_236,
        (DegC, DegF) => value * 9.0 / 5.0 + 32.0,
        (DegF, DegC) => (value - 32.0) * 5.0 / 9.0,
        (Liter, Gallon) => value * 0.264_172_052,
        (Gallon, Liter) => value / 0.264_172_052,
        _ => return None,
    };
    Some(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn identity() {
        assert_eq!(convert(3.5, Unit::M2, Unit::M2), Some(3.5));
    }

    #[test]
    fn area_round_trips() {
        let si = 12.5;
        let ip = convert(si, Unit::M2, Unit::Ft2).unwrap();
        let back = convert(ip, Unit::Ft2, Unit::M2).unwrap();
        assert!(approx_eq!(f64, si, back, epsilon = 1e-9));
    }

    #[test]
    fn temperature_is_affine() {
        assert!(approx_eq!(
            f64,
            convert(20.0, Unit::DegC, Unit::DegF).unwrap(),
            68.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn unsupported_pair_is_none() {
        assert_eq!(convert(1.0, Unit::M2, Unit::DegF), None);
    }
}

///! Reference frame helpers: sidereal time, TEME to Earth-fixed rotation,
///! Earth-fixed to WGS-84 geodetic conversion.

use chrono::{DateTime, Utc};
use std::f64::consts::{PI, TAU};

/// WGS-84 equatorial radius (km)
pub const WGS84_A_KM: f64 = 6378.137;
/// WGS-84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

const GEODETIC_MAX_ITERATIONS: usize = 20;
const GEODETIC_TOLERANCE_RAD: f64 = 1e-12;

/// Geodetic coordinates in radians and kilometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub longitude: f64,
    pub latitude: f64,
    pub height_km: f64,
}

/// Greenwich mean sidereal time in radians, [0, 2π).
///
/// IAU-82 expression, the one SGP4 pairs with TEME output (UT1
/// approximated by UTC).
pub fn gmst(instant: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
        .rem_euclid(TAU)
}

/// Rotate a TEME vector about the polar axis by `gmst` into the
/// Earth-fixed frame
pub fn teme_to_ecef(position: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin, cos) = gmst.sin_cos();
    [
        cos * position[0] + sin * position[1],
        -sin * position[0] + cos * position[1],
        position[2],
    ]
}

/// Earth-fixed cartesian (km) to WGS-84 geodetic.
///
/// Longitude in (-π, π]. Latitude is solved iteratively; the height
/// expression stays finite at the poles.
pub fn ecef_to_geodetic(position: [f64; 3]) -> Geodetic {
    let [x, y, z] = position;
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let p = x.hypot(y);

    let longitude = y.atan2(x);
    let mut latitude = z.atan2(p * (1.0 - e2));
    let mut height_km = 0.0;

    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let n = WGS84_A_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        height_km = p * cos_lat + z * sin_lat - WGS84_A_KM * WGS84_A_KM / n;

        let next = z.atan2(p * (1.0 - e2 * n / (n + height_km)));
        let converged = (next - latitude).abs() < GEODETIC_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }

    Geodetic {
        longitude: normalize_longitude(longitude),
        latitude,
        height_km,
    }
}

/// Map any angle onto (-π, π]
pub fn normalize_longitude(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gmst_at_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((gmst(j2000).to_degrees() - 280.460_618_37).abs() < 1e-6);
    }

    #[test]
    fn test_gmst_range() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        for days in [0, 100, 5000, 9000] {
            let instant = j2000 + chrono::Duration::days(days);
            let theta = gmst(instant);
            assert!((0.0..TAU).contains(&theta), "{} at +{} days", theta, days);
        }
    }

    #[test]
    fn test_gmst_advances_one_sidereal_day() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        // 23h 56m 4.0905s
        let later = start + chrono::Duration::milliseconds(86_164_090);
        let diff = normalize_longitude(gmst(later) - gmst(start));
        assert!(diff.abs() < 1e-5);
    }

    #[test]
    fn test_rotation_preserves_norm_and_z() {
        let v = [7000.0, -1400.0, 300.0];
        let r = teme_to_ecef(v, 1.234);
        let norm = |a: [f64; 3]| (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt();
        assert!((norm(v) - norm(r)).abs() < 1e-9);
        assert_eq!(r[2], 300.0);

        let quarter = teme_to_ecef([1.0, 0.0, 0.0], PI / 2.0);
        assert!(quarter[0].abs() < 1e-12);
        assert!((quarter[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_geodetic_on_equator() {
        let g = ecef_to_geodetic([WGS84_A_KM + 400.0, 0.0, 0.0]);
        assert!(g.longitude.abs() < 1e-12);
        assert!(g.latitude.abs() < 1e-12);
        assert!((g.height_km - 400.0).abs() < 1e-9);

        let g = ecef_to_geodetic([0.0, -(WGS84_A_KM + 35_786.0), 0.0]);
        assert!((g.longitude.to_degrees() + 90.0).abs() < 1e-9);
        assert!((g.height_km - 35_786.0).abs() < 1e-6);
    }

    #[test]
    fn test_geodetic_at_pole() {
        let b = WGS84_A_KM * (1.0 - WGS84_F);
        let g = ecef_to_geodetic([0.0, 0.0, b + 100.0]);
        assert!((g.latitude.to_degrees() - 90.0).abs() < 1e-9);
        assert!((g.height_km - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_geodetic_mid_latitude_round_trip() {
        // 45°N 10°E, 500 km
        let (lat, lon, h) = (45f64.to_radians(), 10f64.to_radians(), 500.0);
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let n = WGS84_A_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let ecef = [
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + h) * lat.sin(),
        ];

        let g = ecef_to_geodetic(ecef);
        assert!((g.latitude - lat).abs() < 1e-10);
        assert!((g.longitude - lon).abs() < 1e-12);
        assert!((g.height_km - h).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_longitude() {
        assert!((normalize_longitude(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_longitude(-PI) - PI).abs() < 1e-12);
        assert!((normalize_longitude(PI) - PI).abs() < 1e-12);
        assert!(normalize_longitude(0.0).abs() < 1e-12);
    }
}

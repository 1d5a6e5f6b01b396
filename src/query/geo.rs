//! Derived columns, computed at query time from stored values

use chrono::{Datelike, NaiveDate};

use crate::config::EARTH_RADIUS_KM;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Haversine distance on a sphere of radius [`EARTH_RADIUS_KM`]
pub fn great_circle_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Whole years between `birthdate` and `today`
pub fn age_years(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

/// Parse a stored ISO date
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_point_is_zero() {
        let scl = Coordinates::new(-33.39, -70.79);
        assert_eq!(great_circle_km(scl, scl), 0.0);
    }

    #[test]
    fn test_antipodal_points() {
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        let d = great_circle_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert!((d - expected).abs() < 1e-6, "{}", d);
        assert!((d - 20015.0).abs() < 1.0);

        let poles = great_circle_km(Coordinates::new(90.0, 0.0), Coordinates::new(-90.0, 0.0));
        assert!((poles - expected).abs() < 1e-6);
    }

    #[test]
    fn test_known_route() {
        let scl = Coordinates::new(-33.393, -70.7858);
        let lim = Coordinates::new(-12.0219, -77.1143);
        let d = great_circle_km(scl, lim);
        assert!((d - 2462.0).abs() < 5.0, "{}", d);
        assert!((great_circle_km(lim, scl) - d).abs() < 1e-9);
    }

    #[test]
    fn test_age() {
        let birth = date(1990, 3, 5);
        assert_eq!(age_years(birth, date(2024, 3, 4)), 33);
        assert_eq!(age_years(birth, date(2024, 3, 5)), 34);
        assert_eq!(age_years(birth, date(1990, 3, 5)), 0);
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("1990-03-05"), Some(date(1990, 3, 5)));
        assert_eq!(parse_iso_date("Invalid date"), None);
    }
}

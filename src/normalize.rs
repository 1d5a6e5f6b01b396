//! Field normalization: Spanish long-form dates and numeric strings.
//!
//! Ages and distances are not computed here. They are derived at query time
//! from the stored birthdate and coordinates (see [`crate::query::geo`]).

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::NormalizationError;

const MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

fn spanish_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d{1,2})\s+de\s+(\p{L}+)\s+de\s+(\d{4})\s*$")
            .expect("date pattern is valid")
    })
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// Parse a date such as `15 de enero de 2020`
pub fn parse_spanish_date(field: &'static str, raw: &str) -> Result<NaiveDate, NormalizationError> {
    let invalid = || NormalizationError {
        field,
        value: raw.to_string(),
        expected: "date (D de MES de YYYY)",
    };

    let caps = spanish_date_pattern().captures(raw).ok_or_else(invalid)?;
    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month = month_number(&caps[2]).ok_or_else(invalid)?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Normalize a Spanish long-form date to ISO 8601 `YYYY-MM-DD`
pub fn normalize_date(field: &'static str, raw: &str) -> Result<String, NormalizationError> {
    parse_spanish_date(field, raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parse a numeric field. `NaN` and infinities count as invalid so that a
/// stored value is always usable by distance and average computations.
pub fn normalize_number(field: &'static str, raw: &str) -> Result<f64, NormalizationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| NormalizationError {
            field,
            value: raw.to_string(),
            expected: "number",
        })
}

/// Collects normalization failures for one record while yielding `None` for
/// the affected field
#[derive(Debug, Default)]
pub struct Normalizer {
    warnings: Vec<NormalizationError>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(&mut self, field: &'static str, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        self.keep(normalize_date(field, raw))
    }

    pub fn number(&mut self, field: &'static str, raw: Option<&str>) -> Option<f64> {
        let raw = raw?;
        self.keep(normalize_number(field, raw))
    }

    fn keep<T>(&mut self, result: Result<T, NormalizationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.warnings.push(err);
                None
            }
        }
    }

    pub fn into_warnings(self) -> Vec<NormalizationError> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanish_date() {
        assert_eq!(normalize_date("birthDate", "5 de marzo de 1990").unwrap(), "1990-03-05");
        assert_eq!(normalize_date("birthDate", "15 de enero de 2020").unwrap(), "2020-01-15");
        assert_eq!(
            normalize_date("birthDate", "31 de Diciembre de 1999").unwrap(),
            "1999-12-31"
        );
        assert_eq!(normalize_date("birthDate", "1 de setiembre de 2001").unwrap(), "2001-09-01");
    }

    #[test]
    fn test_invalid_dates() {
        for raw in [
            "",
            "1990-03-05",
            "5 of march 1990",
            "5 de marzzo de 1990",
            "30 de febrero de 2020",
            "32 de enero de 2020",
        ] {
            let err = normalize_date("birthDate", raw).unwrap_err();
            assert_eq!(err.field, "birthDate");
            assert_eq!(err.value, raw);
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(normalize_number("lat", "-33.39").unwrap(), -33.39);
        assert_eq!(normalize_number("height", " 172.5 ").unwrap(), 172.5);
        assert!(normalize_number("lat", "abc").is_err());
        assert!(normalize_number("lat", "NaN").is_err());
        assert!(normalize_number("lat", "inf").is_err());
        assert!(normalize_number("lat", "").is_err());
    }

    #[test]
    fn test_normalizer_collects_warnings() {
        let mut normalizer = Normalizer::new();
        assert_eq!(normalizer.number("height", Some("180")), Some(180.0));
        assert_eq!(normalizer.number("weight", Some("heavy")), None);
        assert_eq!(normalizer.date("birthDate", None), None);
        let warnings = normalizer.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "weight");
    }
}

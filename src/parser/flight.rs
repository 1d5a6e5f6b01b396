//! `flights/<year>/<month>/flight_data.json`: a JSON array of flights.
//!
//! Rows carry no period; year and month come from the object path and are
//! stamped onto every record.

use serde::Deserialize;
use serde_json::Value;

use super::record::{non_empty, utf8, Canonical, Flight, FormatParser, ParsedRow, Record};
use crate::error::ParseError;

/// Fields stay loose: codes and registrations appear as bare numbers too
#[derive(Debug, Deserialize)]
struct RawFlight {
    #[serde(rename = "flightNumber")]
    flight_number: Option<Value>,
    #[serde(rename = "originIATA")]
    origin_iata: Option<Value>,
    #[serde(rename = "destinationIATA")]
    destination_iata: Option<Value>,
    airline: Option<Value>,
    #[serde(rename = "aircraftID")]
    aircraft_id: Option<Value>,
}

/// Render a JSON scalar as text; null, arrays and objects count as absent
fn scalar(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub struct FlightParser {
    pub year: i32,
    pub month: u32,
}

impl FlightParser {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    fn to_record(&self, entry: Value) -> ParsedRow {
        let raw: RawFlight =
            serde_json::from_value(entry).map_err(|e| ParseError::Record(e.to_string()))?;

        let flight_number =
            scalar(&raw.flight_number).ok_or(ParseError::MissingField("flightNumber"))?;

        Ok(Canonical::from(Record::Flight(Flight {
            year: self.year,
            month: self.month,
            flight_number,
            origin_iata: scalar(&raw.origin_iata),
            destination_iata: scalar(&raw.destination_iata),
            airline: scalar(&raw.airline),
            aircraft_id: scalar(&raw.aircraft_id),
        })))
    }
}

impl FormatParser for FlightParser {
    fn format(&self) -> &'static str {
        "json"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError> {
        let text = utf8(self.format(), bytes)?;
        let entries: Vec<Value> = serde_json::from_str(text).map_err(|e| ParseError::Document {
            format: "json",
            message: e.to_string(),
        })?;

        Ok(entries.into_iter().map(|entry| self.to_record(entry)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_comes_from_parser() {
        let data = r#"[
            {"flightNumber": "LA100", "originIATA": "SCL", "destinationIATA": "LIM", "airline": "LATAM", "aircraftID": "CC-BAA"},
            {"flightNumber": "LA200", "originIATA": "LIM", "destinationIATA": "SCL", "airline": "LATAM", "aircraftID": "CC-BAB", "year": 1999}
        ]"#;
        let rows = FlightParser::new(2023, 7).parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        for row in &rows {
            match &row.as_ref().unwrap().record {
                Record::Flight(f) => {
                    assert_eq!(f.year, 2023);
                    assert_eq!(f.month, 7);
                }
                other => panic!("unexpected record {:?}", other),
            }
        }
    }

    #[test]
    fn test_entry_without_flight_number() {
        let data = r#"[{"originIATA": "SCL"}, {"flightNumber": 981, "originIATA": "SCL"}, 42]"#;
        let rows = FlightParser::new(2023, 1).parse(data.as_bytes()).unwrap();
        assert_eq!(rows[0], Err(ParseError::MissingField("flightNumber")));
        assert_eq!(rows[1].as_ref().unwrap().record.key(), "981");
        assert!(matches!(rows[2], Err(ParseError::Record(_))));
    }

    #[test]
    fn test_numeric_descriptive_fields_are_kept() {
        let data = r#"[{"flightNumber": "LA1", "originIATA": "SCL", "destinationIATA": "LIM", "airline": 4, "aircraftID": 737}]"#;
        let rows = FlightParser::new(2023, 7).parse(data.as_bytes()).unwrap();

        match &rows[0].as_ref().unwrap().record {
            Record::Flight(f) => {
                assert_eq!(f.flight_number, "LA1");
                assert_eq!(f.aircraft_id.as_deref(), Some("737"));
                assert_eq!(f.airline.as_deref(), Some("4"));
                assert_eq!(f.origin_iata.as_deref(), Some("SCL"));
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_null_and_nested_fields_are_absent() {
        let data = r#"[{"flightNumber": "LA2", "originIATA": null, "aircraftID": {"id": 1}, "airline": ""}]"#;
        let rows = FlightParser::new(2023, 7).parse(data.as_bytes()).unwrap();

        match &rows[0].as_ref().unwrap().record {
            Record::Flight(f) => {
                assert_eq!(f.origin_iata, None);
                assert_eq!(f.aircraft_id, None);
                assert_eq!(f.airline, None);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_not_an_array() {
        let err = FlightParser::new(2023, 1)
            .parse(br#"{"flightNumber": "LA100"}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::Document { format: "json", .. }));
    }
}

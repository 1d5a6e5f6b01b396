//! `aircrafts.xml`: repeated `<row>` elements under the document root

use serde::Deserialize;

use super::record::{non_empty, utf8, Aircraft, Canonical, FormatParser, ParsedRow, Record};
use crate::error::ParseError;

#[derive(Debug, Deserialize)]
struct AircraftDocument {
    #[serde(rename = "row", default)]
    rows: Vec<AircraftRow>,
}

/// Each field may repeat; only the first text value is used
#[derive(Debug, Deserialize)]
struct AircraftRow {
    #[serde(rename = "aircraftID", default)]
    aircraft_id: Vec<String>,
    #[serde(default)]
    name: Vec<String>,
    #[serde(rename = "aircraftType", default)]
    aircraft_type: Vec<String>,
}

fn first(values: &[String]) -> Option<String> {
    values.first().and_then(|v| non_empty(v))
}

impl AircraftRow {
    fn into_record(self) -> ParsedRow {
        let aircraft_id = first(&self.aircraft_id).ok_or(ParseError::MissingField("aircraftID"))?;
        Ok(Canonical::from(Record::Aircraft(Aircraft {
            aircraft_id,
            name: first(&self.name),
            aircraft_type: first(&self.aircraft_type),
        })))
    }
}

pub struct AircraftParser;

impl FormatParser for AircraftParser {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError> {
        let text = utf8(self.format(), bytes)?;
        let document: AircraftDocument =
            quick_xml::de::from_str(text).map_err(|e| ParseError::Document {
                format: "xml",
                message: e.to_string(),
            })?;

        Ok(document.rows.into_iter().map(AircraftRow::into_record).collect())
    }
}

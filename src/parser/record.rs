use crate::error::{NormalizationError, ParseError};
use crate::schema::{TableSchema, AIRCRAFTS, AIRPORTS, FLIGHTS, PASSENGERS, TICKETS};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub aircraft_id: String,
    pub name: Option<String>,
    pub aircraft_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub iata: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub year: i32,
    pub month: u32,
    pub flight_number: String,
    pub origin_iata: Option<String>,
    pub destination_iata: Option<String>,
    pub airline: Option<String>,
    pub aircraft_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub passenger_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// ISO 8601 date
    pub birthdate: Option<String>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub ticket_id: i64,
    pub passenger_id: i64,
    pub flight_number: String,
    pub flight_type: Option<String>,
    pub seat_number: Option<String>,
}

/// A normalized row ready for insertion, independent of source format
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Aircraft(Aircraft),
    Airport(Airport),
    Flight(Flight),
    Passenger(Passenger),
    Ticket(Ticket),
}

impl Record {
    pub fn table(&self) -> &'static TableSchema {
        match self {
            Record::Aircraft(_) => &AIRCRAFTS,
            Record::Airport(_) => &AIRPORTS,
            Record::Flight(_) => &FLIGHTS,
            Record::Passenger(_) => &PASSENGERS,
            Record::Ticket(_) => &TICKETS,
        }
    }

    /// Natural key, for log and error messages
    pub fn key(&self) -> String {
        match self {
            Record::Aircraft(a) => a.aircraft_id.clone(),
            Record::Airport(a) => a.iata.clone(),
            Record::Flight(f) => f.flight_number.clone(),
            Record::Passenger(p) => p.passenger_id.to_string(),
            Record::Ticket(t) => t.ticket_id.to_string(),
        }
    }

    /// Values in the column order of [`Record::table`]
    pub fn values(&self) -> Vec<SqlValue> {
        match self {
            Record::Aircraft(a) => vec![
                a.aircraft_id.clone().into(),
                a.name.clone().into(),
                a.aircraft_type.clone().into(),
            ],
            Record::Airport(a) => vec![
                a.iata.clone().into(),
                a.name.clone().into(),
                a.city.clone().into(),
                a.country.clone().into(),
                a.lat.into(),
                a.lon.into(),
            ],
            Record::Flight(f) => vec![
                i64::from(f.year).into(),
                i64::from(f.month).into(),
                f.flight_number.clone().into(),
                f.origin_iata.clone().into(),
                f.destination_iata.clone().into(),
                f.airline.clone().into(),
                f.aircraft_id.clone().into(),
            ],
            Record::Passenger(p) => vec![
                p.passenger_id.into(),
                p.first_name.clone().into(),
                p.last_name.clone().into(),
                p.birthdate.clone().into(),
                p.gender.clone().into(),
                p.height_cm.into(),
                p.weight_kg.into(),
                p.avatar.clone().into(),
            ],
            Record::Ticket(t) => vec![
                t.ticket_id.into(),
                t.passenger_id.into(),
                t.flight_number.clone().into(),
                t.flight_type.clone().into(),
                t.seat_number.clone().into(),
            ],
        }
    }
}

/// A record that parsed, with any fields that were loaded as missing
#[derive(Debug, Clone, PartialEq)]
pub struct Canonical {
    pub record: Record,
    pub warnings: Vec<NormalizationError>,
}

impl Canonical {
    pub fn new(record: Record, warnings: Vec<NormalizationError>) -> Self {
        Self { record, warnings }
    }
}

impl From<Record> for Canonical {
    fn from(record: Record) -> Self {
        Self::new(record, Vec::new())
    }
}

/// Outcome of parsing one entry of a document
pub type ParsedRow = Result<Canonical, ParseError>;

/// Converts raw object bytes into an ordered sequence of records.
///
/// An `Err` means the document as a whole could not be read; individual bad
/// entries are reported inside the returned rows.
pub trait FormatParser {
    fn format(&self) -> &'static str;
    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError>;
}

/// Empty strings are treated as absent
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn utf8<'a>(format: &'static str, bytes: &'a [u8]) -> Result<&'a str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::Document {
        format,
        message: e.to_string(),
    })
}

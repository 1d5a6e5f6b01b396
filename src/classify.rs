//! Maps source object names to the format that can read them

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::parser::{
    AircraftParser, AirportParser, FlightParser, FormatParser, PassengerParser, TicketParser,
};

/// What a source object contains, decided from its name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Aircraft,
    Airport,
    Passenger,
    Ticket,
    Flight { year: i32, month: u32 },
    Unrecognized,
}

fn flight_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"flights/(\d{4})/(\d{2})/flight_data\.json").expect("flight pattern is valid")
    })
}

impl SourceKind {
    pub fn classify(name: &str) -> Self {
        if name.contains("aircrafts.xml") {
            return SourceKind::Aircraft;
        }
        if name.contains("airports.csv") {
            return SourceKind::Airport;
        }
        if name.contains("passengers.yaml") {
            return SourceKind::Passenger;
        }
        if name.contains("tickets.csv") {
            return SourceKind::Ticket;
        }

        let Some(caps) = flight_path_pattern().captures(name) else {
            return SourceKind::Unrecognized;
        };
        let year = caps[1].parse::<i32>();
        let month = caps[2].parse::<u32>();
        match (year, month) {
            (Ok(year), Ok(month)) if (1..=12).contains(&month) => SourceKind::Flight { year, month },
            _ => SourceKind::Unrecognized,
        }
    }

    /// Parser for this kind, or `None` when the object should be skipped
    pub fn parser(&self) -> Option<Box<dyn FormatParser>> {
        match *self {
            SourceKind::Aircraft => Some(Box::new(AircraftParser)),
            SourceKind::Airport => Some(Box::new(AirportParser)),
            SourceKind::Passenger => Some(Box::new(PassengerParser)),
            SourceKind::Ticket => Some(Box::new(TicketParser)),
            SourceKind::Flight { year, month } => Some(Box::new(FlightParser::new(year, month))),
            SourceKind::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SourceKind::Unrecognized)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Aircraft => write!(f, "aircraft"),
            SourceKind::Airport => write!(f, "airport"),
            SourceKind::Passenger => write!(f, "passenger"),
            SourceKind::Ticket => write!(f, "ticket"),
            SourceKind::Flight { year, month } => write!(f, "flight {}-{:02}", year, month),
            SourceKind::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

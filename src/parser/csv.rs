//! `airports.csv` and `tickets.csv`.
//!
//! Lines are split on `\n` and fields on `,` with no quoting or escaping.
//! There is no header detection: a header line is parsed like any other
//! line. For airports it loads as a row keyed by the header text; for tickets
//! it fails the integer key parse and is reported as a dropped record.

use super::record::{non_empty, utf8, Airport, Canonical, FormatParser, ParsedRow, Record, Ticket};
use crate::error::ParseError;
use crate::normalize::Normalizer;

const AIRPORT_FIELDS: usize = 6;
const TICKET_FIELDS: usize = 5;

/// Split a document into field lists, one per non-empty line
fn split_lines(text: &str) -> impl Iterator<Item = Vec<&str>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').collect())
}

fn expect_fields(fields: &[&str], expected: usize) -> Result<(), ParseError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(ParseError::FieldCount {
            expected,
            found: fields.len(),
        })
    }
}

fn parse_key(field: &'static str, raw: &str) -> Result<i64, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidKey {
        field,
        value: raw.to_string(),
    })
}

pub struct AirportParser;

impl AirportParser {
    fn parse_line(fields: &[&str]) -> ParsedRow {
        expect_fields(fields, AIRPORT_FIELDS)?;
        let iata = non_empty(fields[0]).ok_or(ParseError::MissingField("airportIATA"))?;

        let mut normalizer = Normalizer::new();
        let lat = normalizer.number("lat", Some(fields[4]));
        let lon = normalizer.number("lon", Some(fields[5]));

        let record = Record::Airport(Airport {
            iata,
            name: non_empty(fields[1]),
            city: non_empty(fields[2]),
            country: non_empty(fields[3]),
            lat,
            lon,
        });
        Ok(Canonical::new(record, normalizer.into_warnings()))
    }
}

impl FormatParser for AirportParser {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError> {
        let text = utf8(self.format(), bytes)?;
        Ok(split_lines(text).map(|fields| Self::parse_line(&fields)).collect())
    }
}

pub struct TicketParser;

impl TicketParser {
    fn parse_line(fields: &[&str]) -> ParsedRow {
        expect_fields(fields, TICKET_FIELDS)?;
        let ticket_id = parse_key("ticketID", fields[0])?;
        let passenger_id = parse_key("passengerID", fields[1])?;
        let flight_number = non_empty(fields[2]).ok_or(ParseError::MissingField("flightNumber"))?;

        Ok(Canonical::from(Record::Ticket(Ticket {
            ticket_id,
            passenger_id,
            flight_number,
            flight_type: non_empty(fields[3]),
            seat_number: non_empty(fields[4]),
        })))
    }
}

impl FormatParser for TicketParser {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError> {
        let text = utf8(self.format(), bytes)?;
        Ok(split_lines(text).map(|fields| Self::parse_line(&fields)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airports() {
        let data = "SCL,Arturo Merino Benitez,Santiago,Chile,-33.39,-70.79\nLIM,Jorge Chavez,Lima,Peru,-12.02,-77.11\n";
        let rows = AirportParser.parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let scl = rows[0].as_ref().unwrap();
        assert!(scl.warnings.is_empty());
        match &scl.record {
            Record::Airport(a) => {
                assert_eq!(a.iata, "SCL");
                assert_eq!(a.city.as_deref(), Some("Santiago"));
                assert_eq!(a.lat, Some(-33.39));
                assert_eq!(a.lon, Some(-70.79));
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_airport_header_loads_as_data() {
        let data = "airportIATA,name,city,country,lat,lon\nSCL,Arturo Merino Benitez,Santiago,Chile,-33.39,-70.79";
        let rows = AirportParser.parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let header = rows[0].as_ref().unwrap();
        assert_eq!(header.record.key(), "airportIATA");
        assert_eq!(header.warnings.len(), 2);
        match &header.record {
            Record::Airport(a) => assert_eq!((a.lat, a.lon), (None, None)),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_quoted_commas_are_not_supported() {
        let data = "JFK,\"Kennedy, John F.\",New York,USA,40.64,-73.78";
        let rows = AirportParser.parse(data.as_bytes()).unwrap();
        assert_eq!(
            rows[0],
            Err(ParseError::FieldCount {
                expected: 6,
                found: 7
            })
        );
    }

    #[test]
    fn test_tickets() {
        let data = "1,10,LA100,Economy,12A\r\n2,11,LA100,Business,1C\r\n";
        let rows = TicketParser.parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].as_ref().unwrap().record,
            Record::Ticket(Ticket {
                ticket_id: 2,
                passenger_id: 11,
                flight_number: "LA100".into(),
                flight_type: Some("Business".into()),
                seat_number: Some("1C".into()),
            })
        );
    }

    #[test]
    fn test_bad_ticket_line_does_not_stop_the_rest() {
        let data = "ticketID,passengerID,flightNumber,flightType,seatNumber\n1,10,LA100,Economy\n2,11,LA100,Economy,3B";
        let rows = TicketParser.parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(matches!(
            rows[0],
            Err(ParseError::InvalidKey { field: "ticketID", .. })
        ));
        assert_eq!(
            rows[1],
            Err(ParseError::FieldCount {
                expected: 5,
                found: 4
            })
        );
        assert_eq!(rows[2].as_ref().unwrap().record.key(), "2");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = TicketParser.parse(&[0xff, 0xfe, b'\n']).unwrap_err();
        assert!(matches!(err, ParseError::Document { format: "csv", .. }));
    }
}

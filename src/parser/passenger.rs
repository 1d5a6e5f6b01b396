//! `passengers.yaml`: a `passengers` sequence of mappings

use serde::Deserialize;
use serde_yaml::Value;

use super::record::{non_empty, utf8, Canonical, FormatParser, ParsedRow, Passenger, Record};
use crate::error::ParseError;
use crate::normalize::Normalizer;

#[derive(Debug, Deserialize)]
struct PassengerDocument {
    passengers: Vec<Value>,
}

/// One entry as written in the file. Scalars are kept loose since heights
/// and IDs show up both quoted and bare.
#[derive(Debug, Deserialize)]
struct RawPassenger {
    #[serde(rename = "passengerID")]
    passenger_id: Option<Value>,
    #[serde(rename = "firstName")]
    first_name: Option<Value>,
    #[serde(rename = "lastName")]
    last_name: Option<Value>,
    #[serde(rename = "birthDate")]
    birth_date: Option<Value>,
    gender: Option<Value>,
    #[serde(rename = "height(cm)")]
    height_cm: Option<Value>,
    #[serde(rename = "weight(kg)")]
    weight_kg: Option<Value>,
    avatar: Option<Value>,
}

/// Render a YAML scalar as text; mappings and sequences count as absent
fn scalar(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl RawPassenger {
    fn into_record(self) -> ParsedRow {
        let raw_id = scalar(&self.passenger_id).ok_or(ParseError::MissingField("passengerID"))?;
        let passenger_id = raw_id.parse().map_err(|_| ParseError::InvalidKey {
            field: "passengerID",
            value: raw_id.clone(),
        })?;

        let mut normalizer = Normalizer::new();
        let birthdate = normalizer.date("birthDate", scalar(&self.birth_date).as_deref());
        let height_cm = normalizer.number("height(cm)", scalar(&self.height_cm).as_deref());
        let weight_kg = normalizer.number("weight(kg)", scalar(&self.weight_kg).as_deref());

        let record = Record::Passenger(Passenger {
            passenger_id,
            first_name: scalar(&self.first_name),
            last_name: scalar(&self.last_name),
            birthdate,
            gender: scalar(&self.gender),
            height_cm,
            weight_kg,
            avatar: scalar(&self.avatar),
        });
        Ok(Canonical::new(record, normalizer.into_warnings()))
    }
}

pub struct PassengerParser;

impl FormatParser for PassengerParser {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, ParseError> {
        let text = utf8(self.format(), bytes)?;
        let document: PassengerDocument =
            serde_yaml::from_str(text).map_err(|e| ParseError::Document {
                format: "yaml",
                message: e.to_string(),
            })?;

        Ok(document
            .passengers
            .into_iter()
            .map(|entry| {
                serde_yaml::from_value::<RawPassenger>(entry)
                    .map_err(|e| ParseError::Record(e.to_string()))
                    .and_then(RawPassenger::into_record)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
passengers:
  - passengerID: 1
    firstName: Ana
    lastName: Rojas
    birthDate: 5 de marzo de 1990
    gender: female
    height(cm): 165.5
    weight(kg): "58"
    avatar: https://example.com/ana.png
  - passengerID: 2
    firstName: Luis
    lastName: Soto
    birthDate: ayer
    gender: male
    height(cm): 180
    weight(kg): 80
  - firstName: Nobody
"#;

    #[test]
    fn test_parse_passengers() {
        let rows = PassengerParser.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        let ana = rows[0].as_ref().unwrap();
        assert!(ana.warnings.is_empty());
        assert_eq!(
            ana.record,
            Record::Passenger(Passenger {
                passenger_id: 1,
                first_name: Some("Ana".into()),
                last_name: Some("Rojas".into()),
                birthdate: Some("1990-03-05".into()),
                gender: Some("female".into()),
                height_cm: Some(165.5),
                weight_kg: Some(58.0),
                avatar: Some("https://example.com/ana.png".into()),
            })
        );
    }

    #[test]
    fn test_bad_birthdate_loads_without_date() {
        let rows = PassengerParser.parse(SAMPLE.as_bytes()).unwrap();
        let luis = rows[1].as_ref().unwrap();
        assert_eq!(luis.warnings.len(), 1);
        assert_eq!(luis.warnings[0].field, "birthDate");
        match &luis.record {
            Record::Passenger(p) => {
                assert_eq!(p.birthdate, None);
                assert_eq!(p.height_cm, Some(180.0));
                assert_eq!(p.avatar, None);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_missing_id_is_dropped() {
        let rows = PassengerParser.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows[2], Err(ParseError::MissingField("passengerID")));
    }

    #[test]
    fn test_document_without_passengers() {
        let err = PassengerParser.parse(b"people: []").unwrap_err();
        assert!(matches!(err, ParseError::Document { format: "yaml", .. }));
    }
}

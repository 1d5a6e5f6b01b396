//! Table schema definitions for the five flight tables

use super::types::*;

// =============================================================================
// Reference tables (no FK dependencies)
// =============================================================================

pub static AIRCRAFTS: TableSchema = TableSchema {
    name: "aircrafts",
    source_pattern: "aircrafts.xml",
    columns: &[
        Column::key("aircraftID", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("aircraftType", ColumnType::Text),
    ],
    foreign_keys: &[],
};

pub static AIRPORTS: TableSchema = TableSchema {
    name: "airports",
    source_pattern: "airports.csv",
    columns: &[
        Column::key("airportIATA", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("city", ColumnType::Text),
        Column::new("country", ColumnType::Text),
        Column::new("lat", ColumnType::Real),
        Column::new("lon", ColumnType::Real),
    ],
    foreign_keys: &[],
};

pub static PASSENGERS: TableSchema = TableSchema {
    name: "passengers",
    source_pattern: "passengers.yaml",
    columns: &[
        Column::key("passengerID", ColumnType::Integer),
        Column::new("firstName", ColumnType::Text),
        Column::new("lastName", ColumnType::Text),
        Column::new("birthdate", ColumnType::Date),
        Column::new("gender", ColumnType::Text),
        Column::new("height", ColumnType::Real),
        Column::new("weight", ColumnType::Real),
        Column::new("avatar", ColumnType::Text),
    ],
    foreign_keys: &[],
};

// =============================================================================
// Referencing tables
// =============================================================================

pub static FLIGHTS: TableSchema = TableSchema {
    name: "flights",
    source_pattern: "flights/<year>/<month>/flight_data.json",
    columns: &[
        Column::new("year", ColumnType::Integer),
        Column::new("month", ColumnType::Integer),
        Column::key("flightNumber", ColumnType::Text),
        Column::new("originIATA", ColumnType::Text),
        Column::new("destinationIATA", ColumnType::Text),
        Column::new("airline", ColumnType::Text),
        Column::new("aircraftID", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("originIATA", "airports", "airportIATA"),
        ForeignKey::new("destinationIATA", "airports", "airportIATA"),
        ForeignKey::new("aircraftID", "aircrafts", "aircraftID"),
    ],
};

pub static TICKETS: TableSchema = TableSchema {
    name: "tickets",
    source_pattern: "tickets.csv",
    columns: &[
        Column::key("ticketID", ColumnType::Integer),
        Column::required("passengerID", ColumnType::Integer),
        Column::required("flightNumber", ColumnType::Text),
        Column::new("flightType", ColumnType::Text),
        Column::new("seatNumber", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("passengerID", "passengers", "passengerID"),
        ForeignKey::new("flightNumber", "flights", "flightNumber"),
    ],
};

// =============================================================================
// Registry
// =============================================================================

/// All tables, referenced tables first
pub static ALL_TABLES: &[&TableSchema] = &[&AIRCRAFTS, &AIRPORTS, &PASSENGERS, &FLIGHTS, &TICKETS];

/// Get a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

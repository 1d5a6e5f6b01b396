pub mod aircraft;
pub mod csv;
pub mod flight;
pub mod passenger;
pub mod record;

pub use aircraft::AircraftParser;
pub use csv::{AirportParser, TicketParser};
pub use flight::FlightParser;
pub use passenger::PassengerParser;
pub use record::*;

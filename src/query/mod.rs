//! Paginated, sortable view over a finished database

pub mod geo;
pub mod page;
pub mod view;

pub use page::{PageRequest, Pagination, SortColumn, SortDirection};
pub use view::{FlightPage, FlightRow, FlightView};

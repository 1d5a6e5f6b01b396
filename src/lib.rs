//! Rebuilds a local SQLite database of flights, airports, aircraft,
//! passengers and tickets from heterogeneous source files, and serves a
//! paginated aggregate view over it.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod normalize;
pub mod parser;
pub mod query;
pub mod rebuild;
pub mod schema;
pub mod source;
pub mod ui;
pub mod writer;

pub use classify::SourceKind;
pub use cli::{Cli, Commands};
pub use error::{IngestError, QueryError, RebuildError};
pub use ingest::{ingest, RunReport};
pub use query::{FlightView, PageRequest};
pub use rebuild::{RebuildState, Rebuilder};
pub use ui::{Phase, SilentUi, Ui, UiApp};

use chrono::NaiveDate;
use rusqlite::functions::FunctionFlags;
use rusqlite::{named_params, Connection, OpenFlags, Row};
use std::path::Path;
use tracing::debug;

use super::geo::{age_years, great_circle_km, parse_iso_date, Coordinates};
use super::page::{PageRequest, Pagination};
use crate::error::QueryError;
use crate::rebuild::RebuildState;

/// Flights grouped by (year, month, flightNumber). Every join is a LEFT JOIN
/// so flights pointing at unknown airports or aircraft still show up, with
/// NULL in the looked-up columns.
const FLIGHTS_SELECT: &str = "
    SELECT
        flights.year AS year,
        flights.month AS month,
        flights.flightNumber AS flightNumber,
        flights.originIATA AS originIATA,
        origin.name AS originName,
        origin.city AS originCity,
        origin.country AS originCountry,
        flights.destinationIATA AS destinationIATA,
        dest.name AS destName,
        dest.city AS destCity,
        dest.country AS destCountry,
        flights.airline AS airline,
        flights.aircraftID AS aircraftID,
        aircrafts.name AS aircraftName,
        COUNT(tickets.ticketID) AS passengerCount,
        AVG(age_years(passengers.birthdate, :today)) AS averageAge,
        great_circle_km(origin.lat, origin.lon, dest.lat, dest.lon) AS distance
    FROM flights
    LEFT JOIN airports AS origin ON flights.originIATA = origin.airportIATA
    LEFT JOIN airports AS dest ON flights.destinationIATA = dest.airportIATA
    LEFT JOIN tickets ON flights.flightNumber = tickets.flightNumber
    LEFT JOIN passengers ON tickets.passengerID = passengers.passengerID
    LEFT JOIN aircrafts ON flights.aircraftID = aircrafts.aircraftID
    GROUP BY flights.year, flights.month, flights.flightNumber";

const GROUP_COUNT: &str = "
    SELECT COUNT(*) FROM (
        SELECT 1 FROM flights GROUP BY year, month, flightNumber
    )";

/// One row of the flight listing
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRow {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub flight_number: String,
    pub origin_iata: Option<String>,
    pub origin_name: Option<String>,
    pub origin_city: Option<String>,
    pub origin_country: Option<String>,
    pub destination_iata: Option<String>,
    pub dest_name: Option<String>,
    pub dest_city: Option<String>,
    pub dest_country: Option<String>,
    pub airline: Option<String>,
    pub aircraft_id: Option<String>,
    pub aircraft_name: Option<String>,
    pub passenger_count: i64,
    pub average_age: Option<f64>,
    pub distance_km: Option<f64>,
}

impl FlightRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            year: row.get("year")?,
            month: row.get("month")?,
            flight_number: row.get("flightNumber")?,
            origin_iata: row.get("originIATA")?,
            origin_name: row.get("originName")?,
            origin_city: row.get("originCity")?,
            origin_country: row.get("originCountry")?,
            destination_iata: row.get("destinationIATA")?,
            dest_name: row.get("destName")?,
            dest_city: row.get("destCity")?,
            dest_country: row.get("destCountry")?,
            airline: row.get("airline")?,
            aircraft_id: row.get("aircraftID")?,
            aircraft_name: row.get("aircraftName")?,
            passenger_count: row.get("passengerCount")?,
            average_age: row.get("averageAge")?,
            distance_km: row.get("distance")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPage {
    pub rows: Vec<FlightRow>,
    /// The page actually served, after clamping
    pub page: u64,
    pub total_pages: u64,
    pub total_rows: u64,
}

/// Read-only access to a finished database
pub struct FlightView {
    conn: Connection,
    state: RebuildState,
}

impl FlightView {
    /// Open `db_path` read-only. Refused while a rebuild of the file runs,
    /// in this process or another.
    pub fn open(db_path: &Path) -> Result<Self, QueryError> {
        let state = RebuildState::for_database(db_path);
        if state.is_rebuilding() {
            return Err(QueryError::RebuildInProgress);
        }
        if !db_path.exists() {
            return Err(QueryError::Missing(db_path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        register_functions(&conn)?;
        debug!(path = ?db_path, "opened flight view");

        Ok(Self { conn, state })
    }

    /// Number of distinct (year, month, flightNumber) groups
    pub fn total_rows(&self) -> Result<u64, QueryError> {
        let count: i64 = self.conn.query_row(GROUP_COUNT, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Fetch one page; ages are computed relative to `today`
    pub fn page(&self, request: &PageRequest, today: NaiveDate) -> Result<FlightPage, QueryError> {
        if self.state.is_rebuilding() {
            return Err(QueryError::RebuildInProgress);
        }

        let total_rows = self.total_rows()?;
        let pagination = Pagination::new(total_rows);
        let page = pagination.clamp(request.page);

        let sql = format!(
            "{} ORDER BY {} {}, year, month, flightNumber LIMIT :limit OFFSET :offset",
            FLIGHTS_SELECT,
            request.sort.alias(),
            request.direction.sql()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":today": today.format("%Y-%m-%d").to_string(),
                    ":limit": pagination.page_size as i64,
                    ":offset": pagination.offset(page) as i64,
                },
                FlightRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            page,
            total_pages = pagination.total_pages(),
            sort = %request.sort,
            rows = rows.len(),
            "served flight page"
        );

        Ok(FlightPage {
            rows,
            page,
            total_pages: pagination.total_pages(),
            total_rows,
        })
    }
}

/// Expose the derived-column functions to SQL. Any NULL or unparseable
/// argument yields NULL, which aggregates then ignore.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("great_circle_km", 4, flags, |ctx| {
        let args = (
            ctx.get::<Option<f64>>(0)?,
            ctx.get::<Option<f64>>(1)?,
            ctx.get::<Option<f64>>(2)?,
            ctx.get::<Option<f64>>(3)?,
        );
        Ok(match args {
            (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => Some(great_circle_km(
                Coordinates::new(lat1, lon1),
                Coordinates::new(lat2, lon2),
            )),
            _ => None,
        })
    })?;

    conn.create_scalar_function("age_years", 2, flags, |ctx| {
        let birth = ctx.get::<Option<String>>(0)?;
        let today = ctx.get::<Option<String>>(1)?;
        Ok(
            match (
                birth.as_deref().and_then(parse_iso_date),
                today.as_deref().and_then(parse_iso_date),
            ) {
                (Some(birth), Some(today)) => Some(age_years(birth, today) as i64),
                _ => None,
            },
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortColumn, SortDirection};
    use crate::writer::SqliteWriter;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn build(dir: &TempDir, sql: &str) -> std::path::PathBuf {
        let path = dir.path().join("view.sqlite");
        let writer = SqliteWriter::open(&path).unwrap();
        writer.create_tables().unwrap();
        writer.finalize().unwrap();
        let conn = Connection::open(&path).unwrap();
        // Bundled SQLite enforces foreign keys by default; match the writer.
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        conn.execute_batch(sql).unwrap();
        path
    }

    const FIXTURE: &str = "
        INSERT INTO airports VALUES ('SCL', 'Arturo Merino Benitez', 'Santiago', 'Chile', -33.393, -70.7858);
        INSERT INTO airports VALUES ('LIM', 'Jorge Chavez', 'Lima', 'Peru', -12.0219, -77.1143);
        INSERT INTO aircrafts VALUES ('CC-BAA', 'Boeing 787', 'Wide body');
        INSERT INTO passengers VALUES (10, 'Ana', 'Rojas', '1990-03-05', 'F', 160, 55, NULL);
        INSERT INTO passengers VALUES (11, 'Luis', 'Soto', '2000-07-01', 'M', 180, 80, NULL);
        INSERT INTO passengers VALUES (12, 'Eva', 'Diaz', NULL, 'F', 170, 60, NULL);
        INSERT INTO flights VALUES (2023, 7, 'LA100', 'SCL', 'LIM', 'LATAM', 'CC-BAA');
        INSERT INTO flights VALUES (2023, 7, 'LA200', 'SCL', 'XXX', 'LATAM', 'NOPE');
        INSERT INTO tickets VALUES (1, 10, 'LA100', 'Economy', '1A');
        INSERT INTO tickets VALUES (2, 11, 'LA100', 'Economy', '1B');
        INSERT INTO tickets VALUES (3, 12, 'LA100', 'Economy', '1C');
    ";

    #[test]
    fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let err = FlightView::open(&dir.path().join("none.sqlite"));
        assert!(matches!(err, Err(QueryError::Missing(_))));
    }

    #[test]
    fn test_refused_during_rebuild() {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, "");
        let view = FlightView::open(&path).unwrap();
        let _guard = RebuildState::for_database(&path).begin().unwrap();

        assert!(matches!(FlightView::open(&path), Err(QueryError::RebuildInProgress)));
        assert!(matches!(
            view.page(&PageRequest::default(), today()),
            Err(QueryError::RebuildInProgress)
        ));
    }

    #[test]
    fn test_aggregates() {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, FIXTURE);
        let view = FlightView::open(&path).unwrap();

        let page = view
            .page(&PageRequest::new(1, SortColumn::FlightNumber, SortDirection::Asc), today())
            .unwrap();

        assert_eq!(page.total_rows, 2);
        assert_eq!(page.total_pages, 1);
        let la100 = &page.rows[0];
        assert_eq!(la100.flight_number, "LA100");
        assert_eq!(la100.passenger_count, 3);
        assert_eq!(la100.origin_city.as_deref(), Some("Santiago"));
        assert_eq!(la100.dest_country.as_deref(), Some("Peru"));
        assert_eq!(la100.aircraft_name.as_deref(), Some("Boeing 787"));
        // ages 34 and 23, the NULL birthdate is ignored
        assert_eq!(la100.average_age, Some(28.5));
        let distance = la100.distance_km.unwrap();
        assert!((distance - 2462.0).abs() < 5.0, "{}", distance);
    }

    #[test]
    fn test_orphans_surface_as_null() {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, FIXTURE);
        let view = FlightView::open(&path).unwrap();

        let page = view
            .page(&PageRequest::new(1, SortColumn::FlightNumber, SortDirection::Desc), today())
            .unwrap();
        let la200 = &page.rows[0];
        assert_eq!(la200.flight_number, "LA200");

        assert_eq!(la200.origin_name.as_deref(), Some("Arturo Merino Benitez"));
        assert_eq!(la200.dest_name, None);
        assert_eq!(la200.aircraft_name, None);
        assert_eq!(la200.distance_km, None);
        assert_eq!(la200.passenger_count, 0);
        assert_eq!(la200.average_age, None);
    }

    #[test]
    fn test_sorting_and_clamping() {
        let dir = TempDir::new().unwrap();
        let mut sql = String::from(FIXTURE);
        for i in 0..20 {
            sql.push_str(&format!(
                "INSERT INTO flights VALUES (2024, 1, 'XX{:03}', 'SCL', 'LIM', 'Other', NULL);\n",
                i
            ));
        }
        let path = build(&dir, &sql);
        let view = FlightView::open(&path).unwrap();

        let last = view
            .page(&PageRequest::new(99, SortColumn::FlightNumber, SortDirection::Asc), today())
            .unwrap();
        assert_eq!(last.total_rows, 22);
        assert_eq!(last.total_pages, 2);
        assert_eq!(last.page, 2);
        assert_eq!(last.rows.len(), 7);

        let first = view
            .page(&PageRequest::new(0, SortColumn::PassengerCount, SortDirection::Desc), today())
            .unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.rows.len(), 15);
        assert_eq!(first.rows[0].flight_number, "LA100");
    }

    #[test]
    fn test_empty_database_has_one_page() {
        let dir = TempDir::new().unwrap();
        let path = build(&dir, "");
        let view = FlightView::open(&path).unwrap();

        let page = view.page(&PageRequest::new(3, SortColumn::Distance, SortDirection::Asc), today()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.rows.is_empty());
    }
}

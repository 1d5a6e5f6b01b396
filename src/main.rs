use anyhow::{Context, Result};
use flight_ingest::{
    classify::SourceKind,
    cli::{page_request, Cli, Commands},
    config::{default_database_path, RetryPolicy},
    logging,
    query::{FlightPage, FlightRow, FlightView, Pagination},
    rebuild::Rebuilder,
    schema::ALL_TABLES,
    source::{open_source, ObjectSource},
    ui::{SilentUi, UiApp},
};
use std::path::PathBuf;

fn resolve_db(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => default_database_path(),
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn format_row(row: &FlightRow) -> String {
    let period = match (row.year, row.month) {
        (Some(y), Some(m)) => format!("{}-{:02}", y, m),
        _ => "-".to_string(),
    };
    format!(
        "{:<8} {:<8} {:<4} {:<24} {:<4} {:<24} {:<12} {:<18} {:>5} {:>7} {:>9}",
        period,
        row.flight_number,
        text(&row.origin_iata),
        format!("{}, {}", text(&row.origin_city), text(&row.origin_country)),
        text(&row.destination_iata),
        format!("{}, {}", text(&row.dest_city), text(&row.dest_country)),
        text(&row.airline),
        text(&row.aircraft_name),
        row.passenger_count,
        number(row.average_age, 1),
        number(row.distance_km, 0),
    )
}

fn print_page(page: &FlightPage) {
    println!(
        "{:<8} {:<8} {:<4} {:<24} {:<4} {:<24} {:<12} {:<18} {:>5} {:>7} {:>9}",
        "Period", "Flight", "From", "", "To", "", "Airline", "Aircraft", "Pax", "Avg age", "Km"
    );
    for row in &page.rows {
        println!("{}", format_row(row));
    }

    let pages = Pagination::new(page.total_rows);
    let shown = pages.rows_on(page.page);
    if shown == 0 {
        println!("\nNo flights");
    } else {
        let first = pages.offset(page.page) + 1;
        println!(
            "\nRows {}-{} of {}, page {} of {}",
            first,
            first + shown - 1,
            page.total_rows,
            page.page,
            page.total_pages
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.log_options());

    match cli.command {
        Commands::Refresh { source, db, tui } => {
            let db = resolve_db(db)?;
            let source = open_source(&source.to_config(), RetryPolicy::default())?;
            let rebuilder = Rebuilder::new(db);

            let report = if tui {
                let mut ui = UiApp::new()?;
                match rebuilder.rebuild(&source, &mut ui) {
                    Ok(report) => {
                        ui.close(Some(&report.summary()))?;
                        report
                    }
                    Err(err) => {
                        ui.close(None)?;
                        return Err(err).context("Rebuild failed");
                    }
                }
            } else {
                rebuilder
                    .rebuild(&source, &mut SilentUi::new())
                    .context("Rebuild failed")?
            };

            println!("{}", report);
            println!("\nDatabase written to {:?}", rebuilder.db_path());
        }

        Commands::Objects { source } => {
            let source = open_source(&source.to_config(), RetryPolicy::default())?;
            let objects = source.list_objects().context("Failed to list objects")?;

            println!("Objects in {}:\n", source.describe());
            let mut recognized = 0;
            for object in &objects {
                let kind = SourceKind::classify(&object.name);
                if kind.is_recognized() {
                    recognized += 1;
                }
                let size = object.size.map_or_else(|| "?".to_string(), |s| s.to_string());
                println!("  {:<50} {:>10}  {}", object.name, size, kind);
            }
            println!("\n{} objects, {} recognized", objects.len(), recognized);
        }

        Commands::Tables => {
            println!("Tables:\n");
            for table in ALL_TABLES {
                println!("  {:<12} from {}", table.name, table.source_pattern);
                println!("  {:<12} {}", "", table.column_names().join(", "));
            }
        }

        Commands::Flights {
            db,
            page,
            sort,
            desc,
        } => {
            let db = resolve_db(db)?;
            let view = FlightView::open(&db)
                .with_context(|| format!("Cannot open {:?}", db))?;
            let today = chrono::Local::now().date_naive();
            let page = view.page(&page_request(page, sort, desc), today)?;
            print_page(&page);
        }
    }

    Ok(())
}

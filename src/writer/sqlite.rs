use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::error::{LoadError, RebuildError};
use crate::parser::Record;
use crate::schema::{TableSchema, ALL_TABLES};

/// The single write handle for a database file.
///
/// SQLite allows one writer at a time, so every insert of a run goes through
/// the one connection owned here.
pub struct SqliteWriter {
    conn: Connection,
    path: PathBuf,
}

impl SqliteWriter {
    pub fn open(db_path: &Path) -> Result<Self, RebuildError> {
        let open_err = |source| RebuildError::OpenDatabase {
            path: db_path.to_path_buf(),
            source,
        };

        let conn = Connection::open(db_path).map_err(open_err)?;

        // Foreign keys stay unenforced so orphaned references still load.
        // Rollback journal keeps the finished file self-contained.
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             PRAGMA journal_mode = DELETE;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )
        .map_err(open_err)?;

        Ok(Self {
            conn,
            path: db_path.to_path_buf(),
        })
    }

    /// Ensure every table exists. Safe to call on a populated database.
    pub fn create_tables(&self) -> Result<(), RebuildError> {
        self.create(ALL_TABLES)
    }

    fn create(&self, schemas: &[&TableSchema]) -> Result<(), RebuildError> {
        info!(count = schemas.len(), "creating tables");

        for schema in schemas {
            let schema_err = |source| RebuildError::Schema {
                table: schema.name,
                source,
            };

            self.conn
                .execute(&generate_create_table(schema), [])
                .map_err(schema_err)?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, []).map_err(schema_err)?;
            }
        }

        Ok(())
    }

    /// Insert one record in its own implicit transaction
    pub fn insert(&self, record: &Record) -> Result<(), LoadError> {
        let schema = record.table();
        let load_err = |source| LoadError {
            table: schema.name,
            key: record.key(),
            source,
        };

        let mut stmt = self
            .conn
            .prepare_cached(&generate_insert(schema))
            .map_err(load_err)?;

        for (idx, value) in record.values().iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt).map_err(load_err)?;
        }
        stmt.raw_execute().map_err(load_err)?;

        debug!(table = schema.name, key = %record.key(), "inserted");
        Ok(())
    }

    /// Row count of a table
    pub fn count(&self, table: &str) -> rusqlite::Result<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<(), RebuildError> {
        info!(path = ?self.path, "finalizing database");
        self.conn
            .execute_batch("PRAGMA optimize;")
            .map_err(RebuildError::Finalize)?;
        self.conn
            .close()
            .map_err(|(_, source)| RebuildError::Finalize(source))
    }
}

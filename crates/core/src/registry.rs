//! The table registry: two independent name→resource maps and the
//! operations that move data between files, databases, and named tables.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::DataFrame;
use rusqlite::Connection;
use tracing::debug;

use crate::dsl::{Aggregation, FilterExpr};
use crate::engine::join::JoinKind;
use crate::engine::{aggregate, combine, filter, join};
use crate::error::{RegistryError, Result};
use crate::io::{database, file, FileFormat, SheetSelector};

/// Named in-memory tables plus named database connections.
///
/// Each operation validates that the names it references exist, performs
/// one delegated transformation, and stores exactly one result. On error
/// the registry is left unchanged. Names are unique per map; a table and a
/// connection may share a name.
#[derive(Default)]
pub struct TableRegistry {
    connections: HashMap<String, Connection>,
    tables: HashMap<String, DataFrame>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_table(&self, name: &str) -> Result<&DataFrame> {
        self.tables
            .get(name)
            .ok_or_else(|| RegistryError::TableNotFound(name.to_string()))
    }

    /// The table stored under `name`.
    pub fn table(&self, name: &str) -> Result<&DataFrame> {
        self.lookup_table(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn contains_connection(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered connection names, sorted.
    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Open a database connection from `descriptor` and store it under
    /// `name`, replacing any previous connection of that name.
    pub fn register_connection(
        &mut self,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Result<()> {
        let name = name.into();
        let connection = database::open_connection(descriptor)?;
        debug!(connection = %name, "registered database connection");
        self.connections.insert(name, connection);
        Ok(())
    }

    /// Load a CSV file into a table under `name` (overwrites).
    pub fn load_csv(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let frame = file::read_csv(path.as_ref())?;
        self.store(name.into(), frame);
        Ok(())
    }

    /// Load one worksheet of an Excel workbook into a table under `name`.
    pub fn load_excel(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
        sheet: SheetSelector,
    ) -> Result<()> {
        let frame = file::read_excel(path.as_ref(), &sheet)?;
        self.store(name.into(), frame);
        Ok(())
    }

    /// Load a record-oriented JSON file into a table under `name`.
    pub fn load_json(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let frame = file::read_json(path.as_ref())?;
        self.store(name.into(), frame);
        Ok(())
    }

    /// Execute `sql` against the named connection and store the result set
    /// as a table under `result`.
    pub fn query_database(
        &mut self,
        connection: &str,
        sql: &str,
        result: impl Into<String>,
    ) -> Result<()> {
        let handle = self
            .connections
            .get(connection)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection.to_string()))?;
        let frame = database::query_to_frame(handle, sql)?;
        self.store(result.into(), frame);
        Ok(())
    }

    /// Replace the named table with only the rows matching `predicate`.
    pub fn filter_table(&mut self, name: &str, predicate: &FilterExpr) -> Result<()> {
        let frame = self.lookup_table(name)?;
        let filtered = filter::apply_filter(frame, predicate)?;
        self.store(name.to_string(), filtered);
        Ok(())
    }

    /// Join two named tables on `on` and store the result under `result`.
    pub fn join_tables(
        &mut self,
        left: &str,
        right: &str,
        on: &[&str],
        kind: JoinKind,
        result: impl Into<String>,
    ) -> Result<()> {
        let left_frame = self.lookup_table(left)?;
        let right_frame = self.lookup_table(right)?;
        let keys: Vec<String> = on.iter().map(|key| key.to_string()).collect();
        let joined = join::apply_join(left_frame, right_frame, &keys, kind)?;
        self.store(result.into(), joined);
        Ok(())
    }

    /// Group the named table by `group_by` and apply each aggregation,
    /// storing one row per distinct group combination under `result`.
    pub fn aggregate_table(
        &mut self,
        name: &str,
        group_by: &[&str],
        aggregations: &[Aggregation],
        result: impl Into<String>,
    ) -> Result<()> {
        let frame = self.lookup_table(name)?;
        let groups: Vec<String> = group_by.iter().map(|column| column.to_string()).collect();
        let aggregated = aggregate::apply_aggregate(frame, &groups, aggregations)?;
        self.store(result.into(), aggregated);
        Ok(())
    }

    /// Concatenate the listed tables in order and store the result under
    /// `result`.
    ///
    /// Names without a table are skipped rather than failing; this is the
    /// one lookup that tolerates absent names. If none resolve the
    /// operation fails with `EmptyCombine`.
    pub fn combine_tables(&mut self, names: &[&str], result: impl Into<String>) -> Result<()> {
        let result = result.into();
        let frames: Vec<DataFrame> = names
            .iter()
            .filter_map(|name| self.tables.get(*name).cloned())
            .collect();

        if frames.is_empty() {
            return Err(RegistryError::EmptyCombine(result));
        }

        let combined = combine::combine_frames(&frames)?;
        self.store(result, combined);
        Ok(())
    }

    /// Serialize the named table to `path` in the given format.
    pub fn save_table(&self, name: &str, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let frame = self.lookup_table(name)?;
        let path = path.as_ref();
        debug!(table = %name, format = %format, path = %path.display(), "saving table");
        match format {
            FileFormat::Csv => file::write_csv(frame, path),
            FileFormat::Excel => file::write_excel(frame, path),
            FileFormat::Json => file::write_json(frame, path),
        }
    }

    /// Write the named table to `destination` in the named database,
    /// replacing any existing table of that identifier.
    pub fn save_table_to_database(
        &mut self,
        table: &str,
        connection: &str,
        destination: &str,
    ) -> Result<()> {
        if !self.tables.contains_key(table) {
            return Err(RegistryError::TableNotFound(table.to_string()));
        }
        let handle = self
            .connections
            .get_mut(connection)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection.to_string()))?;
        let frame = &self.tables[table];
        debug!(table = %table, connection = %connection, destination = %destination, "writing table to database");
        database::write_frame(handle, destination, frame)
    }

    fn store(&mut self, name: String, frame: DataFrame) {
        debug!(table = %name, rows = frame.height(), columns = frame.width(), "stored table");
        self.tables.insert(name, frame);
    }
}

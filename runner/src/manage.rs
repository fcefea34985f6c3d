use crate::{
    database::{query::TableName, Connection},
    CommandError,
};
use itertools::Itertools;
use std::{
    fmt,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tracing::info;
use tunedb_ingest::read_records;

/// A single printable cell of a result row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
}

pub type Row = Vec<Value>;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

pub fn create_table(connection: &Connection, table: &TableName) -> Result<(), CommandError> {
    Ok(connection.create_table(table)?)
}

pub fn delete_table(connection: &Connection, table: &TableName) -> Result<(), CommandError> {
    Ok(connection.delete_table(table)?)
}

pub fn get_tables(connection: &Connection) -> Result<Vec<Row>, CommandError> {
    Ok(connection
        .list_tables()?
        .into_iter()
        .map(|name| vec![Value::from(name)])
        .collect_vec())
}

/// Parse the whole file first, then insert it in one transaction. Nothing is stored if
/// either step fails.
pub fn load_file(
    connection: &mut Connection,
    table: &TableName,
    path: &Path,
) -> Result<usize, CommandError> {
    let file = File::open(path).map_err(|error| CommandError::Input(path.to_path_buf(), error))?;
    let records = read_records(BufReader::new(file))?;

    info!(path = ?path, "Parsed {} records", records.len());

    Ok(connection.insert_records(table, &records)?)
}

/// distinct DMs present for `samples`, ascending
pub fn get_dm_range(
    connection: &Connection,
    table: &TableName,
    samples: i64,
) -> Result<Vec<i64>, CommandError> {
    Ok(connection.dimension_range(table, samples)?)
}

/// one row per line, columns separated by a single space
pub fn format_results(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| format!("{}\n", row.iter().join(" ")))
        .collect()
}

pub fn print_results<W: Write>(output: &mut W, rows: &[Row]) -> std::io::Result<()> {
    output.write_all(format_results(rows).as_bytes())
}

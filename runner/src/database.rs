pub mod query;

#[cfg(feature = "duckdb")]
mod duckdb;
#[cfg(feature = "rusqlite")]
mod sqlite;


#[cfg(not(any(feature = "rusqlite", feature = "duckdb")))]
compile_error!("at least one of the `rusqlite` or `duckdb` features has to be enabled");

use crate::config::{DatabaseConfig, Engine};
use query::{Extreme, TableName};
use thiserror::Error;
use tracing::{debug, error};
use tunedb_ingest::{BenchmarkRecord, Parameter};

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[cfg(feature = "rusqlite")]
    #[error("SQLite error: {0}")]
    SQLite(rusqlite::Error),
    #[cfg(feature = "duckdb")]
    #[error("DuckDB error: {0}")]
    DuckDB(#[from] self::duckdb::DuckDBError),
    #[error("Database engine {0} is not supported by this build")]
    UnsupportedEngine(Engine),
}

/// Aggregate throughput of a single DMs/samples group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// population variance
    pub variance: f64,
}

impl Summary {
    pub fn stddev(&self) -> f64 {
        self.variance.max(0.0).sqrt()
    }
}

/// The tuning parameters and throughput of one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    pub threads_d0: i64,
    pub threads_d1: i64,
    pub items_d0: i64,
    pub items_d1: i64,
    pub gbs: f64,
}

/// A record selected by `tune`, with its timing statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunedConfiguration {
    pub threads_d0: i64,
    pub items_d0: i64,
    pub gbs: f64,
    pub time: f64,
    pub time_err: f64,
    pub cov: f64,
}

/// All supported database engines, selected through `database.engine`
#[derive(Debug)]
pub enum Connection {
    #[cfg(feature = "rusqlite")]
    SQLite(sqlite::SQLiteConnection),
    #[cfg(feature = "duckdb")]
    DuckDB(self::duckdb::DuckDBConnection),
}

macro_rules! dispatch {
    ($connection:expr, $adapter:ident => $call:expr) => {
        match $connection {
            #[cfg(feature = "rusqlite")]
            Connection::SQLite($adapter) => $call,
            #[cfg(feature = "duckdb")]
            Connection::DuckDB($adapter) => $call,
        }
    };
}

/// Open a connection, hand it to `session` and close it afterwards regardless of what the
/// session returned. A panicking session still releases the connection when it is dropped.
pub fn with_session<T>(
    config: &DatabaseConfig,
    session: impl FnOnce(&mut Connection) -> T,
) -> Result<T, ConnectionError> {
    let mut connection = Connection::open(config)?;
    let result = session(&mut connection);

    if let Err(error) = connection.close() {
        error!(error = ?error, "Failed to close database connection: {error}");

        return Err(error);
    }

    Ok(result)
}

impl Connection {
    pub fn open(config: &DatabaseConfig) -> Result<Self, ConnectionError> {
        debug!(engine = %config.engine, path = ?config.path, "Opening connection");

        match config.engine {
            #[cfg(feature = "rusqlite")]
            Engine::SQLite => Ok(Self::SQLite(sqlite::SQLiteConnection::open(&config.path)?)),
            #[cfg(feature = "duckdb")]
            Engine::DuckDB => Ok(Self::DuckDB(self::duckdb::DuckDBConnection::open(
                &config.path,
            )?)),
            #[allow(unreachable_patterns)]
            engine => Err(ConnectionError::UnsupportedEngine(engine)),
        }
    }

    #[cfg(test)]
    pub fn open_in_memory(engine: Engine) -> Result<Self, ConnectionError> {
        match engine {
            #[cfg(feature = "rusqlite")]
            Engine::SQLite => Ok(Self::SQLite(sqlite::SQLiteConnection::open_in_memory()?)),
            #[cfg(feature = "duckdb")]
            Engine::DuckDB => Ok(Self::DuckDB(
                self::duckdb::DuckDBConnection::open_in_memory()?,
            )),
            #[allow(unreachable_patterns)]
            engine => Err(ConnectionError::UnsupportedEngine(engine)),
        }
    }

    pub fn close(self) -> Result<(), ConnectionError> {
        dispatch!(self, adapter => adapter.close())
    }

    pub fn create_table(&self, table: &TableName) -> Result<(), ConnectionError> {
        dispatch!(self, adapter => adapter.create_table(table))
    }

    pub fn delete_table(&self, table: &TableName) -> Result<(), ConnectionError> {
        dispatch!(self, adapter => adapter.delete_table(table))
    }

    pub fn list_tables(&self) -> Result<Vec<String>, ConnectionError> {
        dispatch!(self, adapter => adapter.list_tables())
    }

    /// insert all records in a single transaction
    pub fn insert_records(
        &mut self,
        table: &TableName,
        records: &[BenchmarkRecord],
    ) -> Result<usize, ConnectionError> {
        dispatch!(self, adapter => adapter.insert_records(table, records))
    }

    pub fn dimension_range(
        &self,
        table: &TableName,
        samples: i64,
    ) -> Result<Vec<i64>, ConnectionError> {
        dispatch!(self, adapter => adapter.dimension_range(table, samples))
    }

    pub fn summary(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Option<Summary>, ConnectionError> {
        dispatch!(self, adapter => adapter.summary(table, dms, samples))
    }

    pub fn throughputs(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Vec<f64>, ConnectionError> {
        dispatch!(self, adapter => adapter.throughputs(table, dms, samples))
    }

    pub fn first_configuration(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Option<Configuration>, ConnectionError> {
        dispatch!(self, adapter => adapter.first_configuration(table, dms, samples))
    }

    pub fn distinct_values(
        &self,
        table: &TableName,
        parameter: Parameter,
        dms: i64,
        samples: i64,
    ) -> Result<Vec<i64>, ConnectionError> {
        dispatch!(self, adapter => adapter.distinct_values(table, parameter, dms, samples))
    }

    pub fn best_throughput(
        &self,
        table: &TableName,
        parameter: Parameter,
        value: i64,
        dms: i64,
        samples: i64,
    ) -> Result<Option<f64>, ConnectionError> {
        dispatch!(self, adapter => adapter.best_throughput(table, parameter, value, dms, samples))
    }

    pub fn extreme_configuration(
        &self,
        table: &TableName,
        extreme: Extreme,
        dms: i64,
        samples: i64,
    ) -> Result<Option<TunedConfiguration>, ConnectionError> {
        dispatch!(self, adapter => adapter.extreme_configuration(table, extreme, dms, samples))
    }
}

fn summary_from_row(
    row: (Option<f64>, Option<f64>, Option<f64>, Option<f64>),
) -> Option<Summary> {
    match row {
        // a constant group has no spread, whatever rounding did to the mean
        (Some(min), Some(max), Some(_), Some(_)) if min == max => Some(Summary {
            min,
            max,
            mean: min,
            variance: 0.0,
        }),
        (Some(min), Some(max), Some(mean), Some(variance)) => Some(Summary {
            min,
            max,
            mean: mean.max(min).min(max),
            variance,
        }),
        _ => None,
    }
}

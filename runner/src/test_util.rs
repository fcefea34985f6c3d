use crate::{
    config::Engine,
    database::{query::TableName, Connection},
};
use tunedb_ingest::BenchmarkRecord;

#[cfg(feature = "rusqlite")]
pub const ENGINE: Engine = Engine::SQLite;
#[cfg(not(feature = "rusqlite"))]
pub const ENGINE: Engine = Engine::DuckDB;

pub fn results() -> TableName {
    TableName::new("results").unwrap()
}

pub fn record(dms: i64, samples: i64, threads_d0: i64, items_d0: i64, gbs: f64) -> BenchmarkRecord {
    BenchmarkRecord {
        dms,
        samples,
        threads_d0,
        threads_d1: 1,
        items_d0,
        items_d1: 1,
        gbs,
        time: 0.5,
        time_err: 0.01,
        cov: 0.02,
    }
}

/// in-memory database with a populated `results` table
pub fn connection_with(records: &[BenchmarkRecord]) -> Connection {
    let mut connection = Connection::open_in_memory(ENGINE).unwrap();
    let table = results();

    connection.create_table(&table).unwrap();
    connection.insert_records(&table, records).unwrap();

    connection
}

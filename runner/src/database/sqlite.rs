use super::{
    query::{self, Extreme, TableName},
    summary_from_row, Configuration, ConnectionError, Summary, TunedConfiguration,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, error, info};
use tunedb_ingest::{BenchmarkRecord, Parameter};

#[derive(Debug)]
pub struct SQLiteConnection {
    connection: Connection,
}

impl From<rusqlite::Error> for ConnectionError {
    fn from(error: rusqlite::Error) -> Self {
        ConnectionError::SQLite(error)
    }
}

impl SQLiteConnection {
    pub fn open(path: &Path) -> Result<Self, ConnectionError> {
        let connection = Connection::open(path)?;

        info!(path = ?path, "Opened SQLite connection");

        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, ConnectionError> {
        Ok(Self {
            connection: Connection::open_in_memory()?,
        })
    }

    pub fn close(mut self) -> Result<(), ConnectionError> {
        let mut counter = 0;
        while let Err((connection, error)) = self.connection.close() {
            counter += 1;
            self.connection = connection;
            error!(error = ?error, "Failed to close SQLite connection: {error}, trying again {counter}/3");

            if counter == 3 {
                error!("Failed to close connection, giving up");

                return Err(ConnectionError::SQLite(error));
            }
        }

        info!("Closed SQLite connection");

        Ok(())
    }

    pub fn create_table(&self, table: &TableName) -> Result<(), ConnectionError> {
        match self.connection.execute(&query::create_table(table), []) {
            Ok(_) => {
                info!(table = %table, "Applied result table schema");

                Ok(())
            }
            Err(error) => {
                error!(error = ?error, table = %table, "Failed to apply result table schema: {error}");

                Err(error.into())
            }
        }
    }

    pub fn delete_table(&self, table: &TableName) -> Result<(), ConnectionError> {
        self.connection.execute(&query::drop_table(table), [])?;

        info!(table = %table, "Dropped table");

        Ok(())
    }

    pub fn list_tables(&self) -> Result<Vec<String>, ConnectionError> {
        self.connection
            .prepare_cached(
                "select name from sqlite_master
                 where type = 'table' and name not like 'sqlite_%'
                 order by name",
            )?
            .query_map([], |row| row.get(0))?
            .try_fold(Vec::new(), |mut init, result| {
                init.push(result?);

                Ok::<Vec<String>, ConnectionError>(init)
            })
    }

    pub fn insert_records(
        &mut self,
        table: &TableName,
        records: &[BenchmarkRecord],
    ) -> Result<usize, ConnectionError> {
        let mut counter = 0;

        // the transaction rolls back when dropped before the commit
        let tx = self.connection.transaction()?;
        {
            let mut statement = tx.prepare_cached(&query::insert_record(table))?;

            for record in records {
                statement.execute(params![
                    record.dms,
                    record.samples,
                    record.threads_d0,
                    record.threads_d1,
                    record.items_d0,
                    record.items_d1,
                    record.gbs,
                    record.time,
                    record.time_err,
                    record.cov
                ])?;

                counter += 1;
            }
        }
        tx.commit()?;

        info!(table = %table, "Stored {counter} entries");

        Ok(counter)
    }

    pub fn dimension_range(
        &self,
        table: &TableName,
        samples: i64,
    ) -> Result<Vec<i64>, ConnectionError> {
        let mut statement = self.connection.prepare(&query::dimension_range(table))?;
        let dms = statement
            .query_map(params![samples], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        debug!(table = %table, samples = samples, "Found {} DMs", dms.len());

        Ok(dms)
    }

    pub fn summary(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Option<Summary>, ConnectionError> {
        let row: (Option<f64>, Option<f64>, Option<f64>, Option<f64>) = self
            .connection
            .prepare_cached(&query::summary(table))?
            .query_row(params![dms, samples], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;

        Ok(summary_from_row(row))
    }

    pub fn throughputs(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Vec<f64>, ConnectionError> {
        let mut statement = self.connection.prepare_cached(&query::throughputs(table))?;
        let values = statement
            .query_map(params![dms, samples], |row| row.get(0))?
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(values)
    }

    pub fn first_configuration(
        &self,
        table: &TableName,
        dms: i64,
        samples: i64,
    ) -> Result<Option<Configuration>, ConnectionError> {
        let configuration = self
            .connection
            .prepare_cached(&query::first_configuration(table))?
            .query_row(params![dms, samples], |row| {
                Ok(Configuration {
                    threads_d0: row.get(0)?,
                    threads_d1: row.get(1)?,
                    items_d0: row.get(2)?,
                    items_d1: row.get(3)?,
                    gbs: row.get(4)?,
                })
            })
            .optional()?;

        Ok(configuration)
    }

    pub fn distinct_values(
        &self,
        table: &TableName,
        parameter: Parameter,
        dms: i64,
        samples: i64,
    ) -> Result<Vec<i64>, ConnectionError> {
        let mut statement = self
            .connection
            .prepare(&query::distinct_values(table, parameter))?;
        let values = statement
            .query_map(params![dms, samples], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(values)
    }

    pub fn best_throughput(
        &self,
        table: &TableName,
        parameter: Parameter,
        value: i64,
        dms: i64,
        samples: i64,
    ) -> Result<Option<f64>, ConnectionError> {
        let best = self
            .connection
            .prepare_cached(&query::best_throughput(table, parameter))?
            .query_row(params![value, dms, samples], |row| row.get(0))?;

        Ok(best)
    }

    pub fn extreme_configuration(
        &self,
        table: &TableName,
        extreme: Extreme,
        dms: i64,
        samples: i64,
    ) -> Result<Option<TunedConfiguration>, ConnectionError> {
        let configuration = self
            .connection
            .prepare_cached(&query::extreme_configuration(table, extreme))?
            .query_row(params![dms, samples, dms, samples], |row| {
                Ok(TunedConfiguration {
                    threads_d0: row.get(0)?,
                    items_d0: row.get(1)?,
                    gbs: row.get(2)?,
                    time: row.get(3)?,
                    time_err: row.get(4)?,
                    cov: row.get(5)?,
                })
            })
            .optional()?;

        Ok(configuration)
    }
}

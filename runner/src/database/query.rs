//! SQL text for every statement issued against a result table.
//!
//! Values are always bound as parameters. Only validated table names and the closed set of
//! column names from [`COLUMNS`] and [`Parameter`] are ever interpolated.

use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;
use tunedb_ingest::{Parameter, COLUMNS};

const MAX_TABLE_NAME: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("table name must not be empty")]
    Empty,
    #[error("table name is longer than 64 characters")]
    TooLong,
    #[error("table name '{0}' may only contain ASCII letters, digits and '_' and must not start with a digit")]
    InvalidCharacters(String),
}

/// A table name that is safe to splice into SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self, IdentifierError> {
        let mut chars = name.chars();

        match chars.next() {
            None => return Err(IdentifierError::Empty),
            Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
                return Err(IdentifierError::InvalidCharacters(name.to_owned()))
            }
            Some(_) => {}
        }

        if name.len() > MAX_TABLE_NAME {
            return Err(IdentifierError::TooLong);
        }

        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(IdentifierError::InvalidCharacters(name.to_owned()));
        }

        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// double quoted form for use inside statements
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl FromStr for TableName {
    type Err = IdentifierError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::new(name)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of the throughput range `tune` selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

impl Extreme {
    /// case insensitive, `None` for anything but min/max
    pub fn from_operator(operator: &str) -> Option<Self> {
        match operator.to_lowercase().as_str() {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    fn function(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

const GROUP_FILTER: &str = "\"DMs\" = ? and \"samples\" = ?";

pub fn create_table(table: &TableName) -> String {
    format!(
        "create table if not exists {} (
    \"DMs\" bigint not null,
    \"samples\" bigint not null,
    \"nrThreadsD0\" bigint not null,
    \"nrThreadsD1\" bigint not null,
    \"nrItemsD0\" bigint not null,
    \"nrItemsD1\" bigint not null,
    \"GBs\" double not null,
    \"time\" double not null,
    \"time_err\" double not null,
    \"cov\" double not null
)",
        table.quoted()
    )
}

pub fn drop_table(table: &TableName) -> String {
    format!("drop table if exists {}", table.quoted())
}

pub fn insert_record(table: &TableName) -> String {
    format!(
        "insert into {} ({}) values ({})",
        table.quoted(),
        COLUMNS.iter().map(|column| format!("\"{column}\"")).join(", "),
        COLUMNS.iter().map(|_| "?").join(", ")
    )
}

/// binds: samples
pub fn dimension_range(table: &TableName) -> String {
    format!(
        "select distinct \"DMs\" from {} where \"samples\" = ? order by \"DMs\"",
        table.quoted()
    )
}

/// binds: DMs, samples
///
/// returns min, max, mean and population variance of the throughput, computed in two passes
pub fn summary(table: &TableName) -> String {
    format!(
        "with grp as (select \"GBs\" as gbs from {} where {GROUP_FILTER}),
     grp_mean as (select avg(gbs) as m from grp)
select min(grp.gbs), max(grp.gbs), avg(grp.gbs), avg((grp.gbs - grp_mean.m) * (grp.gbs - grp_mean.m))
from grp cross join grp_mean",
        table.quoted()
    )
}

/// binds: DMs, samples
pub fn throughputs(table: &TableName) -> String {
    format!(
        "select \"GBs\" from {} where {GROUP_FILTER} order by rowid",
        table.quoted()
    )
}

/// binds: DMs, samples
pub fn first_configuration(table: &TableName) -> String {
    format!(
        "select \"nrThreadsD0\", \"nrThreadsD1\", \"nrItemsD0\", \"nrItemsD1\", \"GBs\"
from {} where {GROUP_FILTER} order by rowid limit 1",
        table.quoted()
    )
}

/// binds: DMs, samples
pub fn distinct_values(table: &TableName, parameter: Parameter) -> String {
    let column = parameter.column();

    format!(
        "select distinct \"{column}\" from {} where {GROUP_FILTER} order by \"{column}\"",
        table.quoted()
    )
}

/// binds: parameter value, DMs, samples
pub fn best_throughput(table: &TableName, parameter: Parameter) -> String {
    format!(
        "select max(\"GBs\") from {} where \"{}\" = ? and {GROUP_FILTER}",
        table.quoted(),
        parameter.column()
    )
}

/// binds: DMs, samples, DMs, samples
pub fn extreme_configuration(table: &TableName, extreme: Extreme) -> String {
    let table = table.quoted();

    format!(
        "select \"nrThreadsD0\", \"nrItemsD0\", \"GBs\", \"time\", \"time_err\", \"cov\"
from {table} where {GROUP_FILTER}
and \"GBs\" = (select {}(\"GBs\") from {table} where {GROUP_FILTER})
order by rowid limit 1",
        extreme.function()
    )
}

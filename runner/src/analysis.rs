//! Per-DM aggregation over a result table.
//!
//! Every function iterates the DMs found for `samples` in ascending order and issues one or
//! more aggregate queries per DM.

use crate::{
    database::{query::TableName, Connection},
    manage::{get_dm_range, Row, Value},
    CommandError,
};
use thiserror::Error;
use tracing::debug;
use tunedb_ingest::Parameter;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("throughput of DMs {dms} has a standard deviation of zero")]
    ZeroDeviation { dms: i64 },
    #[error("negative throughput {gbs} for DMs {dms} can't be binned")]
    NegativeThroughput { dms: i64, gbs: f64 },
    #[error("throughput {max} for DMs {dms} needs more than 1048576 histogram buckets")]
    TooManyBuckets { dms: i64, max: f64 },
}

/// upper bound on the buckets of a single histogram
pub const MAX_BUCKETS: usize = 1 << 20;

/// Best throughput reached by each value of a single parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCurve {
    pub dms: i64,
    pub points: Vec<(i64, f64)>,
}

/// `[DMs, min, max, mean, stddev, (max - mean) / stddev]` for each DM
pub fn statistics(
    connection: &Connection,
    table: &TableName,
    samples: i64,
) -> Result<Vec<Row>, CommandError> {
    let mut confs = Vec::new();

    for dms in get_dm_range(connection, table, samples)? {
        let Some(summary) = connection.summary(table, dms, samples)? else {
            continue;
        };
        let stddev = summary.stddev();

        if summary.min == summary.max || stddev == 0.0 {
            return Err(AnalysisError::ZeroDeviation { dms }.into());
        }

        confs.push(vec![
            Value::from(dms),
            Value::from(summary.min),
            Value::from(summary.max),
            Value::from(summary.mean),
            Value::from(stddev),
            Value::from((summary.max - summary.mean) / stddev),
        ]);
    }

    Ok(confs)
}

/// Throughput histogram with unit wide buckets per DM, bucket `i` counts `i <= GBs < i + 1`
pub fn histogram(
    connection: &Connection,
    table: &TableName,
    samples: i64,
) -> Result<Vec<Vec<u64>>, CommandError> {
    let mut hists = Vec::new();

    for dms in get_dm_range(connection, table, samples)? {
        let Some(summary) = connection.summary(table, dms, samples)? else {
            continue;
        };

        if summary.min < 0.0 {
            return Err(AnalysisError::NegativeThroughput {
                dms,
                gbs: summary.min,
            }
            .into());
        }

        let buckets = Some(summary.max.trunc())
            .filter(|max| max.is_finite() && *max < MAX_BUCKETS as f64)
            .and_then(|max| (max as usize).checked_add(1))
            .ok_or(AnalysisError::TooManyBuckets {
                dms,
                max: summary.max,
            })?;
        let mut hist = vec![0; buckets];

        for gbs in connection.throughputs(table, dms, samples)? {
            hist[gbs.trunc() as usize] += 1;
        }

        debug!(dms = dms, buckets = hist.len(), "Built histogram");
        hists.push(hist);
    }

    Ok(hists)
}

/// first stored `[nrThreadsD0, nrThreadsD1, nrItemsD0, nrItemsD1, GBs]` for each DM
pub fn optimization_space(
    connection: &Connection,
    table: &TableName,
    samples: i64,
) -> Result<Vec<Row>, CommandError> {
    let mut confs = Vec::new();

    for dms in get_dm_range(connection, table, samples)? {
        if let Some(conf) = connection.first_configuration(table, dms, samples)? {
            confs.push(vec![
                Value::from(conf.threads_d0),
                Value::from(conf.threads_d1),
                Value::from(conf.items_d0),
                Value::from(conf.items_d1),
                Value::from(conf.gbs),
            ]);
        }
    }

    Ok(confs)
}

pub fn single_parameter_space(
    connection: &Connection,
    table: &TableName,
    parameter: Parameter,
    samples: i64,
) -> Result<Vec<ParameterCurve>, CommandError> {
    let mut confs = Vec::new();

    for dms in get_dm_range(connection, table, samples)? {
        let mut points = Vec::new();

        for value in connection.distinct_values(table, parameter, dms, samples)? {
            let best = connection.best_throughput(table, parameter, value, dms, samples)?;

            if let Some(best) = best {
                points.push((value, best));
            }
        }

        confs.push(ParameterCurve { dms, points });
    }

    Ok(confs)
}

use crate::{
    database::{
        query::{Extreme, TableName},
        Connection,
    },
    manage::{get_dm_range, Row, Value},
    CommandError,
};
use tracing::warn;

/// Best (or worst, for `min`) configuration of every DM as
/// `[DMs, samples, nrThreadsD0, nrItemsD0, GBs, time, time_err, cov]`.
///
/// Any operator other than min/max yields no rows.
pub fn tune(
    connection: &Connection,
    table: &TableName,
    operator: &str,
    samples: i64,
) -> Result<Vec<Row>, CommandError> {
    let Some(extreme) = Extreme::from_operator(operator) else {
        warn!("Unsupported operator {operator}, expected min or max");

        return Ok(Vec::new());
    };

    let mut confs = Vec::new();

    for dms in get_dm_range(connection, table, samples)? {
        if let Some(best) = connection.extreme_configuration(table, extreme, dms, samples)? {
            confs.push(vec![
                Value::from(dms),
                Value::from(samples),
                Value::from(best.threads_d0),
                Value::from(best.items_d0),
                Value::from(best.gbs),
                Value::from(best.time),
                Value::from(best.time_err),
                Value::from(best.cov),
            ]);
        }
    }

    Ok(confs)
}

use serde::{Deserialize, Serialize};

/// Column names of a result table, in storage and input-file order.
pub const COLUMNS: [&str; 10] = [
    "DMs",
    "samples",
    "nrThreadsD0",
    "nrThreadsD1",
    "nrItemsD0",
    "nrItemsD1",
    "GBs",
    "time",
    "time_err",
    "cov",
];

/// One tuning trial: a kernel configuration measured for a given number of DMs and samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "DMs")]
    pub dms: i64,
    pub samples: i64,
    #[serde(rename = "nrThreadsD0")]
    pub threads_d0: i64,
    #[serde(rename = "nrThreadsD1")]
    pub threads_d1: i64,
    #[serde(rename = "nrItemsD0")]
    pub items_d0: i64,
    #[serde(rename = "nrItemsD1")]
    pub items_d1: i64,
    #[serde(rename = "GBs")]
    pub gbs: f64,
    pub time: f64,
    pub time_err: f64,
    pub cov: f64,
}

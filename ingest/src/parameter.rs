use crate::IngestError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Tuning knobs whose best performing value can be searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "nrThreadsD0")]
    ThreadsD0,
    #[serde(rename = "nrThreadsD1")]
    ThreadsD1,
    #[serde(rename = "nrItemsD0")]
    ItemsD0,
    #[serde(rename = "nrItemsD1")]
    ItemsD1,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::ThreadsD0,
        Parameter::ThreadsD1,
        Parameter::ItemsD0,
        Parameter::ItemsD1,
    ];

    /// name of the column holding this parameter
    pub fn column(&self) -> &'static str {
        match self {
            Self::ThreadsD0 => "nrThreadsD0",
            Self::ThreadsD1 => "nrThreadsD1",
            Self::ItemsD0 => "nrItemsD0",
            Self::ItemsD1 => "nrItemsD1",
        }
    }
}

impl FromStr for Parameter {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|parameter| parameter.column() == value)
            .ok_or_else(|| IngestError::UnknownParameter(value.to_owned()))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

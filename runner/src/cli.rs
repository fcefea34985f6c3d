use crate::database::query::TableName;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tunedb_ingest::Parameter;

pub const SUPPORTED_COMMANDS: &str = "Supported commands are: create, list, delete, load, tune, statistics, histogram, optimizationSpace, singleParameterOptimizationSpace";

/// Store and analyze auto-tuning results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file, defaults to ./tunedb.yaml if present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides `database.path` from the configuration
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Log more, may be repeated (info, debug, trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a result table, does nothing if it already exists
    Create { table: TableName },
    /// List all tables
    List,
    /// Drop a result table, does nothing if it doesn't exist
    Delete { table: TableName },
    /// Load a tuner output file into a table
    Load {
        table: TableName,
        input_file: PathBuf,
    },
    /// Print the best (max) or worst (min) configuration for every DM
    Tune {
        table: TableName,
        operator: String,
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        samples: i64,
    },
    /// Print min, max, mean, stddev and (max - mean) / stddev of the throughput for every DM
    Statistics {
        table: TableName,
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        samples: i64,
    },
    /// Print a throughput histogram for every DM
    Histogram {
        table: TableName,
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        samples: i64,
    },
    /// Print the first stored configuration for every DM
    #[command(name = "optimizationSpace")]
    OptimizationSpace {
        table: TableName,
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        samples: i64,
    },
    /// Print the best throughput for every value of a tuning parameter, for every DM
    #[command(name = "singleParameterOptimizationSpace")]
    SingleParameterOptimizationSpace {
        table: TableName,
        /// nrThreadsD0, nrThreadsD1, nrItemsD0 or nrItemsD1
        parameter: Parameter,
        #[arg(value_parser = clap::value_parser!(i64).range(0..))]
        samples: i64,
    },
}

impl Command {
    /// name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::List => "list",
            Self::Delete { .. } => "delete",
            Self::Load { .. } => "load",
            Self::Tune { .. } => "tune",
            Self::Statistics { .. } => "statistics",
            Self::Histogram { .. } => "histogram",
            Self::OptimizationSpace { .. } => "optimizationSpace",
            Self::SingleParameterOptimizationSpace { .. } => "singleParameterOptimizationSpace",
        }
    }
}

mod analysis;
mod cli;
mod config;
mod database;
mod export;
mod manage;

#[cfg(test)]
mod analysis_test;
#[cfg(test)]
mod manage_test;
#[cfg(test)]
mod test_util;

use analysis::{AnalysisError, ParameterCurve};
use clap::{error::ErrorKind, Parser};
use cli::{Cli, Command, SUPPORTED_COMMANDS};
use config::TunedbConfig;
use database::{Connection, ConnectionError};
use manage::{Row, Value};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};
use thiserror::Error;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;
use tunedb_ingest::IngestError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Database(#[from] ConnectionError),
    #[error("Failed to open {0}: {1}")]
    Input(PathBuf, #[source] io::Error),
    #[error("Failed to read input: {0}")]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return report_parse_error(error),
    };

    init_logging(cli.verbose);

    let config = match TunedbConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_database_path(cli.database),
        Err(error) => {
            eprintln!("Error: {error}");

            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = config.preflight_checks() {
        eprintln!("Error: {error}");

        return ExitCode::FAILURE;
    }

    let command = cli.command;
    let session = database::with_session(&config.database, |connection| {
        let mut stdout = io::stdout().lock();

        execute(command, connection, &mut stdout)
            .and_then(|()| stdout.flush().map_err(CommandError::from))
    });

    match session {
        Ok(Ok(())) => ExitCode::SUCCESS,
        // handler errors are reported, but don't change the exit status
        Ok(Err(error)) => {
            eprintln!("Error: {error}");

            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("Error: {error}");

            ExitCode::FAILURE
        }
    }
}

/// Usage errors exit with 1, unknown or missing commands list the supported ones and exit 0
fn report_parse_error(error: clap::Error) -> ExitCode {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();

            ExitCode::SUCCESS
        }
        ErrorKind::InvalidSubcommand => {
            println!("Unknown command.");
            println!("{SUPPORTED_COMMANDS}");

            ExitCode::SUCCESS
        }
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            println!("{SUPPORTED_COMMANDS}");

            ExitCode::SUCCESS
        }
        _ => {
            let _ = error.print();

            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run a single command against an open connection and print its results to `output`
pub fn execute<W: Write>(
    command: Command,
    connection: &mut Connection,
    output: &mut W,
) -> Result<(), CommandError> {
    debug!(command = command.name(), "Executing command");

    match command {
        Command::Create { table } => manage::create_table(connection, &table),
        Command::List => {
            let tables = manage::get_tables(connection)?;

            Ok(manage::print_results(output, &tables)?)
        }
        Command::Delete { table } => manage::delete_table(connection, &table),
        Command::Load { table, input_file } => {
            let counter = manage::load_file(connection, &table, &input_file)?;

            info!(table = %table, "Loaded {counter} records from {}", input_file.display());

            Ok(())
        }
        Command::Tune {
            table,
            operator,
            samples,
        } => {
            let confs = export::tune(connection, &table, &operator, samples)?;

            Ok(manage::print_results(output, &confs)?)
        }
        Command::Statistics { table, samples } => {
            let confs = analysis::statistics(connection, &table, samples)?;

            Ok(manage::print_results(output, &confs)?)
        }
        Command::Histogram { table, samples } => {
            let hists = analysis::histogram(connection, &table, samples)?;

            print_blocks(output, hists.iter().map(Vec::as_slice).map(histogram_rows))
        }
        Command::OptimizationSpace { table, samples } => {
            let confs = analysis::optimization_space(connection, &table, samples)?;

            Ok(manage::print_results(output, &confs)?)
        }
        Command::SingleParameterOptimizationSpace {
            table,
            parameter,
            samples,
        } => {
            let curves =
                analysis::single_parameter_space(connection, &table, parameter, samples)?;

            print_blocks(output, curves.iter().map(curve_rows))
        }
    }
}

/// one data set per DM, separated by two blank lines so gnuplot can index them
fn print_blocks<W: Write, I: Iterator<Item = Vec<Row>>>(
    output: &mut W,
    blocks: I,
) -> Result<(), CommandError> {
    for block in blocks {
        manage::print_results(output, &block)?;
        output.write_all(b"\n\n")?;
    }

    Ok(())
}

fn histogram_rows(hist: &[u64]) -> Vec<Row> {
    hist.iter()
        .enumerate()
        .map(|(bucket, count)| {
            vec![
                Value::Integer(bucket as i64),
                Value::Integer(*count as i64),
            ]
        })
        .collect()
}

fn curve_rows(curve: &ParameterCurve) -> Vec<Row> {
    trace!(dms = curve.dms, values = curve.points.len(), "Printing parameter curve");

    curve
        .points
        .iter()
        .map(|(value, best)| vec![Value::from(*value), Value::from(*best)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{connection_with, record};

    fn run(connection: &mut Connection, command: Command) -> String {
        let mut output = Vec::new();
        execute(command, connection, &mut output).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_camel_case_commands() {
        let cli = Cli::try_parse_from([
            "tunedb",
            "singleParameterOptimizationSpace",
            "results",
            "nrItemsD0",
            "1024",
        ])
        .unwrap();

        match cli.command {
            Command::SingleParameterOptimizationSpace {
                table,
                parameter,
                samples,
            } => {
                assert_eq!(table.as_str(), "results");
                assert_eq!(parameter, tunedb_ingest::Parameter::ItemsD0);
                assert_eq!(samples, 1024);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn argument_count_errors_are_usage_errors() {
        let error = Cli::try_parse_from(["tunedb", "tune", "results", "max"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);

        let error = Cli::try_parse_from(["tunedb", "list", "extra"]).unwrap_err();
        assert_ne!(error.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn unknown_commands_are_reported_as_such() {
        let error = Cli::try_parse_from(["tunedb", "export", "results"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn rejects_unsafe_table_names() {
        assert!(Cli::try_parse_from(["tunedb", "create", "results; drop table x"]).is_err());
    }

    #[test]
    fn histogram_blocks_are_separated() {
        let mut connection = connection_with(&[
            record(1, 5, 8, 1, 10.0),
            record(1, 5, 8, 2, 12.5),
            record(2, 5, 8, 1, 1.5),
        ]);

        let output = run(
            &mut connection,
            Command::Histogram {
                table: "results".parse().unwrap(),
                samples: 5,
            },
        );

        let blocks: Vec<&str> = output.split("\n\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].lines().count(), 13);
        assert!(blocks[0].starts_with("0 0\n"));
        assert!(blocks[0].ends_with("10 1\n11 0\n12 1"));
        assert_eq!(blocks[1], "0 0\n1 1");
        assert_eq!(blocks[2], "");
    }

    #[test]
    fn single_parameter_space_prints_pairs() {
        let mut connection = connection_with(&[
            record(1, 5, 16, 1, 11.0),
            record(1, 5, 8, 1, 10.0),
            record(1, 5, 8, 2, 12.5),
        ]);

        let output = run(
            &mut connection,
            Command::SingleParameterOptimizationSpace {
                table: "results".parse().unwrap(),
                parameter: tunedb_ingest::Parameter::ThreadsD0,
                samples: 5,
            },
        );

        assert_eq!(output, "8 12.5\n16 11\n\n\n");
    }

    #[test]
    fn list_prints_one_table_per_line() {
        let mut connection = connection_with(&[]);
        run(
            &mut connection,
            Command::Create {
                table: "archive".parse().unwrap(),
            },
        );

        assert_eq!(run(&mut connection, Command::List), "archive\nresults\n");
    }
}

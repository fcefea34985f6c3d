use crate::{BenchmarkRecord, IngestError, COLUMNS};
use itertools::Itertools;
use std::{
    io::{BufRead, Lines},
    str::FromStr,
};
use tracing::trace;

/// Iterator over the records of a tuner result file.
///
/// Fields are separated by whitespace and/or commas. Blank lines and lines starting
/// with `#` (the tuner's header) are skipped.
#[derive(Debug)]
pub struct RecordReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<BenchmarkRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line += 1;

            let line = match line {
                Ok(line) => line,
                Err(error) => return Some(Err(IngestError::Read(error))),
            };

            match parse_line(&line, self.line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => trace!(line = self.line, "Skipped line"),
                Err(error) => return Some(Err(error)),
            }
        }

        None
    }
}

/// read all records, stopping at the first malformed line
pub fn read_records<R: BufRead>(input: R) -> Result<Vec<BenchmarkRecord>, IngestError> {
    RecordReader::new(input).collect()
}

fn parse_line(line: &str, number: usize) -> Result<Option<BenchmarkRecord>, IngestError> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .collect_vec();

    if fields.len() != COLUMNS.len() {
        return Err(IngestError::FieldCount {
            line: number,
            expected: COLUMNS.len(),
            found: fields.len(),
        });
    }

    Ok(Some(BenchmarkRecord {
        dms: field(&fields, 0, number)?,
        samples: field(&fields, 1, number)?,
        threads_d0: field(&fields, 2, number)?,
        threads_d1: field(&fields, 3, number)?,
        items_d0: field(&fields, 4, number)?,
        items_d1: field(&fields, 5, number)?,
        gbs: real(&fields, 6, number)?,
        time: real(&fields, 7, number)?,
        time_err: real(&fields, 8, number)?,
        cov: real(&fields, 9, number)?,
    }))
}

fn field<T: FromStr>(fields: &[&str], index: usize, line: usize) -> Result<T, IngestError> {
    fields[index]
        .parse()
        .map_err(|_| IngestError::InvalidField {
            line,
            column: COLUMNS[index],
            value: fields[index].to_owned(),
        })
}

/// like [`field`], but `inf` and `NaN` are rejected as well
fn real(fields: &[&str], index: usize, line: usize) -> Result<f64, IngestError> {
    let value: f64 = field(fields, index, line)?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(IngestError::InvalidField {
            line,
            column: COLUMNS[index],
            value: fields[index].to_owned(),
        })
    }
}

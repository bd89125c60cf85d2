use crate::error::{Result, StitchError};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The logger's three channels, one entry per stitched row.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    pub time: Vec<NaiveDateTime>,
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
    pub voltage: Vec<f64>,
}

impl TimeSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            pressure: Vec::with_capacity(capacity),
            temperature: Vec::with_capacity(capacity),
            voltage: Vec::with_capacity(capacity),
        }
    }

    /// Reads a stitched file. Rows are `datetime,pressure,temperature,voltage[,...]`
    /// with no header; blank lines and `#` comments are skipped.
    pub fn from_csv<P: AsRef<Path>>(path: P, datetime_format: &str) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(StitchError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let series = Self::from_reader(BufReader::new(file), datetime_format)?;

        if series.is_empty() {
            return Err(StitchError::NoRows {
                path: path.to_path_buf(),
            });
        }

        Ok(series)
    }

    pub fn from_reader<R: BufRead>(reader: R, datetime_format: &str) -> Result<Self> {
        let mut series = Self::new(1024);

        for (index, line) in reader.split(b'\n').enumerate() {
            let line_number = index + 1;
            let bytes = line?;
            let line = std::str::from_utf8(&bytes).map_err(|e| StitchError::Parse {
                line: line_number,
                message: format!("not valid UTF-8: {}", e),
            })?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            series.push_row(line, line_number, datetime_format)?;
        }

        Ok(series)
    }

    fn push_row(&mut self, line: &str, line_number: usize, datetime_format: &str) -> Result<()> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(StitchError::Parse {
                line: line_number,
                message: format!("expected at least 4 columns, found {}", fields.len()),
            });
        }

        let time = NaiveDateTime::parse_from_str(fields[0], datetime_format).map_err(|e| {
            StitchError::Parse {
                line: line_number,
                message: format!(
                    "timestamp '{}' does not match '{}': {}",
                    fields[0], datetime_format, e
                ),
            }
        })?;

        let pressure = parse_value(fields[1], "pressure", line_number)?;
        let temperature = parse_value(fields[2], "temperature", line_number)?;
        let voltage = parse_value(fields[3], "voltage", line_number)?;

        self.time.push(time);
        self.pressure.push(pressure);
        self.temperature.push(temperature);
        self.voltage.push(voltage);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Earliest and latest timestamp. Fragments are not assumed to be in time order.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = *self.time.iter().min()?;
        let last = *self.time.iter().max()?;
        Some((first, last))
    }
}

fn parse_value(field: &str, column: &str, line_number: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| StitchError::Parse {
        line: line_number,
        message: format!("{} value '{}' is not a number", column, field),
    })
}

/// Min and max of the finite values, if any.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

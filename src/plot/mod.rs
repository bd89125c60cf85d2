pub mod chart;
pub mod time_series;

pub use chart::render_chart;
pub use time_series::TimeSeries;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

impl PlotSummary {
    pub fn new(input: PathBuf, output: PathBuf, series: &TimeSeries) -> Self {
        let range = series.time_range();
        Self {
            input,
            output,
            rows: series.len(),
            first_timestamp: range.map(|(first, _)| first),
            last_timestamp: range.map(|(_, last)| last),
        }
    }
}

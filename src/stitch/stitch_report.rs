use crate::stitch::{AppendedFragment, StitchProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchReport {
    pub output_file: PathBuf,
    pub extension: String,
    pub fragments: Vec<FragmentInfo>,
    pub total_bytes: u64,
    pub duration: Duration,
    pub stitched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentInfo {
    pub relative_path: PathBuf,
    pub bytes: u64,
}

impl From<&AppendedFragment> for FragmentInfo {
    fn from(fragment: &AppendedFragment) -> Self {
        Self {
            relative_path: fragment.relative_path.clone(),
            bytes: fragment.bytes,
        }
    }
}

impl StitchReport {
    pub fn from_progress(progress: &StitchProgress, extension: &str) -> Self {
        Self {
            output_file: progress.output_file.clone(),
            extension: extension.to_string(),
            fragments: progress.appended.iter().map(FragmentInfo::from).collect(),
            total_bytes: progress.bytes_appended,
            duration: progress.elapsed(),
            stitched_at: Utc::now(),
        }
    }
}

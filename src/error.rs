use crate::ui::format_bytes;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open output file {path}: {source}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed writing to output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read fragment {path}: {source}")]
    FragmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory traversal failed: {source}")]
    Traversal {
        #[source]
        source: walkdir::Error,
    },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input file not found: {path}")]
    MissingInput { path: PathBuf },

    #[error("Malformed row at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("No data rows found in {path}")]
    NoRows { path: PathBuf },

    #[error("Chart rendering failed: {message}")]
    Plot { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for StitchError {
    fn user_message(&self) -> String {
        match self {
            StitchError::OutputOpen { path, source } => {
                format!("Could not create {}: {}", path.display(), source)
            }
            StitchError::OutputWrite { path, source } => {
                format!("Writing {} failed: {}", path.display(), source)
            }
            StitchError::FragmentRead { path, source } => {
                format!("Could not read fragment {}: {}", path.display(), source)
            }
            StitchError::Traversal { source } => match source.path() {
                Some(path) => format!("Could not walk {}: {}", path.display(), source),
                None => format!("Directory walk failed: {}", source),
            },
            StitchError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            StitchError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            StitchError::MissingInput { path } => {
                format!("Input file not found: {}", path.display())
            }
            StitchError::Parse { line, message } => {
                format!("Line {} of the stitched file is malformed: {}", line, message)
            }
            StitchError::NoRows { path } => {
                let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                format!(
                    "{} contains no data rows ({})",
                    path.display(),
                    format_bytes(size)
                )
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            StitchError::OutputOpen { .. } => Some(
                "Ensure you have write permission in the working directory and that stitched.csv is not locked by another program.".to_string()
            ),
            StitchError::OutputWrite { .. } => Some(
                "Check free disk space. The partially written stitched.csv was left in place; rerun to overwrite it.".to_string()
            ),
            StitchError::FragmentRead { .. } => Some(
                "Check the fragment's permissions. The stitched file is incomplete; rerun once the fragment is readable.".to_string()
            ),
            StitchError::Traversal { .. } => Some(
                "Ensure every subdirectory is readable, or exclude it with `exclude_patterns` in the configuration file.".to_string()
            ),
            StitchError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate a sample with --generate-config.".to_string()
            ),
            StitchError::MissingInput { .. } => Some(
                "Run `csvstitch` in this directory first to produce stitched.csv.".to_string()
            ),
            StitchError::Parse { .. } => Some(
                "Each row must be `HH:MM:SS DD/MM/YYYY,pressure,temperature,voltage` with no header row. Adjust `datetime_format` in the [plot] section if your logger uses another layout.".to_string()
            ),
            StitchError::NoRows { .. } => Some(
                "Make sure the log fragments use the configured extension (default `.CSV`, case-sensitive) and live in subdirectories.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for StitchError {
    fn from(error: toml::de::Error) -> Self {
        StitchError::Config {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for StitchError {
    fn from(error: walkdir::Error) -> Self {
        StitchError::Traversal { source: error }
    }
}

pub type Result<T> = std::result::Result<T, StitchError>;

use crate::error::{Result, StitchError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the combined file written into the working directory.
pub const STITCHED_FILE_NAME: &str = "stitched.csv";

/// Name of the rendered chart written next to the stitched file.
pub const PLOT_FILE_NAME: &str = "stitched.svg";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub stitch: StitchConfig,
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Literal, case-sensitive file name suffix of a log fragment.
    pub extension: String,
    pub follow_links: bool,
    /// Regexes matched against a directory's path relative to the working directory.
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotConfig {
    pub title: String,
    pub datetime_format: String,
    pub time_axis_format: String,
    pub width: u32,
    pub height: u32,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            extension: ".CSV".to_string(),
            follow_links: false,
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: "Adalogger M0 + DS3231 + MPL3115A2".to_string(),
            datetime_format: "%H:%M:%S %d/%m/%Y".to_string(),
            time_axis_format: "%H:%M:%S".to_string(),
            width: 1200,
            height: 900,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(StitchError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| StitchError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| StitchError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    /// Loads `config_path` if given, otherwise the first default file found in `root`.
    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>, root: &Path) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["csvstitch.toml", ".csvstitch.toml"];

                for default_path in &default_paths {
                    let candidate = root.join(default_path);
                    if candidate.is_file() {
                        return Self::load_from_file(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extension) = cli_args.extension {
            self.stitch.extension = extension.clone();
        }

        if let Some(follow_links) = cli_args.follow_links {
            self.stitch.follow_links = follow_links;
        }

        if let Some(ref title) = cli_args.title {
            self.plot.title = title.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| StitchError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| StitchError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.stitch.extension.is_empty() {
            return Err(StitchError::Config {
                message: "The fragment extension must not be empty".to_string(),
            });
        }

        for pattern in &self.stitch.exclude_patterns {
            if let Err(e) = Regex::new(pattern) {
                return Err(StitchError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        if self.plot.datetime_format.trim().is_empty() {
            return Err(StitchError::Config {
                message: "The plot datetime format must not be empty".to_string(),
            });
        }

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(StitchError::Config {
                message: format!(
                    "Chart size must be non-zero, got {}x{}",
                    self.plot.width, self.plot.height
                ),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extension: Option<String>,
    pub follow_links: Option<bool>,
    pub title: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_follow_links(mut self, follow_links: Option<bool>) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

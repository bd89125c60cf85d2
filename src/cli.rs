use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "csvstitch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stitch data-logger CSV fragments into one file")]
#[command(
    long_about = "csvstitch walks the subdirectories of the working directory, appends every \
                  log fragment ending in .CSV to stitched.csv, and can chart the result."
)]
#[command(after_help = "EXAMPLES:\n  \
    csvstitch                      # stitch every subdirectory .CSV into ./stitched.csv\n  \
    csvstitch --dry-run            # list the fragments without writing\n  \
    csvstitch plot                 # render ./stitched.svg from ./stitched.csv\n  \
    csvstitch --generate-config    # write csvstitch.toml with the defaults")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Case-sensitive file name suffix of a fragment
    #[arg(long, global = true, help = "Fragment file name suffix (default: .CSV)")]
    pub extension: Option<String>,

    /// Follow symbolic links while walking
    #[arg(long, global = true)]
    pub follow_links: bool,

    /// List the fragments that would be stitched without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file and exit")]
    pub generate_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Concatenate every fragment into stitched.csv (the default)
    Stitch,
    /// Render stitched.csv as a three-panel chart (stitched.svg)
    Plot {
        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Stitch)
    }

    /// Rejects flag combinations clap cannot express across subcommands.
    pub fn check_conflicts(&self) -> std::result::Result<(), clap::Error> {
        if self.dry_run && matches!(self.command, Some(Command::Plot { .. })) {
            return Err(<Self as CommandFactory>::command().error(
                ErrorKind::ArgumentConflict,
                "--dry-run previews stitching and cannot be combined with `plot`",
            ));
        }

        Ok(())
    }

    pub fn load_config(&self, root: &Path) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref(), root)?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let title = match &self.command {
            Some(Command::Plot { title }) => title.clone(),
            _ => None,
        };

        CliOverrides::new()
            .with_extension(self.extension.clone())
            .with_follow_links(self.follow_links.then_some(true))
            .with_title(title)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

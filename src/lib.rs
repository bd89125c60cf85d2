pub mod cli;
pub mod config;
pub mod error;
pub mod plot;
pub mod scanner;
pub mod stitch;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, Command, OutputFormat};
pub use config::{CliOverrides, Config, PlotConfig, StitchConfig, PLOT_FILE_NAME, STITCHED_FILE_NAME};
pub use error::{Result, StitchError, UserFriendlyError};

// Core functionality re-exports
pub use plot::{render_chart, PlotSummary, TimeSeries};
pub use scanner::{Fragment, FragmentFilter, FragmentScanner, ScanStatistics};
pub use stitch::{FileStitcher, FragmentInfo, StitchProgress, StitchReport};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::Path;

/// Main library interface: stitching, dry-run previews and charting.
pub struct CsvStitch {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl CsvStitch {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Machine-readable modes never draw a spinner
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an instance from CLI arguments, loading configuration relative to `root`
    pub fn from_cli(cli_args: &Cli, root: &Path) -> Result<Self> {
        let config = cli_args.load_config(root)?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Concatenate every fragment below `root` into `root/stitched.csv`.
    ///
    /// Prints the banner first, then one `Appending <path>` line per fragment
    /// before its bytes are copied.
    pub fn stitch(&self, root: &Path) -> Result<StitchReport> {
        self.output_formatter
            .start_operation(&format!("Stitching files into {}", STITCHED_FILE_NAME));
        self.output_formatter.debug(&format!(
            "Fragment suffix: {} (follow links: {})",
            self.config.stitch.extension, self.config.stitch.follow_links
        ));

        let spinner = self.progress_manager.create_spinner("Stitching fragments");
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let on_append = |fragment: &Fragment, progress: &StitchProgress| {
            output.step(&format!("Appending {}", fragment.display_path()));
            ui::progress::update_stitch_progress(&spinner, progress);
        };

        let stitcher = FileStitcher::new(&self.config.stitch);
        let progress = match stitcher.stitch(root, Some(&on_append)) {
            Ok(progress) => progress,
            Err(e) => {
                spinner.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &spinner,
            &format!("Appended {} fragments", progress.fragments_appended()),
            progress.elapsed(),
        );
        self.progress_manager.clear();

        if progress.fragments_appended() == 0 {
            self.output_formatter.warning(&format!(
                "No files ending in {} were found below {}",
                self.config.stitch.extension,
                root.display()
            ));
        }

        self.output_formatter.print_stitch_summary(&progress);

        Ok(StitchReport::from_progress(
            &progress,
            &self.config.stitch.extension,
        ))
    }

    /// List the fragments `stitch` would append, without touching the output file
    pub fn preview(&self, root: &Path) -> Result<(Vec<Fragment>, ScanStatistics)> {
        let scanner = FragmentScanner::new(&self.config.stitch);
        let fragments = scanner.scan(root)?;
        let stats = scanner.get_statistics(&fragments);

        self.output_formatter.debug(&stats.display_summary());

        Ok((fragments, stats))
    }

    /// Chart `root/stitched.csv` into `root/stitched.svg`
    pub fn plot(&self, root: &Path) -> Result<PlotSummary> {
        let input = root.join(STITCHED_FILE_NAME);
        let output = root.join(PLOT_FILE_NAME);

        self.output_formatter
            .start_operation(&format!("Plotting {} into {}", STITCHED_FILE_NAME, PLOT_FILE_NAME));

        let spinner = self.progress_manager.create_spinner("Reading samples");
        let series = match TimeSeries::from_csv(&input, &self.config.plot.datetime_format) {
            Ok(series) => series,
            Err(e) => {
                spinner.abandon();
                return Err(e);
            }
        };

        spinner.set_message(format!("Rendering {} rows", series.len()));
        if let Err(e) = render_chart(&series, &self.config.plot, &output) {
            spinner.abandon();
            return Err(e);
        }

        spinner.finish_and_clear();
        self.progress_manager.clear();

        self.output_formatter
            .success(&format!("Wrote {}", output.display()));

        Ok(PlotSummary::new(input, output, &series))
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &StitchError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "csvstitch {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}

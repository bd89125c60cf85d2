use clap::Parser;
use csvstitch::{
    build_info, Cli, Command, CsvStitch, OutputFormatter, OutputMode, StitchError,
    UserFriendlyError,
};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    if let Err(e) = cli.check_conflicts() {
        e.exit();
    }

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            print_startup_error(&StitchError::Io(e));
            return 1;
        }
    };

    let csvstitch = match CsvStitch::from_cli(&cli, &root) {
        Ok(csvstitch) => csvstitch,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    csvstitch
        .output_formatter()
        .debug(&build_info().to_string());

    if cli.dry_run {
        return handle_dry_run(&csvstitch, &root);
    }

    let result = match cli.command() {
        Command::Stitch => csvstitch
            .stitch(&root)
            .map(|report| csvstitch.output_formatter().print_stitch_report(&report)),
        Command::Plot { .. } => csvstitch
            .plot(&root)
            .map(|summary| csvstitch.output_formatter().print_plot_summary(&summary)),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            csvstitch.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &StitchError) -> i32 {
    match error {
        StitchError::Config { .. } => 2,
        StitchError::OutputOpen { .. } => 3,
        StitchError::FragmentRead { .. } | StitchError::OutputWrite { .. } => 4,
        StitchError::Traversal { .. } => 5,
        StitchError::MissingInput { .. } | StitchError::Parse { .. } | StitchError::NoRows { .. } => 6,
        StitchError::Plot { .. } => 7,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("csvstitch.toml"));

    match CsvStitch::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nIt is picked up automatically when named csvstitch.toml, or pass:");
            println!("  csvstitch --config {}", config_path.display());
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(csvstitch: &CsvStitch, root: &Path) -> i32 {
    let formatter = csvstitch.output_formatter();

    formatter.info("DRY RUN MODE - stitched.csv will not be written");

    let config = csvstitch.config();
    formatter.info(&format!("Fragment suffix: {}", config.stitch.extension));
    formatter.info(&format!("Follow links: {}", config.stitch.follow_links));
    if !config.stitch.exclude_patterns.is_empty() {
        formatter.info(&format!(
            "Exclude patterns: {}",
            config.stitch.exclude_patterns.join(", ")
        ));
    }

    match csvstitch.preview(root) {
        Ok((fragments, stats)) => {
            formatter.print_fragment_preview(&fragments, &stats);
            0
        }
        Err(e) => {
            csvstitch.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &StitchError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

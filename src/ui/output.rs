use crate::error::{StitchError, UserFriendlyError};
use crate::plot::PlotSummary;
use crate::scanner::{Fragment, ScanStatistics};
use crate::stitch::{StitchProgress, StitchReport};
use crate::ui::{format_bytes, format_duration};
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// One line per unit of work, e.g. each appended fragment.
    pub fn step(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).cyan());
                    } else {
                        println!("  {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("step", message),
                OutputMode::Plain => println!("STEP: {}", message),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &StitchError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_stitch_summary(&self, progress: &StitchProgress) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(progress),
            OutputMode::Json => self.print_json_summary(progress),
            OutputMode::Plain => self.print_plain_summary(progress),
        }
    }

    pub fn print_stitch_report(&self, report: &StitchReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => self.print_tagged_json("report", report),
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_fragment_preview(&self, fragments: &[Fragment], stats: &ScanStatistics) {
        match self.mode {
            OutputMode::Json => {
                let paths: Vec<String> = fragments.iter().map(Fragment::display_path).collect();
                self.print_json_object(&serde_json::json!({
                    "type": "dry_run",
                    "fragments": paths,
                    "total_fragments": stats.total_fragments,
                    "total_size": stats.total_size
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                for fragment in fragments {
                    println!("  Would append {}", fragment.display_path());
                }
                println!(
                    "{} fragments, {} in total",
                    stats.total_fragments,
                    format_bytes(stats.total_size)
                );
            }
        }
    }

    pub fn print_plot_summary(&self, summary: &PlotSummary) {
        match self.mode {
            OutputMode::Json => self.print_tagged_json("plot", summary),
            OutputMode::Human | OutputMode::Plain => {
                if self.quiet {
                    return;
                }
                println!("Rows plotted: {}", summary.rows);
                if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp)
                {
                    println!("Time span:    {} .. {}", first, last);
                }
                println!("Chart:        {}", summary.output.display());
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (&Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (&CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (&CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (&WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (&INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_tagged_json<T: serde::Serialize>(&self, kind: &str, value: &T) {
        self.print_json_object(&tagged_json(kind, value));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, progress: &StitchProgress) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Stitching completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Stitching completed!");
        }

        println!();
        println!(
            "  Fragments:  {}",
            self.highlight(progress.fragments_appended().to_string())
        );
        println!(
            "  Bytes:      {}",
            self.highlight(format_bytes(progress.bytes_appended))
        );
        println!(
            "  Time taken: {}",
            self.highlight(format_duration(progress.elapsed()))
        );

        self.print_separator();
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_json_summary(&self, progress: &StitchProgress) {
        self.print_json_object(&serde_json::json!({
            "type": "summary",
            "fragments_appended": progress.fragments_appended(),
            "bytes_appended": progress.bytes_appended,
            "duration_ms": progress.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_plain_summary(&self, progress: &StitchProgress) {
        println!("COMPLETED: Stitching");
        println!("Fragments appended: {}", progress.fragments_appended());
        println!("Bytes appended: {}", progress.bytes_appended);
        println!("Duration: {:?}", progress.elapsed());
    }

    fn print_human_report(&self, report: &StitchReport) {
        if self.verbose_level == 0 || self.quiet {
            return;
        }

        self.print_header("Stitch Report");

        println!("Output: {}", report.output_file.display());
        println!("Extension: {}", report.extension);
        println!(
            "Stitched at: {}",
            report.stitched_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!();

        for fragment in &report.fragments {
            println!(
                "  {} ({})",
                fragment.relative_path.display(),
                format_bytes(fragment.bytes)
            );
        }
    }

    fn print_plain_report(&self, report: &StitchReport) {
        if self.quiet {
            return;
        }

        println!("REPORT: Stitching completed");
        println!("Output: {}", report.output_file.display());
        println!("Fragments: {}", report.fragments.len());
        println!("Size: {} bytes", report.total_bytes);
        println!("Duration: {:?}", report.duration);
    }
}

/// `value` as a JSON object with a `"type"` field added.
fn tagged_json<T: serde::Serialize>(kind: &str, value: &T) -> serde_json::Value {
    let mut obj = serde_json::to_value(value).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(map) = obj.as_object_mut() {
        map.insert("type".to_string(), serde_json::Value::from(kind));
    }
    obj
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

/// Routes formatter output around an active progress spinner.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn step(&self, message: &str) {
        self.suspend_and_print(|f| f.step(message));
    }
}

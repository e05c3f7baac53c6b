//! Output formatting module for nsx-install
//!
//! Provides colored operator output. Everything printed here is also in the
//! install log through `tracing`; this module only covers the terminal.

use colored::Colorize;
use nsx_install::playbook::{PlaybookStep, Progress, DONE_MESSAGE};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Output formatter for terminal output
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Verbosity level
    verbosity: u8,
    /// Start time for duration calculations
    start_time: Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        colored::control::set_override(use_color);

        Self {
            use_color,
            verbosity,
            start_time: Instant::now(),
        }
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print an install progress line (always shown)
    pub fn progress(&self, message: &str) {
        if self.use_color {
            println!("{}", message.bright_white().bold());
        } else {
            println!("{}", message);
        }
        self.flush();
    }

    /// Print a success line with the elapsed time
    pub fn success(&self, message: &str) {
        let elapsed = format_duration(self.start_time.elapsed());
        if self.use_color {
            println!("{} {}", message.green().bold(), format!("({elapsed})").bright_black());
        } else {
            println!("{} ({})", message, elapsed);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print a hint message
    pub fn hint(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "HINT:".cyan().bold(), message);
        } else {
            eprintln!("HINT: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print plan output (always shows, bypasses verbosity)
    pub fn plan(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a debug message (requires higher verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 {
            return;
        }

        if self.use_color {
            println!("{} {}", "DEBUG:".magenta(), message);
        } else {
            println!("DEBUG: {}", message);
        }
    }

    /// Print key/value rows aligned on the key column
    pub fn table(&self, rows: &[(String, String)]) {
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.use_color {
                println!("  {} = {}", format!("{key:width$}").bright_white(), value);
            } else {
                println!("  {key:width$} = {value}");
            }
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

impl Progress for OutputFormatter {
    fn message(&mut self, text: &str) {
        if text == DONE_MESSAGE {
            self.success(text);
        } else {
            self.progress(text);
        }
    }

    fn step(&mut self, step: &PlaybookStep) {
        self.info(&format!("Running {}", step.playbook));
    }
}

/// Format a duration as a human-readable string
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}h {}m {}s", hours, mins, secs)
    } else if secs >= 60 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

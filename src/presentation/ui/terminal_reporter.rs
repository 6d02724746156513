use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

use crate::application::services::reporter::Reporter;

/// Prints operator-facing output to stdout.
pub struct TerminalReporter {
    base: PathBuf,
}

impl TerminalReporter {
    /// Paths in section headers are shown relative to the current directory.
    pub fn new() -> Self {
        Self {
            base: env::current_dir().unwrap_or_default(),
        }
    }

    pub fn relative_to(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn format_path(&self, location: &Path) -> String {
        let shown = match pathdiff::diff_paths(location, &self.base) {
            Some(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
            Some(relative) => relative,
            None => location.to_path_buf(),
        };
        shown.display().to_string()
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn section(&self, location: &Path) {
        println!("{} {}", "::".blue().bold(), self.format_path(location).bold());
    }

    fn info(&self, message: &str) {
        println!("   {}", message);
    }

    fn warning(&self, message: &str) {
        let mut lines = message.lines();
        if let Some(first) = lines.next() {
            println!("{} {}", "⚠".yellow().bold(), first.yellow());
        }
        for line in lines {
            println!("   {}", line);
        }
    }
}

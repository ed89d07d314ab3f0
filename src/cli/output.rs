// src/cli/output.rs
use std::path::Path;

use crate::cli::colors::{ansi, ColorSupport};

/// User-facing status lines on stderr
pub struct OutputFormatter {
    color_support: ColorSupport,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self { color_support: ColorSupport::detect() }
    }

    pub fn colored(&self) -> bool {
        self.color_support.is_enabled()
    }

    /// `instance -> file (size)`
    pub fn success(&self, instance: &str, output: &Path, bytes: u64) {
        let output_rel = output.file_name().unwrap_or(output.as_os_str()).to_string_lossy();
        let line = format!("{instance} -> {output_rel}  ({})", Self::human_size(bytes));
        self.paint(ansi::GREEN, &line);
    }

    pub fn error(&self, message: &str) {
        self.paint(ansi::RED, message);
    }

    fn paint(&self, color: &str, message: &str) {
        if self.colored() {
            eprintln!("{color}{message}{}", ansi::RESET);
        } else {
            eprintln!("{message}");
        }
    }

    pub fn human_size(bytes: u64) -> String {
        if bytes >= 1_048_576 {
            format!("{:.1} MB", bytes as f64 / 1_048_576.0)
        } else if bytes >= 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{} B", bytes)
        }
    }
}

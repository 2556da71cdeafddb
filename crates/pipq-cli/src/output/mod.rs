//! Terminal output formatting and utilities.
//!
//! This module provides consistent output formatting across all commands,
//! including colors, labelled fields and warning blocks.

pub mod colors;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        println!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// Print a bold heading
    pub fn heading(&self, message: &str) {
        println!("{}", self.colors.bold(message));
    }

    /// Print a labelled field of an info card
    pub fn field(&self, label: &str, value: &str) {
        println!("  {}: {}", self.colors.cyan(label), value);
    }

    /// Print a highlighted warning block header
    pub fn warning_block(&self, title: &str, body: &str) {
        println!();
        println!("{}", self.colors.bold(&self.colors.red(title)));
        println!("{}", body);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

//! Styled terminal output utilities.
//!
//! Results go to stdout; progress notices and errors go to stderr so they
//! never mix with output meant for pipes.

use owo_colors::OwoColorize;
use quay_postgres::Notify;

/// Print a header/title
pub fn header(text: &str) {
    eprintln!();
    eprintln!("{}", text.bold().cyan());
    eprintln!("{}", "─".repeat(text.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a progress notice
pub fn notice(text: &str) {
    eprintln!("{}", text.dimmed());
}

/// Print a newline
pub fn newline() {
    eprintln!();
}

/// Routes connection notices through the styled output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliNotifier;

impl Notify for CliNotifier {
    fn notice(&self, message: &str) {
        notice(message);
    }
}

//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Everything goes to stdout; stderr belongs to tracing diagnostics.

use colored::Colorize;

/// Print error (red bold "error:" prefix)
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix)
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

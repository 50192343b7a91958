//! CLI output formatting
//!
//! Colored, emoji-prefixed status lines on stdout. Emojis fall back to
//! nothing on terminals without emoji support.

use console::{Emoji, style};

use crate::diagnostics::{Problem, Severity};

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Package - for packaging operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Cross - for failures
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "x ");

/// Print a status line: `🔍 Message`
pub fn print_status(emoji: &Emoji<'_, '_>, msg: &str) {
    println!("{emoji}{msg}");
}

/// Print a success line: `✨ Message`
pub fn print_success(msg: &str) {
    println!("{SPARKLE}{}", style(msg).green());
}

/// Print a note that no change was written
pub fn print_dry_run(msg: &str) {
    println!("{} {msg}", style("[dry-run]").bold().dim());
}

/// Print one problem: `path:3:5: error[required]: message`
pub fn print_problem(path: &str, problem: &Problem) {
    let severity = match problem.severity {
        Severity::Error => style(problem.severity.to_string()).red().bold(),
        Severity::Warning => style(problem.severity.to_string()).yellow().bold(),
        _ => style(problem.severity.to_string()).cyan(),
    };
    let code = problem
        .code
        .as_deref()
        .map(|code| format!("[{code}]"))
        .unwrap_or_default();

    println!(
        "{}:{}:{}: {severity}{}: {}",
        style(path).bold(),
        problem.range.start.line + 1,
        problem.range.start.character + 1,
        style(code).dim(),
        problem.message
    );
}

/// Print the closing summary of a check run
pub fn print_summary(files: usize, problems: usize) {
    let noun = if files == 1 { "file" } else { "files" };
    if problems == 0 {
        print_success(&format!("{files} {noun} checked, no problems"));
    } else {
        println!(
            "{CROSS}{}",
            style(format!("{problems} problem(s) in {files} {noun}")).red()
        );
    }
}

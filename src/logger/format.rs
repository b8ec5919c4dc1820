//! Log formatting and output with ANSI colors
//!
//! Console lines are colored; the file sink receives the same line without
//! colors and with a full timestamp.

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 8;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string().dimmed();

    let console_line = format!(
        "{} [{}] [{}] {}",
        time,
        format_tag(&tag),
        format_level(level),
        message
    );
    print_stdout_safe(&console_line);

    let file_line = format!(
        "{} [{}] [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        tag.to_plain_string(),
        level.as_str(),
        message
    );
    write_to_file(&file_line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Webserver => label.bright_green().bold(),
        LogTag::Api => label.bright_purple().bold(),
        LogTag::Metrics => label.bright_cyan().bold(),
        LogTag::Database => label.bright_blue().bold(),
        LogTag::Prompts => label.bright_magenta().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LOG_TYPE_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.yellow().bold(),
        LogLevel::Info => label.white().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
}

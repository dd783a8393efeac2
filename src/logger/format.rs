//! Log formatting and output with ANSI colors
//!
//! Warnings and errors go to stderr so piped table output stays clean;
//! everything else goes to stdout. Broken pipes end the process quietly.

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stderr, stdout, ErrorKind, Write};

const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

pub fn format_and_log(tag: &LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let tag_str = tag.colorize(format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH));
    let level_str = format_level(level);

    let mut lines = message.split('\n');
    let first = lines.next().unwrap_or_default();
    let line = format!("{} [{}] [{}] {}", time.dimmed(), tag_str, level_str, first);
    print_safe(level, &line);

    let continuation = " ".repeat(time.len() + TAG_WIDTH + LEVEL_WIDTH + 7);
    for rest in lines {
        print_safe(level, &format!("{}{}", continuation, rest));
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let padded = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.bright_yellow().bold(),
        LogLevel::Info => padded.white().bold(),
        LogLevel::Debug => padded.bright_black(),
        LogLevel::Verbose => padded.dimmed(),
    }
}

fn print_safe(level: LogLevel, message: &str) {
    let result = if level <= LogLevel::Warning {
        writeln!(stderr(), "{}", message)
    } else {
        let mut out = stdout();
        writeln!(out, "{}", message).and_then(|_| out.flush())
    };

    if let Err(e) = result {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages, human-readable durations, diff listings and the install spinner.

use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};

use kb_create_lib::installer::UpdateDiff;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const BULLET: &str = "●";
  pub const ADD: &str = "+";
  pub const MODIFY: &str = "~";
  pub const REMOVE: &str = "-";
}

/// Longest progress line shown under the spinner label.
const MAX_DETAIL_WIDTH: usize = 72;

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// Shorten `line` to at most [`MAX_DETAIL_WIDTH`] characters.
pub fn truncate_detail(line: &str) -> String {
  if line.chars().count() <= MAX_DETAIL_WIDTH {
    return line.to_string();
  }
  let head: String = line.chars().take(MAX_DETAIL_WIDTH - 3).collect();
  format!("{}...", head)
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Print added, updated and removed packages, one per line.
pub fn print_diff(diff: &UpdateDiff) {
  println!();
  for pkg in &diff.added {
    println!("  {} {}", symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()), pkg);
  }
  for pkg in &diff.updated {
    println!(
      "  {} {}",
      symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
      pkg.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
  for pkg in &diff.removed {
    println!("  {} {}", symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()), pkg);
  }
  println!();
}

/// Two-line spinner: the current stage label and the latest tool output line.
///
/// Clones share the same bar, so engine callbacks can each hold one.
#[derive(Clone)]
pub struct Spinner {
  bar: ProgressBar,
}

impl Spinner {
  pub fn start() -> Self {
    let bar = ProgressBar::new_spinner();
    // The template is a literal; a parse failure would only lose the styling.
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {prefix}\n    {wide_msg:.dim}") {
      bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    Self { bar }
  }

  pub fn set_label(&self, label: String) {
    self.bar.set_prefix(label);
  }

  pub fn set_detail(&self, line: &str) {
    self.bar.set_message(truncate_detail(line));
  }

  /// Clear the spinner and leave the last label behind with a status mark.
  pub fn finish(self, ok: bool) {
    let label = self.bar.prefix();
    self.bar.finish_and_clear();
    if ok {
      println!("  {} {}", symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()), label);
    } else {
      println!("  {} {}", symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()), label);
    }
  }
}

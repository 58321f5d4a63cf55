use anyhow::{Result, bail};
use std::io::{self, IsTerminal, Write};

/// Ask a yes/no question that defaults to yes on an empty answer.
pub fn confirm(message: &str, yes: bool) -> Result<bool> {
  if yes {
    return Ok(true);
  }

  if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
    bail!("Cannot prompt for confirmation in non-interactive mode. Use --yes to proceed.");
  }

  write!(io::stderr(), "{} [Y/n] ", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
  matches!(input.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_answer_means_yes() {
    assert!(is_yes("\n"));
    assert!(is_yes(" Y \n"));
    assert!(is_yes("yes"));
    assert!(!is_yes("n"));
    assert!(!is_yes("nope"));
  }

  #[test]
  fn yes_flag_skips_prompt() {
    assert!(confirm("Apply updates?", true).unwrap());
  }
}

use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};

use devdrop_lib::error::CommandError;

/// Sequential terminal prompts used by command handlers.
pub trait Prompter {
  /// Read a line of text. An empty answer returns `default` when one is given.
  fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

  /// Read a line without echoing it.
  fn password(&self, prompt: &str) -> Result<String>;

  /// Ask a yes/no question, defaulting to no.
  fn confirm(&self, message: &str) -> Result<bool>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter;

impl TerminalPrompter {
  fn ensure_interactive() -> Result<()> {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      bail!("Cannot prompt for input in non-interactive mode. Pass the value as an argument instead.");
    }
    Ok(())
  }
}

impl Prompter for TerminalPrompter {
  fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
    Self::ensure_interactive()?;
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt).allow_empty(true);
    if let Some(default) = default {
      input = input.default(default.to_string());
    }
    Ok(input.interact_text()?.trim().to_string())
  }

  fn password(&self, prompt: &str) -> Result<String> {
    Self::ensure_interactive()?;
    let theme = ColorfulTheme::default();
    Ok(
      Password::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?,
    )
  }

  fn confirm(&self, message: &str) -> Result<bool> {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      bail!("Cannot prompt for confirmation in non-interactive mode. Use --force to proceed.");
    }
    let theme = ColorfulTheme::default();
    Ok(Confirm::with_theme(&theme).with_prompt(message).default(false).interact()?)
  }
}

/// Ask for a value that must not be empty.
pub fn required(prompter: &dyn Prompter, prompt: &str, field: &'static str) -> Result<String> {
  let value = prompter.input(prompt, None)?;
  if value.is_empty() {
    return Err(CommandError::EmptyInput(field).into());
  }
  Ok(value)
}

/// Print `items` as a numbered menu and return the index the user picks.
pub fn select(prompter: &dyn Prompter, title: &str, items: &[String]) -> Result<usize> {
  println!("{title}");
  for (i, item) in items.iter().enumerate() {
    println!("  {}) {}", i + 1, item);
  }

  let answer = prompter.input("Enter number", None)?;
  match answer.parse::<usize>() {
    Ok(n) if (1..=items.len()).contains(&n) => Ok(n - 1),
    _ => Err(CommandError::InvalidSelection(answer).into()),
  }
}

//! `devdrop switch`: choose the environment used when no name is given.

use anyhow::Result;
use tracing::info;

use devdrop_lib::config::{Config, normalize_name};
use devdrop_lib::error::CommandError;

use crate::output::{print_success, symbols};
use crate::prompts::{Prompter, select};

pub fn cmd_switch(config: &mut Config, prompter: &dyn Prompter, name: Option<&str>) -> Result<()> {
  if !config.has_environments() {
    return Err(CommandError::NoEnvironments.into());
  }

  let target = match name {
    Some(name) => normalize_name(name),
    None => {
      let current = config.resolve_current_environment();
      let names: Vec<String> = config.environments.keys().cloned().collect();
      let labels: Vec<String> = names
        .iter()
        .map(|n| {
          if *n == current {
            format!("{n} {}", symbols::CURRENT)
          } else {
            n.clone()
          }
        })
        .collect();
      let choice = select(prompter, "Available environments:", &labels)?;
      names[choice].clone()
    }
  };

  if config.environment(&target).is_none() {
    return Err(CommandError::EnvironmentNotFound { name: target }.into());
  }

  config.set_current_environment(&target)?;
  info!(environment = %target, "switched current environment");
  print_success(&format!("Switched to environment '{target}'"));
  Ok(())
}

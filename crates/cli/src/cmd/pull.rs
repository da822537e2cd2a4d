//! `devdrop pull`: fetch the latest image of an environment and record it locally.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use tracing::{info, warn};

use devdrop_lib::backend::Backend;
use devdrop_lib::config::{Config, Environment, normalize_name};
use devdrop_lib::consts::ENV_PREFIX;
use devdrop_lib::error::CommandError;

use super::require_login;
use crate::output::{print_info, print_step, print_success, print_warning};
use crate::prompts::{Prompter, select};

pub fn cmd_pull(config: &mut Config, backend: &dyn Backend, prompter: &dyn Prompter, name: Option<&str>) -> Result<()> {
  require_login(config)?;

  let target = match name {
    Some(name) => normalize_name(name),
    None => {
      let candidates = pull_candidates(config, backend);
      if candidates.is_empty() {
        return Err(CommandError::NoEnvironments.into());
      }
      let choice = select(prompter, "Available environments:", &candidates)?;
      candidates[choice].clone()
    }
  };
  let reference = config.personal_image_reference(&target);

  let engine = backend.engine()?;
  print_step(&format!("Pulling environment '{target}': {reference}"));
  match engine.pull_image(&reference) {
    Ok(()) => {}
    Err(e) if e.is_not_found() => {
      return Err(
        CommandError::ImageNotFoundOnRegistry {
          name: target,
          image: reference,
        }
        .into(),
      );
    }
    Err(e) => return Err(e).context("Failed to pull environment image"),
  }

  let mut env = config
    .environment(&target)
    .cloned()
    .unwrap_or_else(|| Environment::new(&reference));
  env.image = reference.clone();
  env.touch();
  config.add_or_update_environment(&target, env)?;
  info!(environment = %target, image = %reference, "pulled environment");

  print_success(&format!("Environment '{target}' pulled"));
  print_info(&format!("Run 'devdrop run {target}' to start it."));
  Ok(())
}

/// Local environment names merged with the user's registry repositories.
fn pull_candidates(config: &Config, backend: &dyn Backend) -> Vec<String> {
  let mut names: BTreeSet<String> = config.environments.keys().cloned().collect();

  let remote = backend
    .registry()
    .and_then(|registry| registry.list_repositories(&config.username, ENV_PREFIX));
  match remote {
    Ok(repos) => names.extend(repos),
    Err(e) => {
      warn!(error = %e, "registry listing failed");
      print_warning(&format!("Could not list registry environments: {e}"));
    }
  }

  names.into_iter().collect()
}

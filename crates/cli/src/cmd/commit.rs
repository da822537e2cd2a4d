//! `devdrop commit`: save the pending container as the environment's image and push it.

use anyhow::{Context, Result};
use tracing::{info, warn};

use devdrop_lib::backend::Backend;
use devdrop_lib::config::Config;
use devdrop_lib::error::CommandError;

use super::resolve_target;
use crate::output::{print_info, print_stat, print_step, print_success, print_warning};

pub fn cmd_commit(config: &mut Config, backend: &dyn Backend, name: Option<&str>) -> Result<()> {
  if !config.is_logged_in() {
    return Err(CommandError::NotLoggedIn.into());
  }
  if config.auth_token.is_empty() {
    return Err(CommandError::MissingAuthToken.into());
  }

  let target = resolve_target(config, name)?;
  let container_id = match config.environment(&target) {
    None => return Err(CommandError::EnvironmentNotFound { name: target }.into()),
    Some(env) if !env.has_pending_container() => {
      return Err(CommandError::NoContainerToCommit { name: target }.into());
    }
    Some(env) => env.last_container.clone(),
  };
  let reference = config.personal_image_reference(&target);

  let engine = backend.engine()?;

  print_step(&format!("Committing container {container_id} as {reference}"));
  engine
    .commit_container(&container_id, &reference)
    .context("Failed to commit container")?;

  print_step("Pushing to the registry...");
  engine
    .push_image(&reference, &config.auth_token)
    .context("Failed to push image")?;

  if let Some(env) = config.environments.get_mut(&target) {
    env.image = reference.clone();
    env.last_container.clear();
    env.touch();
  }
  config.save()?;
  info!(environment = %target, image = %reference, "committed environment");

  if let Err(e) = engine.remove_container(&container_id) {
    warn!(container = %container_id, error = %e, "failed to remove committed container");
    print_warning(&format!("Failed to clean up container {container_id}: {e}"));
  }

  print_success(&format!("Environment '{target}' committed"));
  print_stat("Image", &reference);
  print_info(&format!("Run 'devdrop run {target}' to use it anywhere."));
  Ok(())
}

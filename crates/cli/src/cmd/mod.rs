mod commit;
mod init;
mod login;
mod ls;
mod pull;
mod run;
mod status;
mod switch;

#[cfg(test)]
mod testutil;

use std::path::PathBuf;

use anyhow::{Context, Result};

use devdrop_lib::config::{Config, normalize_name};
use devdrop_lib::error::CommandError;

pub use commit::cmd_commit;
pub use init::{InitOptions, cmd_init};
pub use login::cmd_login;
pub use ls::{ListScope, cmd_ls};
pub use pull::cmd_pull;
pub use run::cmd_run;
pub use status::cmd_status;
pub use switch::cmd_switch;

fn require_login(config: &Config) -> Result<(), CommandError> {
  if config.is_logged_in() {
    Ok(())
  } else {
    Err(CommandError::NotLoggedIn)
  }
}

/// Normalized target for commands that take an optional environment name.
///
/// Without a name the resolved current environment is used.
fn resolve_target(config: &Config, name: Option<&str>) -> Result<String, CommandError> {
  if let Some(name) = name {
    return Ok(normalize_name(name));
  }
  if !config.has_environments() {
    return Err(CommandError::NoEnvironments);
  }
  let current = config.resolve_current_environment();
  if current.is_empty() {
    return Err(CommandError::NoCurrentEnvironment);
  }
  Ok(current)
}

/// Canonical path of the working directory, mounted into `run` containers.
fn workspace_dir() -> Result<PathBuf> {
  let cwd = std::env::current_dir().context("Failed to get current directory")?;
  dunce::canonicalize(&cwd).with_context(|| format!("Failed to resolve {}", cwd.display()))
}

//! `devdrop login`: verify registry credentials and store them for push.

use anyhow::{Context, Result};
use tracing::info;

use devdrop_lib::auth::encode_auth_token;
use devdrop_lib::backend::Backend;
use devdrop_lib::config::Config;
use devdrop_lib::error::CommandError;

use crate::output::print_success;
use crate::prompts::{Prompter, required};

pub fn cmd_login(config: &mut Config, backend: &dyn Backend, prompter: &dyn Prompter) -> Result<()> {
  let registry = backend.registry().context("Failed to connect to the registry")?;

  let username = required(prompter, "Username", "username")?;
  let password = prompter.password("Password")?;
  if password.is_empty() {
    return Err(CommandError::EmptyInput("password").into());
  }

  let session = registry.login(&username, &password)?;
  info!(username = %session.username, "registry login succeeded");

  let token = encode_auth_token(&username, &password).context("Failed to encode credentials")?;
  config.set_username(&session.username)?;
  config.set_auth_token(&token)?;

  print_success(&format!("Logged in as {}", session.username));
  Ok(())
}

//! Implementation of the `devdrop init` command.
//!
//! Starts a container from a starter image so the user can customize it, then
//! records the environment with the container waiting to be committed.

use anyhow::{Context, Result};
use tracing::info;

use devdrop_lib::backend::Backend;
use devdrop_lib::config::{Config, Environment, normalize_name};
use devdrop_lib::consts::STARTER_IMAGES;
use devdrop_lib::error::CommandError;

use crate::output::{print_info, print_stat, print_step, print_success};
use crate::prompts::{Prompter, required, select};

const CUSTOM_STARTER: &str = "custom";

/// Image name prefixes that map to a short suggested environment name.
const NAME_HINTS: &[(&str, &str)] = &[("ubuntu", "ubuntu"), ("golang", "go"), ("node", "node"), ("python", "python")];

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
  pub name: Option<String>,
  pub image: Option<String>,
  pub base_image: Option<String>,
  pub force: bool,
}

pub fn cmd_init(
  config: &mut Config,
  backend: &dyn Backend,
  prompter: &dyn Prompter,
  options: &InitOptions,
) -> Result<()> {
  let base_image = match options.image.as_deref() {
    Some(starter) => resolve_starter_image(starter, options.base_image.as_deref())?,
    None => prompt_starter_image(prompter)?,
  };

  let name = match options.name.as_deref() {
    Some(name) => name.to_string(),
    None => {
      let suggested = suggest_name(&base_image);
      let answer = prompter.input("Environment name", Some(&suggested))?;
      if answer.is_empty() { suggested } else { answer }
    }
  };
  let name = normalize_name(&name);

  let existing = config.environment(&name).cloned();
  if existing.is_some()
    && !options.force
    && !prompter.confirm(&format!("Environment '{name}' already exists. Re-initialize it?"))?
  {
    print_info("Aborted.");
    return Ok(());
  }

  print_step(&format!("Initializing '{name}' from {base_image}"));
  let engine = backend.engine()?;

  print_step("Pulling base image...");
  engine
    .pull_image(&base_image)
    .with_context(|| format!("Failed to pull base image {base_image}"))?;

  let container_id = engine
    .create_container(&base_image, None)
    .context("Failed to create container")?;

  print_info("Starting interactive container. Customize your environment, then type 'exit'.");
  println!();
  engine
    .run_interactive(&container_id)
    .context("Failed to start interactive container")?;

  let mut env = Environment::new(&base_image);
  if let Some(previous) = existing {
    env.created = previous.created;
    env.image = previous.image;
  }
  env.last_container = container_id.clone();

  config.add_or_update_environment(&name, env)?;
  config.set_current_environment(&name)?;
  info!(environment = %name, container = %container_id, "initialized environment");

  println!();
  print_success(&format!("Environment '{name}' initialized"));
  print_stat("Container", &container_id);
  print_info(&format!("Run 'devdrop commit {name}' to save your customizations."));
  Ok(())
}

fn resolve_starter_image(starter: &str, base_image: Option<&str>) -> Result<String, CommandError> {
  if starter == CUSTOM_STARTER {
    return match base_image {
      Some(image) if !image.trim().is_empty() => Ok(image.trim().to_string()),
      _ => Err(CommandError::MissingCustomImage),
    };
  }

  STARTER_IMAGES
    .iter()
    .find(|(key, _)| *key == starter)
    .map(|(_, image)| image.to_string())
    .ok_or_else(|| CommandError::UnknownStarterImage(starter.to_string()))
}

fn prompt_starter_image(prompter: &dyn Prompter) -> Result<String> {
  let mut items: Vec<String> = STARTER_IMAGES
    .iter()
    .map(|(key, image)| format!("{key} ({image})"))
    .collect();
  items.push(format!("{CUSTOM_STARTER} (provide your own image)"));

  let choice = select(prompter, "Available starter images:", &items)?;
  match STARTER_IMAGES.get(choice) {
    Some((_, image)) => Ok(image.to_string()),
    None => required(prompter, "Custom image", "custom image"),
  }
}

/// Suggested environment name for an image: a short preset name, or the last
/// path segment without its tag and `-latest`/`-dev` suffixes.
fn suggest_name(image: &str) -> String {
  if let Some((_, hint)) = NAME_HINTS.iter().find(|(prefix, _)| image.starts_with(prefix)) {
    return hint.to_string();
  }

  let last = image.rsplit('/').next().unwrap_or(image);
  let bare = last.split(':').next().unwrap_or(last);
  let bare = bare.strip_suffix("-latest").unwrap_or(bare);
  bare.strip_suffix("-dev").unwrap_or(bare).to_string()
}

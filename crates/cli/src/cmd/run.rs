//! `devdrop run`: start an environment with the working directory mounted.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use devdrop_lib::backend::Backend;
use devdrop_lib::config::Config;
use devdrop_lib::consts::WORKSPACE_MOUNT;
use devdrop_lib::engine::ContainerEngine;
use devdrop_lib::error::CommandError;

use super::{require_login, resolve_target, workspace_dir};
use crate::output::{print_info, print_stat, print_step, print_success, print_warning};

pub fn cmd_run(config: &mut Config, backend: &dyn Backend, name: Option<&str>) -> Result<()> {
  require_login(config)?;
  let target = resolve_target(config, name)?;
  let workspace = workspace_dir()?;
  run_in(config, backend, &target, &workspace)
}

fn run_in(config: &mut Config, backend: &dyn Backend, target: &str, workspace: &Path) -> Result<()> {
  print_step(&format!("Using environment: {target}"));
  let engine = backend.engine()?;
  let chosen = choose_image(config, engine.as_ref(), target)?;
  let image = chosen.reference;

  print_info(&format!(
    "{} will be available as {WORKSPACE_MOUNT} inside the container.",
    workspace.display()
  ));
  println!();

  let container_id = engine
    .create_container(&image, Some(workspace))
    .context("Failed to create container")?;
  engine.run_interactive(&container_id).context("Failed to start container")?;
  info!(environment = %target, image = %image, container = %container_id, "session ended");

  println!();
  print_success("Development session ended.");
  print_stat("Container", &container_id);

  let recorded = match config.set_environment_container(target, &container_id) {
    Ok(()) if chosen.from_registry => config.set_environment_image(target, &image),
    other => other,
  };
  match recorded {
    Ok(()) => print_info(&format!("Run 'devdrop commit {target}' to save your changes.")),
    Err(e) => {
      warn!(error = %e, "failed to record container");
      print_warning(&format!("Failed to save container ID to config: {e}"));
    }
  }
  Ok(())
}

struct ChosenImage {
  reference: String,
  /// Pulled from the registry as the committed image.
  from_registry: bool,
}

impl ChosenImage {
  fn local(reference: String) -> Self {
    Self {
      reference,
      from_registry: false,
    }
  }
}

/// Committed image if present locally, else the recorded base image, else
/// the committed image pulled from the registry.
fn choose_image(config: &Config, engine: &dyn ContainerEngine, target: &str) -> Result<ChosenImage> {
  let record = config.environment(target);
  let committed = match record {
    Some(env) if env.is_committed() => env.image.clone(),
    _ => config.personal_image_reference(target),
  };

  if engine.image_exists(&committed) {
    print_info(&format!("Found environment image {committed} locally."));
    return Ok(ChosenImage::local(committed));
  }

  if let Some(env) = record.filter(|env| !env.base_image.is_empty()) {
    print_info(&format!("Environment image not found, using base image {}", env.base_image));
    print_info("Run 'devdrop commit' after your session to save changes.");
    if !engine.image_exists(&env.base_image) {
      engine
        .pull_image(&env.base_image)
        .with_context(|| format!("Failed to pull base image {}", env.base_image))?;
    }
    return Ok(ChosenImage::local(env.base_image.clone()));
  }

  print_step(&format!("Pulling {committed} from the registry..."));
  match engine.pull_image(&committed) {
    Ok(()) => Ok(ChosenImage {
      reference: committed,
      from_registry: true,
    }),
    Err(e) if e.is_not_found() => Err(
      CommandError::ImageNotFoundOnRegistry {
        name: target.to_string(),
        image: committed,
      }
      .into(),
    ),
    Err(e) => Err(e).context("Failed to pull environment image"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cmd::testutil::{FakeBackend, reload, temp_config};
  use devdrop_lib::config::Environment;
  use tempfile::TempDir;

  #[test]
  fn no_environments_fails_before_engine_contact() {
    let (_temp, mut config) = temp_config(true);
    let backend = FakeBackend::default();

    let err = cmd_run(&mut config, &backend, None).unwrap_err();

    assert_eq!(err.downcast_ref::<CommandError>(), Some(&CommandError::NoEnvironments));
    assert!(err.to_string().contains("devdrop init"));
    assert_eq!(backend.engine_connects.get(), 0);
  }

  #[test]
  fn requires_login() {
    let (_temp, mut config) = temp_config(false);
    let backend = FakeBackend::default();

    let err = cmd_run(&mut config, &backend, Some("go")).unwrap_err();

    assert_eq!(err.downcast_ref::<CommandError>(), Some(&CommandError::NotLoggedIn));
    assert_eq!(backend.engine_connects.get(), 0);
  }

  #[test]
  fn prefers_local_committed_image() {
    let (_temp, mut config) = temp_config(true);
    config
      .environments
      .insert("devdrop-go".to_string(), Environment::new("golang:latest"));
    let backend = FakeBackend::default();
    backend
      .engine
      .borrow_mut()
      .local_images
      .insert("alice/devdrop-go:latest".to_string());
    let workspace = TempDir::new().unwrap();

    run_in(&mut config, &backend, "devdrop-go", workspace.path()).unwrap();

    let state = backend.state();
    assert_eq!(state.containers[0].1, "alice/devdrop-go:latest");
    assert_eq!(state.containers[0].2.as_deref(), Some(workspace.path()));
    assert!(state.pulled.is_empty());
    drop(state);
    assert_eq!(reload(&config).environment("go").unwrap().last_container, "container-1");
  }

  #[test]
  fn falls_back_to_base_image() {
    let (_temp, mut config) = temp_config(true);
    config
      .environments
      .insert("devdrop-go".to_string(), Environment::new("golang:latest"));
    let backend = FakeBackend::with_registry_images(&["golang:latest"]);
    let workspace = TempDir::new().unwrap();

    run_in(&mut config, &backend, "devdrop-go", workspace.path()).unwrap();

    let state = backend.state();
    assert_eq!(state.pulled, vec!["golang:latest"]);
    assert_eq!(state.containers[0].1, "golang:latest");
  }

  #[test]
  fn unknown_environment_pulls_personal_image() {
    let (_temp, mut config) = temp_config(true);
    let backend = FakeBackend::with_registry_images(&["alice/devdrop-web:latest"]);
    let workspace = TempDir::new().unwrap();

    run_in(&mut config, &backend, "devdrop-web", workspace.path()).unwrap();

    assert_eq!(backend.state().containers[0].1, "alice/devdrop-web:latest");
    let saved = reload(&config);
    let env = saved.environment("web").unwrap();
    assert_eq!(env.last_container, "container-1");
    assert!(env.is_committed());
    assert_eq!(env.image, "alice/devdrop-web:latest");
  }

  #[test]
  fn base_image_session_stays_uncommitted() {
    let (_temp, mut config) = temp_config(true);
    config
      .environments
      .insert("devdrop-go".to_string(), Environment::new("golang:latest"));
    let backend = FakeBackend::with_registry_images(&["golang:latest"]);
    let workspace = TempDir::new().unwrap();

    run_in(&mut config, &backend, "devdrop-go", workspace.path()).unwrap();

    assert!(!reload(&config).environment("go").unwrap().is_committed());
  }

  #[test]
  #[tracing_test::traced_test]
  fn unsaved_container_id_is_only_a_warning() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let mut config = Config::new(blocker.join("config.yaml"));
    config.username = "alice".to_string();
    let backend = FakeBackend::default();
    backend
      .engine
      .borrow_mut()
      .local_images
      .insert("alice/devdrop-go:latest".to_string());
    let workspace = TempDir::new().unwrap();

    run_in(&mut config, &backend, "devdrop-go", workspace.path()).unwrap();

    assert_eq!(backend.state().containers.len(), 1);
    assert!(logs_contain("failed to record container"));
  }

  #[test]
  fn missing_registry_image_is_reported() {
    let (_temp, mut config) = temp_config(true);
    let backend = FakeBackend::default();
    let workspace = TempDir::new().unwrap();

    let err = run_in(&mut config, &backend, "devdrop-web", workspace.path()).unwrap_err();

    assert_eq!(
      err.downcast_ref::<CommandError>(),
      Some(&CommandError::ImageNotFoundOnRegistry {
        name: "devdrop-web".to_string(),
        image: "alice/devdrop-web:latest".to_string(),
      })
    );
    assert!(backend.state().containers.is_empty());
  }
}

//! In-memory collaborators for handler tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use tempfile::TempDir;

use devdrop_lib::backend::Backend;
use devdrop_lib::config::Config;
use devdrop_lib::engine::{ContainerEngine, EngineError};
use devdrop_lib::hub::{HubError, LoginSession, RegistryApi};

use crate::prompts::Prompter;

#[derive(Debug, Default)]
pub struct EngineState {
  pub local_images: BTreeSet<String>,
  pub registry_images: BTreeSet<String>,
  pub containers: Vec<(String, String, Option<PathBuf>)>,
  pub committed: Vec<(String, String)>,
  pub pushed: Vec<(String, String)>,
  pub pulled: Vec<String>,
  pub removed: Vec<String>,
  pub fail_remove: bool,
}

pub struct FakeEngine(Rc<RefCell<EngineState>>);

impl ContainerEngine for FakeEngine {
  fn pull_image(&self, reference: &str) -> Result<(), EngineError> {
    let mut state = self.0.borrow_mut();
    state.pulled.push(reference.to_string());
    if !state.registry_images.contains(reference) {
      return Err(EngineError::NotFound {
        reference: reference.to_string(),
        message: "manifest unknown".to_string(),
      });
    }
    state.local_images.insert(reference.to_string());
    Ok(())
  }

  fn image_exists(&self, reference: &str) -> bool {
    self.0.borrow().local_images.contains(reference)
  }

  fn create_container(&self, image: &str, workspace: Option<&Path>) -> Result<String, EngineError> {
    let mut state = self.0.borrow_mut();
    let id = format!("container-{}", state.containers.len() + 1);
    state
      .containers
      .push((id.clone(), image.to_string(), workspace.map(Path::to_path_buf)));
    Ok(id)
  }

  fn run_interactive(&self, _container_id: &str) -> Result<(), EngineError> {
    Ok(())
  }

  fn commit_container(&self, container_id: &str, reference: &str) -> Result<(), EngineError> {
    let mut state = self.0.borrow_mut();
    state.committed.push((container_id.to_string(), reference.to_string()));
    state.local_images.insert(reference.to_string());
    Ok(())
  }

  fn push_image(&self, reference: &str, auth_token: &str) -> Result<(), EngineError> {
    let mut state = self.0.borrow_mut();
    state.pushed.push((reference.to_string(), auth_token.to_string()));
    state.registry_images.insert(reference.to_string());
    Ok(())
  }

  fn remove_container(&self, container_id: &str) -> Result<(), EngineError> {
    let mut state = self.0.borrow_mut();
    if state.fail_remove {
      return Err(EngineError::Api {
        operation: "remove container",
        message: "device busy".to_string(),
      });
    }
    state.removed.push(container_id.to_string());
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct FakeHub {
  pub repositories: Vec<String>,
  pub fail_listing: bool,
}

impl RegistryApi for FakeHub {
  fn login(&self, username: &str, password: &str) -> Result<LoginSession, HubError> {
    if password != "correct" {
      return Err(HubError::InvalidCredentials);
    }
    Ok(LoginSession {
      username: username.to_string(),
      token: "session".to_string(),
    })
  }

  fn list_repositories(&self, _username: &str, prefix: &str) -> Result<Vec<String>, HubError> {
    if self.fail_listing {
      return Err(HubError::Status {
        url: "http://hub.test".to_string(),
        status: 500,
      });
    }
    let mut names: Vec<_> = self
      .repositories
      .iter()
      .filter(|r| r.starts_with(prefix))
      .cloned()
      .collect();
    names.sort();
    Ok(names)
  }
}

#[derive(Default)]
pub struct FakeBackend {
  pub engine: Rc<RefCell<EngineState>>,
  pub hub: FakeHub,
  pub engine_connects: Cell<usize>,
  pub registry_connects: Cell<usize>,
}

impl FakeBackend {
  pub fn with_registry_images(images: &[&str]) -> Self {
    let backend = Self::default();
    backend
      .engine
      .borrow_mut()
      .registry_images
      .extend(images.iter().map(|i| i.to_string()));
    backend
  }

  pub fn state(&self) -> std::cell::Ref<'_, EngineState> {
    self.engine.borrow()
  }
}

impl Backend for FakeBackend {
  fn engine(&self) -> Result<Box<dyn ContainerEngine>, EngineError> {
    self.engine_connects.set(self.engine_connects.get() + 1);
    Ok(Box::new(FakeEngine(Rc::clone(&self.engine))))
  }

  fn registry(&self) -> Result<Box<dyn RegistryApi>, HubError> {
    self.registry_connects.set(self.registry_connects.get() + 1);
    Ok(Box::new(self.hub.clone()))
  }
}

/// Replays canned answers; panics when a handler asks for more than scripted.
#[derive(Default)]
pub struct ScriptedPrompter {
  answers: RefCell<VecDeque<String>>,
  confirms: RefCell<VecDeque<bool>>,
}

impl ScriptedPrompter {
  pub fn new(answers: &[&str]) -> Self {
    Self {
      answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
      confirms: RefCell::default(),
    }
  }

  pub fn confirming(self, answers: &[bool]) -> Self {
    self.confirms.borrow_mut().extend(answers);
    self
  }

  pub fn is_exhausted(&self) -> bool {
    self.answers.borrow().is_empty() && self.confirms.borrow().is_empty()
  }

  fn next(&self, prompt: &str) -> String {
    self
      .answers
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(|| panic!("unexpected prompt: {prompt}"))
  }
}

impl Prompter for ScriptedPrompter {
  fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
    let answer = self.next(prompt);
    match default {
      Some(default) if answer.is_empty() => Ok(default.to_string()),
      _ => Ok(answer),
    }
  }

  fn password(&self, prompt: &str) -> Result<String> {
    Ok(self.next(prompt))
  }

  fn confirm(&self, message: &str) -> Result<bool> {
    Ok(
      self
        .confirms
        .borrow_mut()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected confirmation: {message}")),
    )
  }
}

/// An empty config saved under a temp dir, optionally logged in as `alice`.
pub fn temp_config(logged_in: bool) -> (TempDir, Config) {
  let temp = TempDir::new().unwrap();
  let mut config = Config::new(temp.path().join("config.yaml"));
  if logged_in {
    config.username = "alice".to_string();
    config.auth_token = devdrop_lib::auth::encode_auth_token("alice", "correct").unwrap();
  }
  (temp, config)
}

pub fn reload(config: &Config) -> Config {
  Config::load_from(config.path()).unwrap()
}

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use super::name::{normalize_name, personal_image_reference};
use super::types::{Config, ConfigError, Environment, default_base_image};
use crate::paths;

impl Config {
  /// Create an empty config that will be saved to `path`.
  pub fn new(path: PathBuf) -> Self {
    Self {
      username: String::new(),
      base_image: default_base_image(),
      legacy_last_container: String::new(),
      auth_token: String::new(),
      current_environment: String::new(),
      environments: BTreeMap::new(),
      path,
    }
  }

  /// Load the config from its default location (`~/.devdrop/config.yaml`).
  pub fn load() -> Result<Self, ConfigError> {
    let path = paths::config_path().ok_or(ConfigError::HomeDir)?;
    Self::load_from(&path)
  }

  /// Load the config from `path`.
  ///
  /// Returns a default config if the file doesn't exist yet.
  /// Returns `Err` if the file exists but couldn't be read or parsed.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Self::new(path.to_path_buf()));
      }
      Err(e) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source: e,
        });
      }
    };

    let mut config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;
    config.path = path.to_path_buf();

    debug!(path = %path.display(), environments = config.environments.len(), "loaded config");
    Ok(config)
  }

  /// Write the whole config back to its file, creating the directory if needed.
  ///
  /// Not atomic: a failure mid-write can leave a truncated file.
  pub fn save(&self) -> Result<(), ConfigError> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDir {
          path: parent.to_path_buf(),
          source: e,
        })?;
      }
    }

    let content = serde_yaml::to_string(self).map_err(ConfigError::Serialize)?;
    fs::write(&self.path, content).map_err(|e| ConfigError::Write {
      path: self.path.clone(),
      source: e,
    })?;

    debug!(path = %self.path.display(), "saved config");
    Ok(())
  }

  /// Path this config is saved to.
  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn is_logged_in(&self) -> bool {
    !self.username.is_empty()
  }

  pub fn set_username(&mut self, username: &str) -> Result<(), ConfigError> {
    self.username = username.to_string();
    self.save()
  }

  pub fn set_auth_token(&mut self, auth_token: &str) -> Result<(), ConfigError> {
    self.auth_token = auth_token.to_string();
    self.save()
  }

  /// Point `current_environment` at `name` (normalized).
  ///
  /// Does not check that the environment exists; callers decide.
  pub fn set_current_environment(&mut self, name: &str) -> Result<(), ConfigError> {
    self.current_environment = normalize_name(name);
    self.save()
  }

  /// Insert or replace an environment under its normalized name.
  ///
  /// Returns the key it was stored under.
  pub fn add_or_update_environment(&mut self, name: &str, env: Environment) -> Result<String, ConfigError> {
    let name = normalize_name(name);
    self.environments.insert(name.clone(), env);
    self.save()?;
    Ok(name)
  }

  /// Record the container produced by `init` or `run` for an environment.
  ///
  /// Creates an empty environment if none exists under that name.
  pub fn set_environment_container(&mut self, name: &str, container_id: &str) -> Result<(), ConfigError> {
    let name = normalize_name(name);
    let env = self.environments.entry(name.clone()).or_insert_with(|| Environment {
      created: Some(Utc::now()),
      ..Default::default()
    });
    env.last_container = container_id.to_string();
    env.touch();
    info!(environment = %name, container = %container_id, "recorded container");
    self.save()
  }

  /// Record the registry image an environment runs from.
  ///
  /// Creates an empty environment if none exists under that name.
  pub fn set_environment_image(&mut self, name: &str, image: &str) -> Result<(), ConfigError> {
    let name = normalize_name(name);
    let env = self.environments.entry(name.clone()).or_insert_with(|| Environment {
      created: Some(Utc::now()),
      ..Default::default()
    });
    env.image = image.to_string();
    debug!(environment = %name, image = %image, "recorded environment image");
    self.save()
  }

  /// Look up an environment by (normalized) name.
  pub fn environment(&self, name: &str) -> Option<&Environment> {
    self.environments.get(&normalize_name(name))
  }

  pub fn has_environments(&self) -> bool {
    !self.environments.is_empty()
  }

  /// Resolve the environment used when no explicit name is given.
  ///
  /// Returns `current_environment` when it names an existing environment.
  /// Otherwise returns the most recently updated environment; among equal
  /// timestamps the first name in sort order wins. Returns an empty string when
  /// there are no environments.
  pub fn resolve_current_environment(&self) -> String {
    if !self.current_environment.is_empty() && self.environments.contains_key(&self.current_environment) {
      return self.current_environment.clone();
    }

    let mut latest: Option<(&String, &Environment)> = None;
    for (name, env) in &self.environments {
      match latest {
        Some((_, best)) if env.last_updated <= best.last_updated => {}
        _ => latest = Some((name, env)),
      }
    }

    latest.map(|(name, _)| name.clone()).unwrap_or_default()
  }

  /// Registry reference for an environment owned by the logged-in user.
  ///
  /// Empty when not logged in.
  pub fn personal_image_reference(&self, name: &str) -> String {
    personal_image_reference(&self.username, name)
  }
}

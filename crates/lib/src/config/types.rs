use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_BASE_IMAGE;

/// Persisted devdrop settings: login identity plus named environments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Registry login identity. Empty means "not logged in".
  #[serde(default)]
  pub username: String,

  /// Default starter image.
  #[serde(default = "default_base_image")]
  pub base_image: String,

  /// Container id written by the first release of devdrop, before containers
  /// were tracked per environment. Kept so old files survive a save.
  #[serde(rename = "last_container", default, skip_serializing_if = "String::is_empty")]
  pub legacy_last_container: String,

  /// Opaque credential blob handed to the engine when pushing.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub auth_token: String,

  /// Environment used by commands that take no explicit name. May be stale.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub current_environment: String,

  /// Environments keyed by their prefixed name.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub environments: BTreeMap<String, Environment>,

  /// Where this config was loaded from and is saved to.
  #[serde(skip)]
  pub(crate) path: PathBuf,
}

/// A named environment: an image plus the metadata needed to run and commit it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
  /// Registry reference once committed or pulled.
  #[serde(default)]
  pub image: String,

  /// Image this environment was started from.
  #[serde(default)]
  pub base_image: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created: Option<DateTime<Utc>>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_updated: Option<DateTime<Utc>>,

  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,

  /// Container from the latest `init` or `run`, waiting to be committed.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub last_container: String,
}

/// Errors that can occur when loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("could not determine the home directory; set DEVDROP_HOME")]
  HomeDir,

  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  /// The file exists but is not a valid config. The user must fix or delete it.
  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },

  #[error("failed to serialize config: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error("failed to create config directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write config file {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

impl Environment {
  /// Create a fresh environment derived from `base_image`, created now.
  pub fn new(base_image: &str) -> Self {
    let now = Utc::now();
    Self {
      base_image: base_image.to_string(),
      created: Some(now),
      last_updated: Some(now),
      description: format!("Environment based on {base_image}"),
      ..Default::default()
    }
  }

  /// Bump `last_updated` to now.
  pub fn touch(&mut self) {
    self.last_updated = Some(Utc::now());
  }

  /// True once the environment has been committed or pulled.
  pub fn is_committed(&self) -> bool {
    !self.image.is_empty()
  }

  /// True if a container from `init` or `run` is waiting to be committed.
  pub fn has_pending_container(&self) -> bool {
    !self.last_container.is_empty()
  }
}

pub(crate) fn default_base_image() -> String {
  DEFAULT_BASE_IMAGE.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Environment>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<BTreeMap<String, Environment>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_environment_sets_both_timestamps() {
    let env = Environment::new("golang:latest");
    assert_eq!(env.base_image, "golang:latest");
    assert_eq!(env.created, env.last_updated);
    assert!(env.created.is_some());
    assert!(!env.is_committed());
    assert!(!env.has_pending_container());
  }

  #[test]
  fn touch_moves_last_updated_forward() {
    let mut env = Environment::new("ubuntu:24.04");
    let created = env.created;
    std::thread::sleep(std::time::Duration::from_millis(2));
    env.touch();
    assert_eq!(env.created, created);
    assert!(env.last_updated > created);
  }

  #[test]
  fn null_environments_deserialize_as_empty_map() {
    let config: Config = serde_yaml::from_str("username: bob\nenvironments: null\n").unwrap();
    assert!(config.environments.is_empty());
    assert_eq!(config.base_image, DEFAULT_BASE_IMAGE);
  }

  #[test]
  fn go_zero_time_is_accepted() {
    let yaml = "image: ''\nbase_image: ubuntu:24.04\ncreated: 0001-01-01T00:00:00Z\nlast_updated: 2024-05-01T12:00:00Z\n";
    let env: Environment = serde_yaml::from_str(yaml).unwrap();
    assert!(env.created.is_some());
    assert!(env.last_updated > env.created);
  }
}

//! `devdrop ls`: list local and registry environments.

use anyhow::Result;
use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::warn;

use devdrop_lib::backend::Backend;
use devdrop_lib::config::Config;
use devdrop_lib::consts::ENV_PREFIX;

use super::require_login;
use crate::output::{OutputFormat, format_timestamp, print_error, print_header, print_info, print_json, symbols};

/// Which sections `ls` prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListScope {
  #[default]
  All,
  LocalOnly,
  RemoteOnly,
}

impl ListScope {
  fn local(self) -> bool {
    self != ListScope::RemoteOnly
  }

  fn remote(self) -> bool {
    self != ListScope::LocalOnly
  }
}

#[derive(Debug, Serialize)]
struct LocalEntry {
  name: String,
  current: bool,
  image: String,
  base_image: String,
  committed: bool,
  pending_container: bool,
  created: Option<DateTime<Utc>>,
  last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct RemoteEntry {
  name: String,
  configured_locally: bool,
}

#[derive(Debug, Default, Serialize)]
struct Listing {
  #[serde(skip_serializing_if = "Option::is_none")]
  local: Option<Vec<LocalEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  remote: Option<Vec<RemoteEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  remote_error: Option<String>,
}

pub fn cmd_ls(config: &Config, backend: &dyn Backend, scope: ListScope, format: OutputFormat) -> Result<()> {
  require_login(config)?;
  let listing = build_listing(config, backend, scope);

  if format.is_json() {
    return print_json(&listing);
  }

  if let Some(local) = &listing.local {
    print_header("Local environments:");
    if local.is_empty() {
      print_info("No local environments. Run 'devdrop init' to create one.");
    }
    for entry in local {
      let marker = if entry.current { symbols::CURRENT } else { " " };
      let detail = if entry.committed {
        entry.image.clone()
      } else {
        format!("uncommitted, based on {}", entry.base_image)
      };
      println!(
        "  {} {} {}",
        marker.if_supports_color(Stream::Stdout, |s| s.green()),
        entry.name,
        format!("({detail})").if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
      println!(
        "      Created: {}, Updated: {}",
        format_timestamp(entry.created),
        format_timestamp(entry.last_updated)
      );
    }
  }

  if listing.remote.is_some() || listing.remote_error.is_some() {
    if listing.local.is_some() {
      println!();
    }
    print_header("Registry environments:");
  }
  if let Some(error) = &listing.remote_error {
    print_error(&format!("Could not list registry environments: {error}"));
  }
  if let Some(remote) = &listing.remote {
    if remote.is_empty() {
      print_info("No environments on the registry yet. Run 'devdrop commit' to push one.");
    }
    for entry in remote {
      let status = if entry.configured_locally {
        "configured locally"
      } else {
        "not pulled"
      };
      println!(
        "    {} {}",
        entry.name,
        format!("({status})").if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }

  Ok(())
}

fn build_listing(config: &Config, backend: &dyn Backend, scope: ListScope) -> Listing {
  let mut listing = Listing::default();

  if scope.local() {
    let current = config.resolve_current_environment();
    listing.local = Some(
      config
        .environments
        .iter()
        .map(|(name, env)| LocalEntry {
          name: name.clone(),
          current: *name == current,
          image: env.image.clone(),
          base_image: env.base_image.clone(),
          committed: env.is_committed(),
          pending_container: env.has_pending_container(),
          created: env.created,
          last_updated: env.last_updated,
        })
        .collect(),
    );
  }

  if scope.remote() {
    let remote = backend
      .registry()
      .and_then(|registry| registry.list_repositories(&config.username, ENV_PREFIX));
    match remote {
      Ok(repos) => {
        listing.remote = Some(
          repos
            .into_iter()
            .map(|name| RemoteEntry {
              configured_locally: config.environments.contains_key(&name),
              name,
            })
            .collect(),
        );
      }
      Err(e) => {
        warn!(error = %e, "registry listing failed");
        listing.remote_error = Some(e.to_string());
      }
    }
  }

  listing
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cmd::testutil::{FakeBackend, FakeHub, temp_config};
  use devdrop_lib::config::Environment;
  use devdrop_lib::error::CommandError;

  fn backend_with(repos: &[&str]) -> FakeBackend {
    FakeBackend {
      hub: FakeHub {
        repositories: repos.iter().map(|r| r.to_string()).collect(),
        fail_listing: false,
      },
      ..Default::default()
    }
  }

  #[test]
  fn local_only_never_contacts_registry() {
    let (_temp, mut config) = temp_config(true);
    config
      .environments
      .insert("devdrop-go".to_string(), Environment::new("golang:latest"));
    let backend = backend_with(&[]);

    let listing = build_listing(&config, &backend, ListScope::LocalOnly);

    assert_eq!(backend.registry_connects.get(), 0);
    assert!(listing.remote.is_none());
    let local = listing.local.unwrap();
    assert_eq!(local.len(), 1);
    assert!(local[0].current);
    assert!(!local[0].committed);
  }

  #[test]
  fn remote_entries_are_marked() {
    let (_temp, mut config) = temp_config(true);
    config
      .environments
      .insert("devdrop-go".to_string(), Environment::new("golang:latest"));
    let backend = backend_with(&["devdrop-node", "devdrop-go", "website"]);

    let listing = build_listing(&config, &backend, ListScope::RemoteOnly);

    assert!(listing.local.is_none());
    let remote = listing.remote.unwrap();
    let marks: Vec<_> = remote.iter().map(|r| (r.name.as_str(), r.configured_locally)).collect();
    assert_eq!(marks, vec![("devdrop-go", true), ("devdrop-node", false)]);
  }

  #[test]
  fn listing_failure_is_not_fatal() {
    let (_temp, config) = temp_config(true);
    let mut backend = backend_with(&[]);
    backend.hub.fail_listing = true;

    let listing = build_listing(&config, &backend, ListScope::All);

    assert!(listing.remote.is_none());
    assert!(listing.remote_error.is_some());
    assert!(cmd_ls(&config, &backend, ListScope::All, OutputFormat::Text).is_ok());
  }

  #[test]
  fn current_marker_follows_resolution() {
    let (_temp, mut config) = temp_config(true);
    for name in ["devdrop-a", "devdrop-b"] {
      config
        .environments
        .insert(name.to_string(), Environment::new("ubuntu:24.04"));
    }
    config.current_environment = "devdrop-b".to_string();

    let local = build_listing(&config, &backend_with(&[]), ListScope::LocalOnly).local.unwrap();

    let current: Vec<_> = local.iter().filter(|e| e.current).map(|e| e.name.as_str()).collect();
    assert_eq!(current, vec!["devdrop-b"]);
  }

  #[test]
  fn local_entries_carry_timestamps() {
    let (_temp, mut config) = temp_config(true);
    let env = Environment::new("golang:latest");
    let (created, updated) = (env.created, env.last_updated);
    config.environments.insert("devdrop-go".to_string(), env);

    let local = build_listing(&config, &backend_with(&[]), ListScope::LocalOnly).local.unwrap();

    assert!(created.is_some());
    assert_eq!(local[0].created, created);
    assert_eq!(local[0].last_updated, updated);
  }

  #[test]
  fn requires_login() {
    let (_temp, config) = temp_config(false);
    let err = cmd_ls(&config, &backend_with(&[]), ListScope::LocalOnly, OutputFormat::Text).unwrap_err();
    assert_eq!(err.downcast_ref::<CommandError>(), Some(&CommandError::NotLoggedIn));
  }
}

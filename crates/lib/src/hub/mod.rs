//! Container registry collaborator.
//!
//! Login and repository listing go through the registry's HTTP API rather than
//! the engine. [`HubClient`] talks to Docker Hub.

mod client;

use thiserror::Error;

pub use client::HubClient;

/// Errors reported by the registry HTTP API.
#[derive(Debug, Error)]
pub enum HubError {
  #[error("registry request to {url} failed: {source}")]
  Http {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("registry returned status {status} for {url}")]
  Status { url: String, status: u16 },

  #[error("authentication failed: incorrect username or password")]
  InvalidCredentials,

  #[error("failed to decode registry response from {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: reqwest::Error,
  },
}

/// Result of a successful registry login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
  pub username: String,
  /// Session token issued by the registry. devdrop does not persist it.
  pub token: String,
}

/// Operations devdrop needs from a container registry.
pub trait RegistryApi {
  /// Verify credentials with the registry.
  fn login(&self, username: &str, password: &str) -> Result<LoginSession, HubError>;

  /// Names of `username`'s repositories that start with `prefix`, sorted.
  fn list_repositories(&self, username: &str, prefix: &str) -> Result<Vec<String>, HubError>;
}

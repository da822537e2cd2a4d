//! Container engine collaborator.
//!
//! devdrop never reimplements image or container lifecycle; it asks the engine
//! through the narrow [`ContainerEngine`] interface. [`DockerEngine`] is the
//! production implementation.

mod docker;

use std::path::Path;

use thiserror::Error;

use crate::auth::AuthTokenError;

pub use docker::DockerEngine;

/// Errors reported by the container engine.
#[derive(Debug, Error)]
pub enum EngineError {
  /// The engine could not be reached at all.
  #[error("failed to connect to Docker: {0}")]
  Connection(String),

  #[error("failed to start async runtime: {0}")]
  Runtime(#[source] std::io::Error),

  /// The image or container does not exist locally or on the registry.
  #[error("{reference} not found: {message}")]
  NotFound { reference: String, message: String },

  #[error("{operation} failed: {message}")]
  Api { operation: &'static str, message: String },

  #[error("interactive session for container {container} failed: {message}")]
  Interactive { container: String, message: String },

  #[error("failed to push {reference}: {message}")]
  Push { reference: String, message: String },

  #[error("invalid auth token, run 'devdrop login' again: {0}")]
  InvalidAuthToken(#[from] AuthTokenError),
}

impl EngineError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, EngineError::NotFound { .. })
  }
}

/// Operations devdrop needs from a container engine.
pub trait ContainerEngine {
  /// Pull `reference` from its registry, waiting for completion.
  fn pull_image(&self, reference: &str) -> Result<(), EngineError>;

  /// True if `reference` is present in the local image store.
  fn image_exists(&self, reference: &str) -> bool;

  /// Create a container running an interactive shell in `image`.
  ///
  /// With a workspace, the directory is mounted at `/workspace` and used as the
  /// working directory. Returns the container id.
  fn create_container(&self, image: &str, workspace: Option<&Path>) -> Result<String, EngineError>;

  /// Start the container attached to the current terminal and wait for it to exit.
  fn run_interactive(&self, container_id: &str) -> Result<(), EngineError>;

  /// Save the container's filesystem as image `reference`.
  fn commit_container(&self, container_id: &str, reference: &str) -> Result<(), EngineError>;

  /// Push `reference` using the credential blob stored by `devdrop login`.
  fn push_image(&self, reference: &str, auth_token: &str) -> Result<(), EngineError>;

  /// Force-remove a container.
  fn remove_container(&self, container_id: &str) -> Result<(), EngineError>;
}

/// Error text fragments the engine uses when an image is missing or private.
const NOT_FOUND_MARKERS: &[&str] = &["not found", "404", "does not exist", "pull access denied"];

/// Best-effort check for "image not found" in free-form engine error text.
///
/// Only used where the engine reports failures as text inside a progress
/// stream rather than as a status code.
pub fn looks_like_not_found(message: &str) -> bool {
  let lower = message.to_lowercase();
  NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker))
}

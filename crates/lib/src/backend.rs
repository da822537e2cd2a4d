//! Lazy access to the external collaborators.
//!
//! Handlers receive a [`Backend`] instead of live connections so a command
//! that fails validation never touches the engine or the network.

use tracing::debug;

use crate::engine::{ContainerEngine, DockerEngine, EngineError};
use crate::hub::{HubClient, HubError, RegistryApi};

pub trait Backend {
  /// Connect to the container engine.
  fn engine(&self) -> Result<Box<dyn ContainerEngine>, EngineError>;

  /// Build a client for the container registry API.
  fn registry(&self) -> Result<Box<dyn RegistryApi>, HubError>;
}

/// Local Docker daemon plus Docker Hub.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBackend;

impl Backend for DefaultBackend {
  fn engine(&self) -> Result<Box<dyn ContainerEngine>, EngineError> {
    debug!("connecting to container engine");
    Ok(Box::new(DockerEngine::connect()?))
  }

  fn registry(&self) -> Result<Box<dyn RegistryApi>, HubError> {
    Ok(Box::new(HubClient::new()?))
  }
}

//! Docker implementation of [`ContainerEngine`] built on bollard.
//!
//! The engine API is async; devdrop commands are not. Each call is driven to
//! completion on a private current-thread runtime. The interactive attach goes
//! through `docker start -i`, which handles raw TTY mode and resizing.

use std::path::Path;
use std::process::{Command, Stdio};

use bollard::Docker;
use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions};
use bollard::errors::Error as BollardError;
use bollard::image::{CommitContainerOptions, CreateImageOptions, PushImageOptions};
use bollard::models::HostConfig;
use futures_util::StreamExt;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::{ContainerEngine, EngineError, looks_like_not_found};
use crate::auth::decode_auth_token;
use crate::consts::{CONTAINER_SHELL, IMAGE_TAG, WORKSPACE_MOUNT};

const COMMIT_COMMENT: &str = "devdrop environment commit";
const COMMIT_AUTHOR: &str = "devdrop";

/// Shell exit codes treated as a normal end of an interactive session.
const CLEAN_EXIT_CODES: std::ops::RangeInclusive<i32> = 0..=2;

/// Connection to the local Docker daemon.
pub struct DockerEngine {
  docker: Docker,
  runtime: Runtime,
}

impl DockerEngine {
  /// Connect using the local defaults (`DOCKER_HOST` or the platform socket)
  /// and ping the daemon.
  pub fn connect() -> Result<Self, EngineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(EngineError::Runtime)?;

    let docker = runtime
      .block_on(async {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;
        Ok::<_, BollardError>(docker)
      })
      .map_err(|e| EngineError::Connection(e.to_string()))?;

    debug!("connected to docker daemon");
    Ok(Self { docker, runtime })
  }
}

impl ContainerEngine for DockerEngine {
  fn pull_image(&self, reference: &str) -> Result<(), EngineError> {
    let (repo, tag) = split_reference(reference);
    info!(image = %reference, "pulling image");

    self.runtime.block_on(async {
      let options = CreateImageOptions {
        from_image: repo,
        tag,
        ..Default::default()
      };
      let mut stream = self.docker.create_image(Some(options), None, None);

      while let Some(item) = stream.next().await {
        let progress = item.map_err(|e| classify("pull", reference, e))?;
        if let Some(error) = progress.error {
          return Err(classify("pull", reference, BollardError::DockerStreamError { error }));
        }
        if let Some(status) = progress.status {
          debug!(image = %reference, %status, "pull progress");
        }
      }
      Ok(())
    })
  }

  fn image_exists(&self, reference: &str) -> bool {
    let exists = self.runtime.block_on(self.docker.inspect_image(reference)).is_ok();
    debug!(image = %reference, exists, "checked local image");
    exists
  }

  fn create_container(&self, image: &str, workspace: Option<&Path>) -> Result<String, EngineError> {
    let host_config = workspace.map(|dir| HostConfig {
      binds: Some(vec![format!("{}:{}", dir.display(), WORKSPACE_MOUNT)]),
      ..Default::default()
    });

    let config = Config {
      image: Some(image.to_string()),
      cmd: Some(vec![CONTAINER_SHELL.to_string()]),
      tty: Some(true),
      open_stdin: Some(true),
      attach_stdin: Some(true),
      attach_stdout: Some(true),
      attach_stderr: Some(true),
      working_dir: workspace.map(|_| WORKSPACE_MOUNT.to_string()),
      host_config,
      ..Default::default()
    };

    let response = self
      .runtime
      .block_on(self.docker.create_container(None::<CreateContainerOptions<String>>, config))
      .map_err(|e| classify("create container", image, e))?;

    info!(image = %image, container = %response.id, "created container");
    Ok(response.id)
  }

  fn run_interactive(&self, container_id: &str) -> Result<(), EngineError> {
    let status = Command::new("docker")
      .args(["start", "-i", container_id])
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()
      .map_err(|e| EngineError::Interactive {
        container: container_id.to_string(),
        message: e.to_string(),
      })?;

    if !session_ended_cleanly(status.code()) {
      return Err(EngineError::Interactive {
        container: container_id.to_string(),
        message: format!("docker start exited with {status}"),
      });
    }
    debug!(container = %container_id, code = ?status.code(), "interactive session ended");
    Ok(())
  }

  fn commit_container(&self, container_id: &str, reference: &str) -> Result<(), EngineError> {
    let (repo, tag) = split_reference(reference);
    let options = CommitContainerOptions {
      container: container_id,
      repo,
      tag,
      comment: COMMIT_COMMENT,
      author: COMMIT_AUTHOR,
      pause: true,
      changes: None,
    };

    let commit = self
      .runtime
      .block_on(self.docker.commit_container(options, Config::<String>::default()))
      .map_err(|e| classify("commit", container_id, e))?;

    info!(container = %container_id, image = %reference, id = ?commit.id, "committed container");
    Ok(())
  }

  fn push_image(&self, reference: &str, auth_token: &str) -> Result<(), EngineError> {
    let credentials = decode_auth_token(auth_token)?;
    let (repo, tag) = split_reference(reference);
    info!(image = %reference, "pushing image");

    self.runtime.block_on(async {
      let mut stream = self
        .docker
        .push_image(repo, Some(PushImageOptions { tag }), Some(credentials));

      while let Some(item) = stream.next().await {
        let progress = item.map_err(|e| EngineError::Push {
          reference: reference.to_string(),
          message: e.to_string(),
        })?;
        if let Some(error) = progress.error {
          return Err(EngineError::Push {
            reference: reference.to_string(),
            message: error,
          });
        }
        if let Some(status) = progress.status {
          debug!(image = %reference, %status, "push progress");
        }
      }
      Ok(())
    })
  }

  fn remove_container(&self, container_id: &str) -> Result<(), EngineError> {
    let options = RemoveContainerOptions {
      force: true,
      ..Default::default()
    };

    self
      .runtime
      .block_on(self.docker.remove_container(container_id, Some(options)))
      .map_err(|e| classify("remove container", container_id, e))?;

    debug!(container = %container_id, "removed container");
    Ok(())
  }
}

/// Whether a `docker start -i` exit status is a normal end of the session.
///
/// `None` means the process was killed by a signal.
fn session_ended_cleanly(code: Option<i32>) -> bool {
  code.is_some_and(|code| CLEAN_EXIT_CODES.contains(&code))
}

/// Map a bollard error to an [`EngineError`], recognising missing images.
///
/// A 404 from the daemon is authoritative. Pull failures that arrive as text
/// fall back to [`looks_like_not_found`].
fn classify(operation: &'static str, reference: &str, err: BollardError) -> EngineError {
  match err {
    BollardError::DockerResponseServerError {
      status_code: 404,
      message,
    } => EngineError::NotFound {
      reference: reference.to_string(),
      message,
    },
    BollardError::DockerResponseServerError { message, .. } | BollardError::DockerStreamError { error: message }
      if operation == "pull" && looks_like_not_found(&message) =>
    {
      EngineError::NotFound {
        reference: reference.to_string(),
        message,
      }
    }
    other => EngineError::Api {
      operation,
      message: other.to_string(),
    },
  }
}

/// Split `repo[:tag]` into its repository and tag, defaulting the tag to `latest`.
///
/// A colon before the last `/` belongs to a registry port. Digest references
/// are passed through whole with an empty tag.
fn split_reference(reference: &str) -> (&str, &str) {
  if reference.contains('@') {
    return (reference, "");
  }

  let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
  match reference[name_start..].rfind(':') {
    Some(i) => {
      let split = name_start + i;
      (&reference[..split], &reference[split + 1..])
    }
    None => (reference, IMAGE_TAG),
  }
}

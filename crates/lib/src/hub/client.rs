use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{HubError, LoginSession, RegistryApi};
use crate::consts::APP_NAME;
use crate::paths;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on followed `next` links, in case a server loops.
const MAX_PAGES: usize = 50;

/// Blocking client for the Docker Hub v2 HTTP API.
#[derive(Debug, Clone)]
pub struct HubClient {
  base_url: String,
  http: Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
  username: &'a str,
  password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
  token: String,
}

#[derive(Deserialize)]
struct RepositoryPage {
  #[serde(default)]
  next: Option<String>,
  #[serde(default)]
  results: Vec<Repository>,
}

#[derive(Deserialize)]
struct Repository {
  name: String,
}

impl HubClient {
  /// Client for the configured registry (`DEVDROP_HUB_URL` or Docker Hub).
  pub fn new() -> Result<Self, HubError> {
    Self::with_base_url(&paths::hub_url())
  }

  pub fn with_base_url(base_url: &str) -> Result<Self, HubError> {
    let http = Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .user_agent(format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| HubError::Http {
        url: base_url.to_string(),
        source: e,
      })?;

    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      http,
    })
  }

  fn fetch_page(&self, url: &str) -> Result<RepositoryPage, HubError> {
    let response = self.http.get(url).send().map_err(|e| HubError::Http {
      url: url.to_string(),
      source: e,
    })?;

    if !response.status().is_success() {
      return Err(HubError::Status {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    response.json().map_err(|e| HubError::Decode {
      url: url.to_string(),
      source: e,
    })
  }
}

impl RegistryApi for HubClient {
  fn login(&self, username: &str, password: &str) -> Result<LoginSession, HubError> {
    let url = format!("{}/v2/users/login/", self.base_url);
    debug!(%url, %username, "logging in to registry");

    let response = self
      .http
      .post(&url)
      .json(&LoginRequest { username, password })
      .send()
      .map_err(|e| HubError::Http {
        url: url.clone(),
        source: e,
      })?;

    match response.status() {
      status if status.is_success() => {}
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(HubError::InvalidCredentials),
      status => {
        return Err(HubError::Status {
          url,
          status: status.as_u16(),
        });
      }
    }

    let body: LoginResponse = response.json().map_err(|e| HubError::Decode { url, source: e })?;
    Ok(LoginSession {
      username: username.to_string(),
      token: body.token,
    })
  }

  fn list_repositories(&self, username: &str, prefix: &str) -> Result<Vec<String>, HubError> {
    let mut next = Some(format!("{}/v2/repositories/{}/?page_size=100", self.base_url, username));
    let mut names = Vec::new();
    let mut pages = 0;

    while let Some(url) = next.take() {
      if pages == MAX_PAGES {
        warn!(%username, pages, "stopped following repository pages");
        break;
      }
      let page = self.fetch_page(&url)?;
      pages += 1;

      names.extend(
        page
          .results
          .into_iter()
          .map(|repo| repo.name)
          .filter(|name| name.starts_with(prefix)),
      );
      next = page.next.filter(|n| !n.is_empty());
    }

    names.sort();
    names.dedup();
    debug!(%username, count = names.len(), pages, "listed registry repositories");
    Ok(names)
  }
}

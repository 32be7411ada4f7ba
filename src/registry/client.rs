//! Registry read API clients
//!
//! Each client answers one question: is this exact version of a package visible
//! in the registry right now? Nothing is cached; the availability poll relies on
//! every call observing fresh registry state.

use crate::core::error::RegistryError;
use crate::manifest::{parse_version, same_version};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const CRATES_IO_URL: &str = "https://crates.io";
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// crates.io rejects requests without an identifying user agent
pub const USER_AGENT: &str = concat!(
  env!("CARGO_PKG_NAME"),
  "/",
  env!("CARGO_PKG_VERSION"),
  " (release automation)"
);

const FOUND: u16 = 200;
const NOT_FOUND: u16 = 404;

/// Status and body of a GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

/// Minimal HTTP seam; `Err` carries a transport failure description
pub trait Transport {
  fn get(&self, url: &str) -> Result<HttpResponse, String>;

  /// Status of a GET request whose body is never read
  fn status(&self, url: &str) -> Result<u16, String>;
}

/// Blocking reqwest transport
pub struct HttpTransport {
  client: reqwest::blocking::Client,
}

impl HttpTransport {
  pub fn new() -> Result<Self, RegistryError> {
    let client = reqwest::blocking::Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| RegistryError::Transport {
        url: String::new(),
        reason: format!("failed to create HTTP client: {}", e),
      })?;
    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  fn get(&self, url: &str) -> Result<HttpResponse, String> {
    tracing::debug!("GET {}", url);
    let response = self.client.get(url).send().map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    // Only 200 bodies are parsed; skip downloading anything else
    let body = if status == FOUND {
      response.bytes().map_err(|e| e.to_string())?.to_vec()
    } else {
      Vec::new()
    };
    Ok(HttpResponse { status, body })
  }

  fn status(&self, url: &str) -> Result<u16, String> {
    tracing::debug!("GET {} (status only)", url);
    let response = self.client.get(url).send().map_err(|e| e.to_string())?;
    // Dropping the response abandons the body
    Ok(response.status().as_u16())
  }
}

/// Versions a registry reports for one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryPackageSnapshot {
  /// Published versions with their tarball location when the registry has one
  pub versions: Vec<(Version, Option<String>)>,
}

impl RegistryPackageSnapshot {
  /// First entry semver-equal to `version`
  pub fn find(&self, version: &Version) -> Option<&(Version, Option<String>)> {
    self.versions.iter().find(|(v, _)| same_version(v, version))
  }
}

/// Reports whether an exact package version is visible
pub trait RegistryClient {
  fn version_exists(&self, name: &str, version: &Version) -> Result<bool, RegistryError>;
}

fn fetch(transport: &dyn Transport, url: &str) -> Result<HttpResponse, RegistryError> {
  transport.get(url).map_err(|reason| RegistryError::Transport {
    url: url.to_string(),
    reason,
  })
}

fn malformed(url: &str, reason: impl ToString) -> RegistryError {
  RegistryError::MalformedBody {
    url: url.to_string(),
    reason: reason.to_string(),
  }
}

/// crates.io-style registry (`GET /api/v1/crates/<name>`)
pub struct CratesIoClient<T> {
  transport: T,
  base_url: String,
}

#[derive(Deserialize)]
struct CrateMetadata {
  versions: Vec<CrateVersion>,
}

#[derive(Deserialize)]
struct CrateVersion {
  num: String,
}

impl<T: Transport> CratesIoClient<T> {
  pub fn new(transport: T, base_url: impl Into<String>) -> Self {
    Self {
      transport,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  pub fn crate_url(&self, name: &str) -> String {
    format!("{}/api/v1/crates/{}", self.base_url, name)
  }

  /// `None` when the crate is unknown to the registry
  pub fn snapshot(&self, name: &str) -> Result<Option<RegistryPackageSnapshot>, RegistryError> {
    let url = self.crate_url(name);
    let response = fetch(&self.transport, &url)?;

    match response.status {
      FOUND => {
        let metadata: CrateMetadata = serde_json::from_slice(&response.body).map_err(|e| malformed(&url, e))?;
        let versions = metadata
          .versions
          .iter()
          .map(|v| parse_version(&v.num).map(|parsed| (parsed, None)))
          .collect::<Result<Vec<_>, _>>()
          .map_err(|e| malformed(&url, e))?;
        Ok(Some(RegistryPackageSnapshot { versions }))
      }
      NOT_FOUND => Ok(None),
      status => Err(RegistryError::UnexpectedStatus { url, status }),
    }
  }
}

impl<T: Transport> RegistryClient for CratesIoClient<T> {
  fn version_exists(&self, name: &str, version: &Version) -> Result<bool, RegistryError> {
    Ok(
      self
        .snapshot(name)?
        .is_some_and(|snapshot| snapshot.find(version).is_some()),
    )
  }
}

/// npm-style registry (`GET /<name>`), confirming the tarball is downloadable
pub struct NpmRegistryClient<T> {
  transport: T,
  base_url: String,
}

#[derive(Deserialize)]
struct PackageMetadata {
  versions: BTreeMap<String, PackageVersion>,
}

#[derive(Deserialize)]
struct PackageVersion {
  dist: Dist,
}

#[derive(Deserialize)]
struct Dist {
  tarball: String,
}

impl<T: Transport> NpmRegistryClient<T> {
  pub fn new(transport: T, base_url: impl Into<String>) -> Self {
    Self {
      transport,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// Scoped names keep their `@` with the scope separator escaped
  pub fn package_url(&self, name: &str) -> String {
    format!("{}/{}", self.base_url, name.replace('/', "%2F"))
  }

  /// `None` when the package is unknown to the registry
  pub fn snapshot(&self, name: &str) -> Result<Option<RegistryPackageSnapshot>, RegistryError> {
    let url = self.package_url(name);
    let response = fetch(&self.transport, &url)?;

    match response.status {
      FOUND => {
        let metadata: PackageMetadata = serde_json::from_slice(&response.body).map_err(|e| malformed(&url, e))?;
        let mut versions = Vec::with_capacity(metadata.versions.len());
        for (literal, entry) in metadata.versions {
          let version = parse_version(&literal).map_err(|e| malformed(&url, e))?;
          reqwest::Url::parse(&entry.dist.tarball)
            .map_err(|e| malformed(&url, format!("invalid tarball URL for {}: {}", literal, e)))?;
          versions.push((version, Some(entry.dist.tarball)));
        }
        Ok(Some(RegistryPackageSnapshot { versions }))
      }
      NOT_FOUND => Ok(None),
      status => Err(RegistryError::UnexpectedStatus { url, status }),
    }
  }
}

impl<T: Transport> RegistryClient for NpmRegistryClient<T> {
  fn version_exists(&self, name: &str, version: &Version) -> Result<bool, RegistryError> {
    let Some(snapshot) = self.snapshot(name)? else {
      return Ok(false);
    };
    let Some((_, Some(tarball))) = snapshot.find(version) else {
      return Ok(false);
    };

    // Metadata can list a version before the CDN serves its tarball
    let status = self.transport.status(tarball).map_err(|reason| RegistryError::Transport {
      url: tarball.clone(),
      reason,
    })?;
    match status {
      FOUND => Ok(true),
      NOT_FOUND => Ok(false),
      status => Err(RegistryError::UnexpectedStatus {
        url: tarball.clone(),
        status,
      }),
    }
  }
}

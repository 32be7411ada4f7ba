//! Registry backends
//!
//! The release sequence is written once against [`RegistryBackend`]; each
//! registry supplies its native tooling commands and its read API client.
//!
//! Currently supports:
//! - Cargo (crates.io)
//! - npm (registry.npmjs.org)

pub mod cargo;
pub mod client;
pub mod npm;

use crate::core::error::{ReleaseError, ReleaseResult, ValidationError};
use crate::manifest::{DependencyCategory, Manifest};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
  Cargo,
  Npm,
}

impl RegistryKind {
  pub fn as_str(self) -> &'static str {
    match self {
      RegistryKind::Cargo => "cargo",
      RegistryKind::Npm => "npm",
    }
  }

  pub fn manifest_filename(self) -> &'static str {
    match self {
      RegistryKind::Cargo => "Cargo.toml",
      RegistryKind::Npm => "package.json",
    }
  }

  pub fn lockfile_filename(self) -> &'static str {
    match self {
      RegistryKind::Cargo => "Cargo.lock",
      RegistryKind::Npm => "package-lock.json",
    }
  }

  /// Manifest section names, in linking order
  pub fn sections(self) -> &'static [(DependencyCategory, &'static str)] {
    match self {
      RegistryKind::Cargo => crate::manifest::cargo::SECTIONS,
      RegistryKind::Npm => crate::manifest::node::SECTIONS,
    }
  }

  pub fn section_name(self, category: DependencyCategory) -> Option<&'static str> {
    self
      .sections()
      .iter()
      .find(|(c, _)| *c == category)
      .map(|(_, name)| *name)
  }

  pub fn supports(self, category: DependencyCategory) -> bool {
    self.section_name(category).is_some()
  }

  pub fn default_url(self) -> &'static str {
    match self {
      RegistryKind::Cargo => client::CRATES_IO_URL,
      RegistryKind::Npm => client::NPM_REGISTRY_URL,
    }
  }

  /// Detect the registry from the manifest present in `project_root`
  ///
  /// Tries Cargo first, then npm.
  pub fn detect(project_root: &Path) -> ReleaseResult<Self> {
    [RegistryKind::Cargo, RegistryKind::Npm]
      .into_iter()
      .find(|kind| project_root.join(kind.manifest_filename()).is_file())
      .ok_or_else(|| {
        ReleaseError::with_help(
          format!("Could not detect the package registry for {}", project_root.display()),
          "Supported: Cargo (Cargo.toml), npm (package.json). Pass --registry to choose explicitly.",
        )
      })
  }
}

impl fmt::Display for RegistryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RegistryKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "cargo" => Ok(RegistryKind::Cargo),
      "npm" => Ok(RegistryKind::Npm),
      other => Err(format!("unknown registry '{}' (expected cargo or npm)", other)),
    }
  }
}

/// Credential handed to the publish command
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
  /// API token supplied through the environment
  Token(String),
  /// Credentials already configured for the tool (e.g. ~/.npmrc)
  Ambient,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Credentials::Token(_) => f.write_str("Token(***)"),
      Credentials::Ambient => f.write_str("Ambient"),
    }
  }
}

/// Capabilities the release sequence needs from a registry
///
/// Mutating methods shell out to the registry's native tool from the project
/// root and fail with [`ReleaseError::RegistryCommand`].
pub trait RegistryBackend {
  fn kind(&self) -> RegistryKind;

  /// Supported dependency categories, in linking order
  fn categories(&self) -> Vec<DependencyCategory> {
    self.kind().sections().iter().map(|(c, _)| *c).collect()
  }

  fn parse_manifest(&self, path: &Path, content: &str) -> ReleaseResult<Manifest> {
    match self.kind() {
      RegistryKind::Cargo => crate::manifest::cargo::parse(path, content),
      RegistryKind::Npm => crate::manifest::node::parse(path, content),
    }
  }

  /// Validate and extract the publish credential from the environment
  fn credentials(&self, env: &dyn Fn(&str) -> Option<String>) -> ReleaseResult<Credentials>;

  /// Whether `name@version` is visible in the registry
  fn version_exists(&self, name: &str, version: &Version) -> ReleaseResult<bool>;

  /// Pin dependency `name` in `category` to exactly `version`
  fn set_dependency_version(
    &self,
    project_root: &Path,
    category: DependencyCategory,
    name: &str,
    version: &Version,
  ) -> ReleaseResult<()>;

  /// Re-apply a local path override on `name` after its version was set
  fn reassert_dependency_path(
    &self,
    project_root: &Path,
    category: DependencyCategory,
    name: &str,
    path: &str,
  ) -> ReleaseResult<()>;

  /// Set the package's own version
  fn set_own_version(&self, project_root: &Path, version: &Version) -> ReleaseResult<()>;

  /// Publish the package
  fn publish(&self, project_root: &Path, credentials: &Credentials) -> ReleaseResult<()>;
}

/// First non-empty value among `variables`, or a validation error naming the first
pub(crate) fn required_env(env: &dyn Fn(&str) -> Option<String>, variables: &[&str]) -> ReleaseResult<String> {
  variables
    .iter()
    .find_map(|name| env(name).filter(|v| !v.trim().is_empty()))
    .ok_or_else(|| {
      ValidationError::Environment {
        variable: variables.first().copied().unwrap_or_default().to_string(),
        reason: if variables.len() > 1 {
          format!("is not set (also checked: {})", variables[1..].join(", "))
        } else {
          "is not set".to_string()
        },
      }
      .into()
    })
}

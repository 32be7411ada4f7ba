//! npm backend
//!
//! Native commands:
//! - `npm install --save[-dev|-optional|-peer] <name>@<version>` pins a dependency
//! - `npm install <flag> file:<path>` restores a local path specifier
//! - `npm version <version> --no-git-tag-version` sets the package version
//!   (the commit is made by the release gate, not by npm)
//! - `npm publish --access public` with credentials from the user's npm config

use super::client::{NpmRegistryClient, RegistryClient, Transport};
use super::{Credentials, RegistryBackend, RegistryKind};
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::shell::{Shell, ShellCommand};
use crate::manifest::DependencyCategory;
use semver::Version;
use std::path::Path;

pub struct NpmBackend<'a, T> {
  shell: &'a dyn Shell,
  client: NpmRegistryClient<T>,
}

impl<'a, T: Transport> NpmBackend<'a, T> {
  pub fn new(shell: &'a dyn Shell, client: NpmRegistryClient<T>) -> Self {
    Self { shell, client }
  }

  fn npm(&self, project_root: &Path, command: ShellCommand) -> ReleaseResult<()> {
    self
      .shell
      .run(&command.current_dir(project_root))
      .map(|_| ())
      .map_err(ReleaseError::RegistryCommand)
  }
}

/// `npm install` flag selecting the package.json section
fn save_flag(category: DependencyCategory) -> ReleaseResult<&'static str> {
  match category {
    DependencyCategory::Runtime => Ok("--save"),
    DependencyCategory::Dev => Ok("--save-dev"),
    DependencyCategory::Optional => Ok("--save-optional"),
    DependencyCategory::Peer => Ok("--save-peer"),
    DependencyCategory::Build => Err(ReleaseError::message("npm has no build dependency section")),
  }
}

impl<T: Transport> RegistryBackend for NpmBackend<'_, T> {
  fn kind(&self) -> RegistryKind {
    RegistryKind::Npm
  }

  fn credentials(&self, _env: &dyn Fn(&str) -> Option<String>) -> ReleaseResult<Credentials> {
    Ok(Credentials::Ambient)
  }

  fn version_exists(&self, name: &str, version: &Version) -> ReleaseResult<bool> {
    Ok(self.client.version_exists(name, version)?)
  }

  fn set_dependency_version(
    &self,
    project_root: &Path,
    category: DependencyCategory,
    name: &str,
    version: &Version,
  ) -> ReleaseResult<()> {
    let command = ShellCommand::new("npm")
      .args(["install", save_flag(category)?])
      .arg(format!("{}@{}", name, version));
    self.npm(project_root, command)
  }

  fn reassert_dependency_path(
    &self,
    project_root: &Path,
    category: DependencyCategory,
    _name: &str,
    path: &str,
  ) -> ReleaseResult<()> {
    let command = ShellCommand::new("npm")
      .args(["install", save_flag(category)?])
      .arg(format!("file:{}", path));
    self.npm(project_root, command)
  }

  fn set_own_version(&self, project_root: &Path, version: &Version) -> ReleaseResult<()> {
    let command = ShellCommand::new("npm")
      .arg("version")
      .arg(version.to_string())
      .arg("--no-git-tag-version");
    self.npm(project_root, command)
  }

  fn publish(&self, project_root: &Path, _credentials: &Credentials) -> ReleaseResult<()> {
    self.npm(project_root, ShellCommand::new("npm").args(["publish", "--access", "public"]))
  }
}

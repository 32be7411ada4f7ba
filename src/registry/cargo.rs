//! Cargo / crates.io backend
//!
//! Native commands:
//! - `cargo add [--build|--dev] <name>@<version>` pins a dependency
//! - `cargo add [--build|--dev] --path <path>` restores a path override that the
//!   previous `cargo add` dropped (rust-lang/cargo#14510)
//! - `cargo bump <version>` sets the package version
//! - `cargo publish` with the token in `CARGO_REGISTRY_TOKEN`

use super::client::{CratesIoClient, RegistryClient, Transport};
use super::{Credentials, RegistryBackend, RegistryKind, required_env};
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::shell::{Shell, ShellCommand};
use crate::manifest::DependencyCategory;
use semver::Version;
use std::path::Path;

/// Token variables, preferred first
pub const TOKEN_VARIABLES: &[&str] = &["CARGO_REGISTRY_TOKEN", "CARGO_TOKEN"];

pub struct CargoBackend<'a, T> {
  shell: &'a dyn Shell,
  client: CratesIoClient<T>,
}

impl<'a, T: Transport> CargoBackend<'a, T> {
  pub fn new(shell: &'a dyn Shell, client: CratesIoClient<T>) -> Self {
    Self { shell, client }
  }

  fn cargo(&self, project_root: &Path, command: ShellCommand) -> ReleaseResult<()> {
    self
      .shell
      .run(&command.current_dir(project_root))
      .map(|_| ())
      .map_err(ReleaseError::RegistryCommand)
  }
}

/// `cargo add` flag selecting the manifest section
fn section_flag(category: DependencyCategory) -> ReleaseResult<Option<&'static str>> {
  match category {
    DependencyCategory::Runtime => Ok(None),
    DependencyCategory::Build => Ok(Some("--build")),
    DependencyCategory::Dev => Ok(Some("--dev")),
    other => Err(ReleaseError::message(format!(
      "cargo has no {} dependency section",
      other
    ))),
  }
}

impl<T: Transport> RegistryBackend for CargoBackend<'_, T> {
  fn kind(&self) -> RegistryKind {
    RegistryKind::Cargo
  }

  fn credentials(&self, env: &dyn Fn(&str) -> Option<String>) -> ReleaseResult<Credentials> {
    required_env(env, TOKEN_VARIABLES).map(Credentials::Token)
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
    let command = ShellCommand::new("cargo")
      .arg("add")
      .args(section_flag(category)?)
      .arg(format!("{}@{}", name, version));
    self.cargo(project_root, command)
  }

  fn reassert_dependency_path(
    &self,
    project_root: &Path,
    category: DependencyCategory,
    _name: &str,
    path: &str,
  ) -> ReleaseResult<()> {
    let command = ShellCommand::new("cargo")
      .arg("add")
      .args(section_flag(category)?)
      .args(["--path", path]);
    self.cargo(project_root, command)
  }

  fn set_own_version(&self, project_root: &Path, version: &Version) -> ReleaseResult<()> {
    self.cargo(project_root, ShellCommand::new("cargo").args(["bump".to_string(), version.to_string()]))
  }

  fn publish(&self, project_root: &Path, credentials: &Credentials) -> ReleaseResult<()> {
    let mut command = ShellCommand::new("cargo").arg("publish");
    if let Credentials::Token(token) = credentials {
      command = command.secret_env(TOKEN_VARIABLES[0], token.as_str());
    }
    self.cargo(project_root, command)
  }
}

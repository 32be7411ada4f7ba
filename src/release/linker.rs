//! Dependency linking
//!
//! Linking is split into a pure [`plan`] that validates the configured link
//! sets against the manifest, and [`apply`] which drives the backend. Nothing
//! is mutated unless the whole plan validates.

use crate::core::error::{ConfigError, ReleaseResult};
use crate::manifest::{DependencyCategory, Manifest};
use crate::registry::RegistryBackend;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One dependency to repin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStep {
  pub category: DependencyCategory,
  pub name: String,
  /// Path override to restore after the version is set
  pub path: Option<String>,
}

/// Validate link sets against the manifest and order them
///
/// Categories follow `categories` (the backend's linking order); names within
/// a category are sorted. Empty sets are ignored even when the manifest lacks
/// the section.
pub fn plan(
  manifest: &Manifest,
  categories: &[DependencyCategory],
  section_name: impl Fn(DependencyCategory) -> String,
  linked: &BTreeMap<DependencyCategory, BTreeSet<String>>,
) -> ReleaseResult<Vec<LinkStep>> {
  let mut steps = Vec::new();

  for &category in categories {
    let Some(names) = linked.get(&category).filter(|n| !n.is_empty()) else {
      continue;
    };

    if manifest.section(category).is_none() {
      return Err(
        ConfigError::CategoryMissing {
          section: section_name(category),
          manifest_path: manifest.path.clone(),
          count: names.len(),
        }
        .into(),
      );
    }

    for name in names {
      let entry = manifest.dependency(category, name).ok_or_else(|| ConfigError::DependencyMissing {
        section: section_name(category),
        name: name.clone(),
        manifest_path: manifest.path.clone(),
      })?;

      steps.push(LinkStep {
        category,
        name: name.clone(),
        path: entry.path.clone(),
      });
    }
  }

  Ok(steps)
}

/// Pin every planned dependency to `version`, restoring path overrides
pub fn apply(
  backend: &dyn RegistryBackend,
  project_root: &Path,
  steps: &[LinkStep],
  version: &Version,
) -> ReleaseResult<()> {
  for step in steps {
    tracing::info!("Linking {} dependency {} to {}", step.category, step.name, version);
    backend.set_dependency_version(project_root, step.category, &step.name, version)?;

    if let Some(path) = &step.path {
      tracing::debug!("Restoring path override {} for {}", path, step.name);
      backend.reassert_dependency_path(project_root, step.category, &step.name, path)?;
    }
  }
  Ok(())
}

use crate::core::error::{ReleaseResult, ValidationError};
use crate::manifest::{DependencyCategory, parse_version};
use crate::registry::RegistryKind;
use semver::Version;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wait between availability checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default branch pushed by the push-tags step
pub const DEFAULT_BRANCH: &str = "master";

/// Project-level release configuration
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// # Example
///
/// ```toml
/// registry = "cargo"
/// release_version = "1.2.0"
///
/// [linked_dependencies]
/// runtime = ["shared-lib"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
  /// Registry to publish to (detected from the manifest when absent)
  #[serde(default)]
  pub registry: Option<RegistryKind>,

  #[serde(default)]
  pub release_version: Option<String>,

  /// Category name → dependency names; categories are checked during resolution
  #[serde(default)]
  pub linked_dependencies: BTreeMap<String, Vec<String>>,

  #[serde(default)]
  pub poll_interval_secs: Option<u64>,

  /// Registry base URL override (mirrors, private registries)
  #[serde(default)]
  pub registry_url: Option<String>,

  #[serde(default)]
  pub push_tags: PushTagsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushTagsConfig {
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub push_remote: Option<String>,
  #[serde(default)]
  pub branch: Option<String>,
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load the project's config, or defaults when there is none
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let problem = |reason: String| ValidationError::Options {
      problems: vec![format!("{}: {}", config_path.display(), reason)],
    };

    let content = fs::read_to_string(&config_path).map_err(|e| problem(format!("could not read: {}", e)))?;
    toml_edit::de::from_str(&content).map_err(|e| problem(e.to_string()).into())
  }
}

/// Command-line values layered over the config file
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
  pub release_version: Option<String>,
  /// `category=name` pairs, added to the configured sets
  pub links: Vec<String>,
  pub poll_interval_secs: Option<u64>,
  pub registry_url: Option<String>,
}

/// Validated options for one publish run
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
  pub release_version: Version,
  /// Dependencies to pin to `release_version`, per category
  pub linked_dependencies: BTreeMap<DependencyCategory, BTreeSet<String>>,
  pub poll_interval: Duration,
  pub registry_url: String,
}

impl ReleaseOptions {
  /// Merge file and command line, checking everything before failing
  pub fn resolve(config: &ReleaseConfig, overrides: &OptionOverrides, registry: RegistryKind) -> ReleaseResult<Self> {
    let mut problems = Vec::new();

    let release_version = match overrides.release_version.as_ref().or(config.release_version.as_ref()) {
      None => {
        problems.push("release_version is required (set it in release.toml or pass --release-version)".to_string());
        None
      }
      Some(literal) => parse_version(literal)
        .map_err(|e| problems.push(format!("release_version: {}", e)))
        .ok(),
    };

    let cli_links = overrides.links.iter().filter_map(|pair| match pair.split_once('=') {
      Some((category, name)) => Some((category.trim().to_string(), name.trim().to_string())),
      None => {
        problems.push(format!("--link '{}' must look like <category>=<name>", pair));
        None
      }
    });
    let cli_links: Vec<_> = cli_links.collect();

    let file_links = config
      .linked_dependencies
      .iter()
      .flat_map(|(category, names)| names.iter().map(move |name| (category.clone(), name.clone())));

    let mut linked_dependencies: BTreeMap<DependencyCategory, BTreeSet<String>> = BTreeMap::new();
    for (category, name) in file_links.chain(cli_links) {
      let category = match category.parse::<DependencyCategory>() {
        Ok(c) => c,
        Err(e) => {
          problems.push(format!("linked_dependencies: {}", e));
          continue;
        }
      };
      if !registry.supports(category) {
        problems.push(format!(
          "linked_dependencies: {} has no {} dependency section (linked: {})",
          registry, category, name
        ));
        continue;
      }
      if name.is_empty() {
        problems.push(format!("linked_dependencies.{}: dependency names must not be empty", category));
        continue;
      }
      linked_dependencies.entry(category).or_default().insert(name);
    }

    let poll_interval = match overrides.poll_interval_secs.or(config.poll_interval_secs) {
      Some(0) => {
        problems.push("poll_interval_secs must be greater than zero".to_string());
        DEFAULT_POLL_INTERVAL
      }
      Some(secs) => Duration::from_secs(secs),
      None => DEFAULT_POLL_INTERVAL,
    };

    let registry_url = overrides
      .registry_url
      .clone()
      .or_else(|| config.registry_url.clone())
      .unwrap_or_else(|| registry.default_url().to_string());
    if reqwest::Url::parse(&registry_url).is_err() {
      problems.push(format!("registry_url '{}' is not a valid URL", registry_url));
    }

    match release_version {
      Some(release_version) if problems.is_empty() => Ok(Self {
        release_version,
        linked_dependencies,
        poll_interval,
        registry_url,
      }),
      _ => Err(ValidationError::Options { problems }.into()),
    }
  }
}

/// Validated options for the push-tags step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTagsOptions {
  /// Tags to create, in order, without duplicates
  pub tags: Vec<String>,
  pub push_remote: Option<String>,
  pub branch: String,
}

impl PushTagsOptions {
  /// Command-line tags replace configured ones; remote and branch override individually
  pub fn resolve(
    config: &PushTagsConfig,
    tags: &[String],
    push_remote: Option<String>,
    branch: Option<String>,
  ) -> ReleaseResult<Self> {
    let mut problems = Vec::new();
    let source: &[String] = if tags.is_empty() { &config.tags } else { tags };

    let mut unique = Vec::with_capacity(source.len());
    for tag in source {
      let tag = tag.trim();
      if tag.is_empty() {
        problems.push("tags must not be empty".to_string());
      } else if !unique.iter().any(|t: &String| t == tag) {
        unique.push(tag.to_string());
      }
    }

    let push_remote = push_remote.or_else(|| config.push_remote.clone());
    if push_remote.as_deref().is_some_and(|r| r.trim().is_empty()) {
      problems.push("push_remote must not be empty".to_string());
    }

    let branch = branch
      .or_else(|| config.branch.clone())
      .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    if branch.trim().is_empty() {
      problems.push("branch must not be empty".to_string());
    }

    if !problems.is_empty() {
      return Err(ValidationError::Options { problems }.into());
    }

    Ok(Self {
      tags: unique,
      push_remote,
      branch,
    })
  }
}

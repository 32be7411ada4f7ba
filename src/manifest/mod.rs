//! Typed view of a package manifest
//!
//! Only the fields the release sequence needs are modelled: package name,
//! current version and the dependency sections that can be version linked.
//! Parsers collect every structural problem before failing so a broken
//! manifest is fixed in one round trip.

pub mod cargo;
pub mod node;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use semver::Version;

/// Dependency section kinds across registries
///
/// Cargo uses runtime/build/dev, npm uses runtime/dev/optional/peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyCategory {
  Runtime,
  Build,
  Dev,
  Optional,
  Peer,
}

impl DependencyCategory {
  pub const ALL: [DependencyCategory; 5] = [
    DependencyCategory::Runtime,
    DependencyCategory::Build,
    DependencyCategory::Dev,
    DependencyCategory::Optional,
    DependencyCategory::Peer,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      DependencyCategory::Runtime => "runtime",
      DependencyCategory::Build => "build",
      DependencyCategory::Dev => "dev",
      DependencyCategory::Optional => "optional",
      DependencyCategory::Peer => "peer",
    }
  }
}

impl fmt::Display for DependencyCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DependencyCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    DependencyCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| {
        format!(
          "unknown dependency category '{}' (expected one of: runtime, build, dev, optional, peer)",
          s
        )
      })
  }
}

/// A single dependency declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyEntry {
  /// Version requirement, e.g. `^1.2` or `1.0.0`
  pub version_req: Option<String>,
  /// Local path override for in-repo dependencies
  pub path: Option<String>,
}

impl DependencyEntry {
  pub fn version(req: impl Into<String>) -> Self {
    Self {
      version_req: Some(req.into()),
      path: None,
    }
  }
}

pub type DependencyTable = BTreeMap<String, DependencyEntry>;

/// Validated manifest contents
#[derive(Debug, Clone)]
pub struct Manifest {
  /// Where the manifest was read from
  pub path: PathBuf,
  pub name: String,
  pub version: Version,
  /// Sections present in the manifest; a missing key means the section is not declared
  sections: BTreeMap<DependencyCategory, DependencyTable>,
}

impl Manifest {
  pub fn new(path: impl AsRef<Path>, name: impl Into<String>, version: Version) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
      name: name.into(),
      version,
      sections: BTreeMap::new(),
    }
  }

  /// Declare a section (possibly empty)
  pub fn with_section(mut self, category: DependencyCategory, table: DependencyTable) -> Self {
    self.sections.insert(category, table);
    self
  }

  /// The section for `category`, or `None` when the manifest does not declare it
  pub fn section(&self, category: DependencyCategory) -> Option<&DependencyTable> {
    self.sections.get(&category)
  }

  pub fn dependency(&self, category: DependencyCategory, name: &str) -> Option<&DependencyEntry> {
    self.section(category).and_then(|t| t.get(name))
  }
}

/// Parse a semantic version, naming the offending literal on failure
pub fn parse_version(literal: &str) -> Result<Version, String> {
  Version::parse(literal.trim()).map_err(|e| format!("could not parse version \"{}\": {}", literal, e))
}

/// Semantic-version equality: build metadata does not take part
pub fn same_version(a: &Version, b: &Version) -> bool {
  a.cmp_precedence(b).is_eq()
}

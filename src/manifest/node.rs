//! package.json parsing

use super::{DependencyCategory, DependencyEntry, DependencyTable, Manifest, parse_version};
use crate::core::error::{ReleaseResult, ValidationError};
use serde_json::Value;
use std::path::Path;

/// Manifest sections and the category each maps to
pub const SECTIONS: &[(DependencyCategory, &str)] = &[
  (DependencyCategory::Runtime, "dependencies"),
  (DependencyCategory::Optional, "optionalDependencies"),
  (DependencyCategory::Dev, "devDependencies"),
  (DependencyCategory::Peer, "peerDependencies"),
];

/// Specifier prefixes that point at a local directory
const LOCAL_PREFIXES: &[&str] = &["file:", "link:"];

/// Parse a package.json, reporting every problem found
pub fn parse(path: &Path, content: &str) -> ReleaseResult<Manifest> {
  let json: Value = serde_json::from_str(content).map_err(|e| ValidationError::Manifest {
    path: path.to_path_buf(),
    problems: vec![format!("invalid JSON: {}", e)],
  })?;

  let Some(root) = json.as_object() else {
    return Err(
      ValidationError::Manifest {
        path: path.to_path_buf(),
        problems: vec!["expected a JSON object".to_string()],
      }
      .into(),
    );
  };

  let mut problems = Vec::new();

  let name = match root.get("name") {
    None => {
      problems.push("missing name".to_string());
      None
    }
    Some(Value::String(n)) if !n.is_empty() => Some(n.clone()),
    Some(Value::String(_)) => {
      problems.push("name must not be empty".to_string());
      None
    }
    Some(_) => {
      problems.push("name must be a string".to_string());
      None
    }
  };

  let version = match root.get("version") {
    None => {
      problems.push("missing version".to_string());
      None
    }
    Some(Value::String(literal)) => parse_version(literal)
      .map_err(|e| problems.push(format!("version: {}", e)))
      .ok(),
    Some(_) => {
      problems.push("version must be a string".to_string());
      None
    }
  };

  let mut sections = Vec::new();
  for (category, key) in SECTIONS {
    let Some(value) = root.get(*key) else {
      continue;
    };
    let Some(object) = value.as_object() else {
      problems.push(format!("{} must be an object", key));
      continue;
    };

    let mut entries = DependencyTable::new();
    for (dep_name, spec) in object {
      match spec.as_str() {
        Some("") => problems.push(format!("{}.{}: version requirement must not be empty", key, dep_name)),
        Some(spec) => {
          entries.insert(dep_name.clone(), parse_entry(spec));
        }
        None => problems.push(format!("{}.{}: expected a version string", key, dep_name)),
      }
    }
    sections.push((*category, entries));
  }

  match (name, version) {
    (Some(name), Some(version)) if problems.is_empty() => Ok(
      sections
        .into_iter()
        .fold(Manifest::new(path, name, version), |m, (category, table)| {
          m.with_section(category, table)
        }),
    ),
    _ => Err(
      ValidationError::Manifest {
        path: path.to_path_buf(),
        problems,
      }
      .into(),
    ),
  }
}

fn parse_entry(spec: &str) -> DependencyEntry {
  let path = LOCAL_PREFIXES
    .iter()
    .find_map(|prefix| spec.strip_prefix(prefix))
    .map(str::to_string);

  DependencyEntry {
    version_req: Some(spec.to_string()),
    path,
  }
}

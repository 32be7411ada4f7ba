//! Cargo.toml parsing

use super::{DependencyCategory, DependencyEntry, DependencyTable, Manifest, parse_version};
use crate::core::error::{ReleaseResult, ValidationError};
use std::path::Path;
use toml_edit::{DocumentMut, Item};

/// Manifest sections and the category each maps to
pub const SECTIONS: &[(DependencyCategory, &str)] = &[
  (DependencyCategory::Runtime, "dependencies"),
  (DependencyCategory::Build, "build-dependencies"),
  (DependencyCategory::Dev, "dev-dependencies"),
];

/// Parse a Cargo manifest, reporting every problem found
pub fn parse(path: &Path, content: &str) -> ReleaseResult<Manifest> {
  let doc: DocumentMut = content.parse().map_err(|e| ValidationError::Manifest {
    path: path.to_path_buf(),
    problems: vec![format!("invalid TOML: {}", e)],
  })?;

  let mut problems = Vec::new();
  let mut name = None;
  let mut version = None;

  match doc.get("package").and_then(Item::as_table_like) {
    None => problems.push("missing [package] table".to_string()),
    Some(package) => {
      match package.get("name").map(|item| item.as_str()) {
        None => problems.push("missing package.name".to_string()),
        Some(None) => problems.push("package.name must be a string".to_string()),
        Some(Some("")) => problems.push("package.name must not be empty".to_string()),
        Some(Some(n)) => name = Some(n.to_string()),
      }

      match package.get("version") {
        None => problems.push("missing package.version".to_string()),
        Some(item) => match item.as_str() {
          Some(literal) => match parse_version(literal) {
            Ok(v) => version = Some(v),
            Err(e) => problems.push(format!("package.version: {}", e)),
          },
          None if item.as_table_like().is_some_and(|t| t.contains_key("workspace")) => problems.push(
            "package.version is inherited from the workspace; a concrete version is required to publish".to_string(),
          ),
          None => problems.push("package.version must be a string".to_string()),
        },
      }
    }
  }

  let mut sections = Vec::new();
  for (category, key) in SECTIONS {
    let Some(item) = doc.get(key) else {
      continue;
    };
    let Some(table) = item.as_table_like() else {
      problems.push(format!("{} must be a table", key));
      continue;
    };

    let mut entries = DependencyTable::new();
    for (dep_name, dep) in table.iter() {
      match parse_entry(dep) {
        Ok(entry) => {
          entries.insert(dep_name.to_string(), entry);
        }
        Err(reason) => problems.push(format!("{}.{}: {}", key, dep_name, reason)),
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

/// A dependency is either `"1.0"` or a table with optional `version` and `path`
fn parse_entry(item: &Item) -> Result<DependencyEntry, String> {
  if let Some(req) = item.as_str() {
    if req.is_empty() {
      return Err("version requirement must not be empty".to_string());
    }
    return Ok(DependencyEntry::version(req));
  }

  let Some(table) = item.as_table_like() else {
    return Err("expected a version string or a table".to_string());
  };

  let mut entry = DependencyEntry::default();
  for (field, slot) in [("version", &mut entry.version_req), ("path", &mut entry.path)] {
    if let Some(value) = table.get(field) {
      match value.as_str() {
        Some("") => return Err(format!("{} must not be empty", field)),
        Some(s) => *slot = Some(s.to_string()),
        None => return Err(format!("{} must be a string", field)),
      }
    }
  }
  Ok(entry)
}

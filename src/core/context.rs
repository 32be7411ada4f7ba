//! Execution context for one release step
//!
//! Built once in main.rs from the command line and passed by reference to the
//! step that runs.

use crate::registry::RegistryKind;
use std::path::{Path, PathBuf};

/// Where the project lives inside the workspace
#[derive(Debug, Clone)]
pub struct ExecutionContext {
  /// Workspace (monorepo) root
  pub workspace_root: PathBuf,

  /// Project directory (absolute path)
  pub project_root: PathBuf,

  /// Project identifier used in commit and tag messages
  pub project_name: String,
}

impl ExecutionContext {
  /// Build a context; the project name defaults to the project directory name
  pub fn new(workspace_root: &Path, project_root: &Path, project_name: Option<String>) -> Self {
    let project_root = if project_root.is_absolute() {
      project_root.to_path_buf()
    } else {
      workspace_root.join(project_root)
    };
    let project_name = project_name.unwrap_or_else(|| {
      project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
    });

    Self {
      workspace_root: workspace_root.to_path_buf(),
      project_root,
      project_name,
    }
  }

  pub fn manifest_path(&self, kind: RegistryKind) -> PathBuf {
    self.project_root.join(kind.manifest_filename())
  }

  /// Lockfile touched by the native commands
  ///
  /// The project's own lockfile when present, else the workspace lockfile,
  /// else none.
  pub fn lockfile_path(&self, kind: RegistryKind) -> Option<PathBuf> {
    [&self.project_root, &self.workspace_root]
      .into_iter()
      .map(|dir| dir.join(kind.lockfile_filename()))
      .find(|p| p.is_file())
  }
}

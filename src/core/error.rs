//! Error types for registry-release with contextual messages and exit codes
//!
//! Every failure aborts the run. Errors raised before the first mutating command
//! (validation, dirty worktree, configuration) are safe to fix and re-run; errors
//! raised later may leave a bumped manifest or a local commit behind, and the help
//! text says so.

use crate::core::shell::CommandError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for registry-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (options, environment, manifest, configuration)
  User = 1,
  /// System error (git, registry tooling, network, I/O)
  System = 2,
  /// Precondition failure (dirty worktree)
  Precondition = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for registry-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Bad options, environment or manifest shape
  Validation(ValidationError),

  /// Uncommitted changes in the workspace
  DirtyWorktree { root: PathBuf, changes: Vec<String> },

  /// Linked dependency category or name missing from the manifest
  Config(ConfigError),

  /// Git command failures
  Git(GitError),

  /// Native registry tool (cargo, npm) exited non-zero or could not start
  RegistryCommand(CommandError),

  /// Registry HTTP API failures
  Registry(RegistryError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional help
  Message { message: String, help: Option<String> },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      help: Some(help.into()),
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Validation(_) => ExitCode::User,
      ReleaseError::DirtyWorktree { .. } => ExitCode::Precondition,
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::RegistryCommand(_) => ExitCode::System,
      ReleaseError::Registry(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Validation(e) => e.help_message(),
      ReleaseError::DirtyWorktree { .. } => {
        Some("Commit or stash every change before releasing; `git status` shows what is pending.".to_string())
      }
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::RegistryCommand(_) => Some(
        "The manifest may already be bumped and committed locally. Check the registry before re-running; \
         a re-run skips publishing if the release version is already visible."
          .to_string(),
      ),
      ReleaseError::Registry(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Validation(e) => write!(f, "{}", e),
      ReleaseError::DirtyWorktree { root, changes } => {
        write!(f, "Worktree at {} is not clean, aborting", root.display())?;
        for change in changes {
          write!(f, "\n  {}", change)?;
        }
        Ok(())
      }
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::RegistryCommand(e) => write!(f, "Registry command failed: {}", e),
      ReleaseError::Registry(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, .. } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::RegistryCommand(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<ValidationError> for ReleaseError {
  fn from(err: ValidationError) -> Self {
    ReleaseError::Validation(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<RegistryError> for ReleaseError {
  fn from(err: RegistryError) -> Self {
    ReleaseError::Registry(err)
  }
}

/// Validation errors, all raised before any mutation
#[derive(Debug)]
pub enum ValidationError {
  /// Release options failed validation (every problem listed)
  Options { problems: Vec<String> },

  /// Required environment variable missing or empty
  Environment { variable: String, reason: String },

  /// Manifest failed structural validation (every problem listed)
  Manifest { path: PathBuf, problems: Vec<String> },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::Options { .. } => {
        Some("Check release.toml and the command-line flags; `registry-release publish --help` lists them.".to_string())
      }
      ValidationError::Environment { variable, .. } => Some(format!(
        "Export {} before running the release, e.g. from your CI secret store.",
        variable
      )),
      ValidationError::Manifest { .. } => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::Options { problems } => {
        write!(f, "Invalid release options:")?;
        for problem in problems {
          write!(f, "\n  - {}", problem)?;
        }
        Ok(())
      }
      ValidationError::Environment { variable, reason } => {
        write!(f, "Invalid environment: {} {}", variable, reason)
      }
      ValidationError::Manifest { path, problems } => {
        write!(f, "Invalid manifest {}:", path.display())?;
        for problem in problems {
          write!(f, "\n  - {}", problem)?;
        }
        Ok(())
      }
    }
  }
}

/// Linked dependency configuration does not match the manifest
#[derive(Debug)]
pub enum ConfigError {
  /// A non-empty link set targets a section the manifest does not declare
  CategoryMissing {
    section: String,
    manifest_path: PathBuf,
    count: usize,
  },

  /// A linked dependency is not declared in its section
  DependencyMissing {
    section: String,
    name: String,
    manifest_path: PathBuf,
  },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::CategoryMissing { section, .. } => Some(format!(
        "Declare the dependencies under \"{}\" or remove them from linked_dependencies.",
        section
      )),
      ConfigError::DependencyMissing { name, .. } => Some(format!(
        "Add '{}' to the manifest or remove it from linked_dependencies.",
        name
      )),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::CategoryMissing {
        section,
        manifest_path,
        count,
      } => write!(
        f,
        "no \"{}\" declared at {} and {} project(s) should be version linked in that section",
        section,
        manifest_path.display(),
        count
      ),
      ConfigError::DependencyMissing {
        section,
        name,
        manifest_path,
      } => write!(
        f,
        "\"{}.{}\" could not be found at {} and should be version linked",
        section,
        name,
        manifest_path.display()
      ),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { command, stderr } => {
        if command.contains(" commit ") && stderr.contains("nothing") {
          Some("Nothing was staged. A previous run may already have committed the version bump.".to_string())
        } else if stderr.contains("non-fast-forward") || stderr.contains("rejected") {
          Some("The remote has commits you don't have. Pull first, then re-run.".to_string())
        } else if stderr.contains("already exists") {
          Some("The tag already exists. Delete it or choose another tag name.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run from inside a git repository or pass --workspace-root: {}",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Registry HTTP API errors
#[derive(Debug)]
pub enum RegistryError {
  /// Status other than found/not-found
  UnexpectedStatus { url: String, status: u16 },

  /// Response body failed schema validation
  MalformedBody { url: String, reason: String },

  /// Request could not be completed
  Transport { url: String, reason: String },
}

impl RegistryError {
  fn help_message(&self) -> Option<String> {
    match self {
      RegistryError::UnexpectedStatus { status, .. } if *status == 429 || *status >= 500 => {
        Some("The registry is unavailable or rate limiting. Re-run once it recovers.".to_string())
      }
      RegistryError::Transport { .. } => Some("Check network access to the registry.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for RegistryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistryError::UnexpectedStatus { url, status } => {
        write!(f, "bad response status for {} ({})", url, status)
      }
      RegistryError::MalformedBody { url, reason } => {
        write!(f, "malformed registry response from {}: {}", url, reason)
      }
      RegistryError::Transport { url, reason } => {
        write!(f, "request to {} failed: {}", url, reason)
      }
    }
  }
}

/// Result type alias for registry-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

//! In-memory doubles for unit tests

use crate::core::error::ReleaseResult;
use crate::core::shell::{CommandError, Shell, ShellCommand, ShellOutput};
use crate::manifest::DependencyCategory;
use crate::registry::client::{HttpResponse, Transport};
use crate::registry::{Credentials, RegistryBackend, RegistryKind};
use semver::Version;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

enum Rule {
  Respond(String, String),
  Fail(String, String),
}

/// Records every command and answers from pattern rules (empty success by default)
pub struct RecordingShell {
  rules: Vec<Rule>,
  calls: RefCell<Vec<ShellCommand>>,
}

impl RecordingShell {
  pub fn new() -> Self {
    Self {
      rules: Vec::new(),
      calls: RefCell::new(Vec::new()),
    }
  }

  /// Succeed with `stdout` for commands whose display contains `pattern`
  pub fn respond(mut self, pattern: &str, stdout: &str) -> Self {
    self.rules.push(Rule::Respond(pattern.to_string(), stdout.to_string()));
    self
  }

  /// Fail with `stderr` for commands whose display contains `pattern`
  pub fn fail(mut self, pattern: &str, stderr: &str) -> Self {
    self.rules.push(Rule::Fail(pattern.to_string(), stderr.to_string()));
    self
  }

  pub fn commands(&self) -> Vec<String> {
    self.calls.borrow().iter().map(ShellCommand::display).collect()
  }

  pub fn invocations(&self) -> Vec<ShellCommand> {
    self.calls.borrow().clone()
  }
}

impl Shell for RecordingShell {
  fn run(&self, command: &ShellCommand) -> Result<ShellOutput, CommandError> {
    self.calls.borrow_mut().push(command.clone());
    let display = command.display();

    for rule in &self.rules {
      match rule {
        Rule::Respond(pattern, stdout) if display.contains(pattern.as_str()) => {
          return Ok(ShellOutput {
            stdout: stdout.clone(),
            stderr: String::new(),
          });
        }
        Rule::Fail(pattern, stderr) if display.contains(pattern.as_str()) => {
          return Err(CommandError {
            command: display,
            code: Some(1),
            stderr: stderr.clone(),
          });
        }
        _ => {}
      }
    }

    Ok(ShellOutput::default())
  }
}

/// Serves canned responses keyed by URL and records requested URLs
///
/// Full GETs and status-only GETs are recorded separately.
pub struct FakeTransport {
  responses: HashMap<String, (u16, String)>,
  requests: RefCell<Vec<String>>,
  status_requests: RefCell<Vec<String>>,
}

impl FakeTransport {
  pub fn new() -> Self {
    Self {
      responses: HashMap::new(),
      requests: RefCell::new(Vec::new()),
      status_requests: RefCell::new(Vec::new()),
    }
  }

  pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
    self.responses.insert(url.to_string(), (status, body.to_string()));
    self
  }

  pub fn requests(&self) -> Vec<String> {
    self.requests.borrow().clone()
  }

  pub fn status_requests(&self) -> Vec<String> {
    self.status_requests.borrow().clone()
  }
}

impl Transport for FakeTransport {
  fn get(&self, url: &str) -> Result<HttpResponse, String> {
    self.requests.borrow_mut().push(url.to_string());
    match self.responses.get(url) {
      Some((status, body)) => Ok(HttpResponse {
        status: *status,
        body: body.clone().into_bytes(),
      }),
      None => Err(format!("no canned response for {}", url)),
    }
  }

  fn status(&self, url: &str) -> Result<u16, String> {
    self.status_requests.borrow_mut().push(url.to_string());
    self
      .responses
      .get(url)
      .map(|(status, _)| *status)
      .ok_or_else(|| format!("no canned response for {}", url))
  }
}

/// Registry backend that records calls and reports scripted availability
///
/// `version_exists` answers from a queue of scripted results first, then from
/// the published set, which `publish` extends with `publishes_version`.
pub struct FakeBackend {
  kind: RegistryKind,
  published: RefCell<Vec<Version>>,
  scripted: RefCell<VecDeque<bool>>,
  publishes_version: Option<Version>,
  fail_publish: bool,
  calls: RefCell<Vec<String>>,
}

impl FakeBackend {
  pub fn new(kind: RegistryKind, published: &[&str]) -> Self {
    Self {
      kind,
      published: RefCell::new(published.iter().map(|v| Version::parse(v).unwrap()).collect()),
      scripted: RefCell::new(VecDeque::new()),
      publishes_version: None,
      fail_publish: false,
      calls: RefCell::new(Vec::new()),
    }
  }

  /// Make `publish` add `version` to the registry
  pub fn publishing(mut self, version: &str) -> Self {
    self.publishes_version = Some(Version::parse(version).unwrap());
    self
  }

  /// Answer the next `version_exists` calls with `answers`, in order
  pub fn scripted(self, answers: &[bool]) -> Self {
    self.scripted.borrow_mut().extend(answers.iter().copied());
    self
  }

  pub fn failing_publish(mut self) -> Self {
    self.fail_publish = true;
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  /// Calls other than registry lookups
  pub fn mutating_calls(&self) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter(|c| !c.starts_with("version_exists"))
      .collect()
  }

  fn record(&self, call: String) {
    self.calls.borrow_mut().push(call);
  }
}

impl RegistryBackend for FakeBackend {
  fn kind(&self) -> RegistryKind {
    self.kind
  }

  fn credentials(&self, _env: &dyn Fn(&str) -> Option<String>) -> ReleaseResult<Credentials> {
    Ok(Credentials::Ambient)
  }

  fn version_exists(&self, name: &str, version: &Version) -> ReleaseResult<bool> {
    self.record(format!("version_exists {}@{}", name, version));
    if let Some(answer) = self.scripted.borrow_mut().pop_front() {
      return Ok(answer);
    }
    Ok(self.published.borrow().iter().any(|v| v.cmp_precedence(version).is_eq()))
  }

  fn set_dependency_version(
    &self,
    _project_root: &Path,
    category: DependencyCategory,
    name: &str,
    version: &Version,
  ) -> ReleaseResult<()> {
    self.record(format!("set_dependency_version {} {}@{}", category, name, version));
    Ok(())
  }

  fn reassert_dependency_path(
    &self,
    _project_root: &Path,
    category: DependencyCategory,
    name: &str,
    path: &str,
  ) -> ReleaseResult<()> {
    self.record(format!("reassert_dependency_path {} {} {}", category, name, path));
    Ok(())
  }

  fn set_own_version(&self, _project_root: &Path, version: &Version) -> ReleaseResult<()> {
    self.record(format!("set_own_version {}", version));
    Ok(())
  }

  fn publish(&self, _project_root: &Path, _credentials: &Credentials) -> ReleaseResult<()> {
    self.record("publish".to_string());
    if self.fail_publish {
      return Err(crate::core::error::ReleaseError::RegistryCommand(CommandError {
        command: "publish".to_string(),
        code: Some(1),
        stderr: "rejected".to_string(),
      }));
    }
    if let Some(version) = &self.publishes_version {
      self.published.borrow_mut().push(version.clone());
    }
    Ok(())
  }
}

//! Release steps
//!
//! - **linker**: repin linked dependencies to the release version
//! - **orchestrator**: the publish sequence (gate, link, bump, commit, publish, await)
//! - **tags**: tag HEAD and push branch and tags

pub mod linker;
pub mod orchestrator;
pub mod tags;

pub use orchestrator::{Orchestrator, ReleaseOutcome, ThreadSleeper};
pub use tags::push_tags;

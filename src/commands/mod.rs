//! CLI commands for registry-release
//!
//! - **publish**: gate, link, bump, commit, publish and await one package
//! - **push-tags**: tag HEAD and push the branch and tags
//!
//! Both accept `&ExecutionContext` built once in main.rs.

pub mod publish;
pub mod push_tags;

pub use publish::run_publish;
pub use push_tags::run_push_tags;

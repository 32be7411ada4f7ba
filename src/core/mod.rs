//! Core building blocks shared by every step
//!
//! - **config**: release.toml parsing and option resolution
//! - **context**: project and workspace locations for one run
//! - **error**: error types with exit codes and help messages
//! - **shell**: subprocess primitive
//! - **vcs**: git operations

pub mod config;
pub mod context;
pub mod error;
pub mod shell;
pub mod vcs;

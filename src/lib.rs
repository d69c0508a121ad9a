//! Release pipeline library for the Sim-CPDLC desktop client.
//!
//! This library turns a pushed version tag into a published Windows
//! installer through a strictly sequential pipeline:
//!
//! ```text
//! Triggered → VersionExtracted → MetadataUpdated → Bundled → InstallerBuilt → Published
//! ```
//!
//! Any stage failure is fatal and halts the run; nothing is published on
//! failure. External tools (PyInstaller, Inno Setup) and the GitHub API sit
//! behind narrow seams ([`tools::ToolRunner`], [`pipeline::ReleasePublisher`])
//! so the sequencing logic can be exercised with fakes.

pub mod cli;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, Result, StageError};
pub use manifest::ReleaseManifest;
pub use pipeline::{Pipeline, PipelineContext, PipelineState};

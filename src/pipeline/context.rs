//! Pipeline context threaded through every stage.
//!
//! The pipeline's only shared state is the filesystem workspace and the
//! values produced by earlier stages. Both live in an explicit context
//! object rather than ambient environment variables, so stages stay
//! testable in isolation.

use crate::manifest::ReleaseManifest;
use crate::pipeline::PipelineState;
use semver::Version;
use std::path::{Path, PathBuf};

/// Mutable state passed through the pipeline stages in order.
///
/// Stage outputs (derived version, bundle tree, installer path) start as
/// `None` and are filled in as their producing stage completes; a stage
/// never starts before its predecessor's output exists.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Workspace root exclusively owned by this run
    workspace: PathBuf,

    /// Static release manifest, read-only for the whole run
    manifest: ReleaseManifest,

    /// The triggering tag reference (e.g. "v1.2.3")
    tag: String,

    /// Where the run currently stands in the state machine
    state: PipelineState,

    /// Version derived from the tag by stage 1
    version: Option<Version>,

    /// Bundle output tree produced by stage 3
    bundle_dir: Option<PathBuf>,

    /// Installer executable produced by stage 4
    installer_path: Option<PathBuf>,
}

impl PipelineContext {
    /// Create a context for one pipeline run.
    pub fn new(workspace: &Path, manifest: ReleaseManifest, tag: impl Into<String>) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            manifest,
            tag: tag.into(),
            state: PipelineState::Triggered,
            version: None,
            bundle_dir: None,
            installer_path: None,
        }
    }

    /// Workspace root.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Release manifest.
    pub fn manifest(&self) -> &ReleaseManifest {
        &self.manifest
    }

    /// The triggering tag reference.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Current position in the state machine.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Record a state transition; the driver owns the sequencing.
    pub fn set_state(&mut self, state: PipelineState) {
        self.state = state;
    }

    /// Resolve a manifest-relative path against the workspace root.
    pub fn path(&self, rel: &Path) -> PathBuf {
        self.workspace.join(rel)
    }

    /// Version derived by the version-extraction stage, if it has run.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Record the derived version (the pipeline's named `version` output).
    pub fn set_version(&mut self, version: Version) {
        self.version = Some(version);
    }

    /// Bundle output tree, if the bundling stage has run.
    pub fn bundle_dir(&self) -> Option<&Path> {
        self.bundle_dir.as_deref()
    }

    /// Record the bundle output tree.
    pub fn set_bundle_dir(&mut self, dir: PathBuf) {
        self.bundle_dir = Some(dir);
    }

    /// Installer path, if the installer stage has run.
    pub fn installer_path(&self) -> Option<&Path> {
        self.installer_path.as_deref()
    }

    /// Record the generated installer path.
    pub fn set_installer_path(&mut self, path: PathBuf) {
        self.installer_path = Some(path);
    }

    /// Installer filename for the derived version, interpolated from the
    /// manifest pattern. `None` until the version has been extracted.
    pub fn installer_file_name(&self) -> Option<String> {
        self.version
            .as_ref()
            .map(|v| self.manifest.installer_file_name(&v.to_string()))
    }
}

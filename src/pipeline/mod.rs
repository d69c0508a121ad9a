//! Pipeline sequencing: state machine and stage driver.
//!
//! The pipeline is single-threaded and strictly sequential; each stage is
//! an awaited blocking step, and no stage starts before its predecessor's
//! output artifact exists. Any stage failure halts the run with the failing
//! stage named in the error.

pub mod bundle;
mod context;
pub mod installer;
pub mod publish;
pub mod stamp;
pub mod version;

pub use context::PipelineContext;
pub use publish::{GitHubPublisher, ReleaseAsset, ReleasePublisher, ReleaseRecord};

use crate::error::{ReleaseError, Result};
use crate::tools::ToolRunner;

/// Pipeline progress, advanced linearly with no branching.
///
/// `Published` (or `InstallerBuilt` when publication is skipped) is
/// terminal on success; any stage failure transitions to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    /// Tag push received, nothing run yet
    Triggered,
    /// Version derived from the tag
    VersionExtracted,
    /// Embedded version metadata rewritten
    MetadataUpdated,
    /// Self-contained bundle tree produced
    Bundled,
    /// Installer executable produced
    InstallerBuilt,
    /// Installer attached to the release record
    Published,
    /// A stage failed; remaining stages were not run
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Triggered => "Triggered",
            PipelineState::VersionExtracted => "VersionExtracted",
            PipelineState::MetadataUpdated => "MetadataUpdated",
            PipelineState::Bundled => "Bundled",
            PipelineState::InstallerBuilt => "InstallerBuilt",
            PipelineState::Published => "Published",
            PipelineState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// The release pipeline driver.
///
/// Generic over the tool runner and publisher seams so sequencing can be
/// tested with fakes, independent of PyInstaller, Inno Setup, and the
/// GitHub API.
pub struct Pipeline<R, P> {
    runner: R,
    publisher: P,
    skip_publish: bool,
}

impl<R: ToolRunner, P: ReleasePublisher> Pipeline<R, P> {
    /// Create a pipeline with the given seams.
    pub fn new(runner: R, publisher: P) -> Self {
        Self {
            runner,
            publisher,
            skip_publish: false,
        }
    }

    /// Stop after `InstallerBuilt` without contacting the release host.
    pub fn skip_publish(mut self, skip: bool) -> Self {
        self.skip_publish = skip;
        self
    }

    /// Run every stage in order against the context.
    ///
    /// Returns the terminal state reached on success. On failure the error
    /// names the stage, the context is left in `Failed`, and no later stage
    /// has run.
    pub async fn run(&self, ctx: &mut PipelineContext) -> Result<PipelineState> {
        log::info!("Pipeline triggered for tag {}", ctx.tag());
        match self.run_stages(ctx).await {
            Ok(state) => Ok(state),
            Err(e) => {
                advance(ctx, PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, ctx: &mut PipelineContext) -> Result<PipelineState> {
        version::run(ctx).map_err(|e| ReleaseError::stage("version-extraction", e))?;
        advance(ctx, PipelineState::VersionExtracted);

        stamp::run(ctx)
            .await
            .map_err(|e| ReleaseError::stage("metadata-rewrite", e))?;
        advance(ctx, PipelineState::MetadataUpdated);

        bundle::run(ctx, &self.runner)
            .await
            .map_err(|e| ReleaseError::stage("bundling", e))?;
        advance(ctx, PipelineState::Bundled);

        installer::run(ctx, &self.runner)
            .await
            .map_err(|e| ReleaseError::stage("installer-generation", e))?;
        advance(ctx, PipelineState::InstallerBuilt);

        if self.skip_publish {
            log::info!("Publication skipped; terminal state {}", ctx.state());
            return Ok(ctx.state());
        }

        publish::run(ctx, &self.publisher)
            .await
            .map_err(|e| ReleaseError::stage("publication", e))?;
        advance(ctx, PipelineState::Published);

        Ok(ctx.state())
    }
}

fn advance(ctx: &mut PipelineContext, to: PipelineState) {
    log::info!("Pipeline state: {} -> {}", ctx.state(), to);
    ctx.set_state(to);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered_linearly() {
        assert!(PipelineState::Triggered < PipelineState::VersionExtracted);
        assert!(PipelineState::VersionExtracted < PipelineState::MetadataUpdated);
        assert!(PipelineState::MetadataUpdated < PipelineState::Bundled);
        assert!(PipelineState::Bundled < PipelineState::InstallerBuilt);
        assert!(PipelineState::InstallerBuilt < PipelineState::Published);
    }

    #[test]
    fn states_display_their_names() {
        assert_eq!(PipelineState::Published.to_string(), "Published");
        assert_eq!(PipelineState::Failed.to_string(), "Failed");
    }
}

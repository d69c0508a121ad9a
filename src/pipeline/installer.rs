//! Installer generation via the Inno Setup compiler.
//!
//! Wraps the verified bundle tree into a single installer executable whose
//! name embeds the version string. The compiler itself is an opaque
//! external collaborator; this stage validates its inputs, runs it, and
//! refuses to proceed if the expected output name is not produced.

use crate::error::StageError;
use crate::pipeline::PipelineContext;
use crate::tools::{ToolInvocation, ToolRunner};
use crate::utils::checksum::sha256_file;
use std::path::PathBuf;

/// Installer-generation stage.
///
/// Preconditions: the bundle tree from the previous stage and the installer
/// script must both exist. Postcondition: the file named by the
/// version-interpolated pattern exists in the configured output directory;
/// a mismatch between the script's output name and the expected pattern is
/// fatal here, not at publication.
pub async fn run<R: ToolRunner>(
    ctx: &mut PipelineContext,
    runner: &R,
) -> Result<PathBuf, StageError> {
    let manifest = ctx.manifest().clone();

    let bundle_dir = ctx
        .bundle_dir()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| StageError::MissingInput {
            path: ctx.path(&manifest.bundle_output()),
        })?;
    if !bundle_dir.is_dir() {
        return Err(StageError::MissingInput { path: bundle_dir });
    }

    let script = ctx.path(&manifest.installer.script);
    if !script.is_file() {
        return Err(StageError::MissingInput { path: script });
    }

    let file_name = ctx
        .installer_file_name()
        .ok_or_else(|| StageError::MissingInput {
            path: PathBuf::from("<derived version>"),
        })?;

    log::info!("Compiling installer from {}", script.display());

    let invocation = ToolInvocation::new(
        "iscc",
        vec![script.display().to_string()],
        ctx.workspace(),
    );
    runner.run(&invocation).await?;

    // The script controls the output name; verify it matches the
    // version-interpolated pattern exactly rather than uploading whatever
    // appeared
    let installer_path = ctx.path(&manifest.installer.output_dir).join(&file_name);
    if !installer_path.is_file() {
        return Err(StageError::OutputMismatch {
            path: installer_path,
        });
    }

    let checksum = sha256_file(&installer_path).await?;
    log::info!(
        "Created installer {} (sha256 {})",
        installer_path.display(),
        checksum
    );

    ctx.set_installer_path(installer_path.clone());
    Ok(installer_path)
}

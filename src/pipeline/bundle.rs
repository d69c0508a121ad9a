//! Application bundling via PyInstaller.
//!
//! Collects the entry point, its dependency graph, and the auxiliary data
//! directories into a self-contained one-directory tree that needs no
//! network access at run time. Hidden imports are passed explicitly because
//! import-graph analysis cannot see dynamically loaded modules.

use crate::error::StageError;
use crate::pipeline::PipelineContext;
use crate::tools::{ToolInvocation, ToolRunner};
use crate::utils::fs::copy_dir;
use std::path::{Path, PathBuf};

/// Separator PyInstaller expects in `--add-data SRC<sep>DEST` arguments.
const ADD_DATA_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Build the PyInstaller argument list from the bundle manifest.
///
/// With a maintainer-authored spec file the tool is driven by that file
/// directly; PyInstaller rejects makespec options alongside a spec, so
/// inclusion rules are only passed as flags on the fallback path.
fn pyinstaller_args(ctx: &PipelineContext) -> Vec<String> {
    let manifest = ctx.manifest();
    let mut args = vec![
        "--noconfirm".to_string(),
        "--clean".to_string(),
        "--distpath".to_string(),
        ctx.path(&manifest.bundle.dist_dir).display().to_string(),
    ];

    if let Some(spec_file) = &manifest.bundle.spec_file {
        args.push(ctx.path(spec_file).display().to_string());
        return args;
    }

    args.push("--windowed".to_string());
    args.push("--name".to_string());
    args.push(manifest.package.product_name.clone());

    for dir in &manifest.bundle.data_dirs {
        args.push("--add-data".to_string());
        args.push(format!(
            "{}{}{}",
            dir.display(),
            ADD_DATA_SEPARATOR,
            dir.display()
        ));
    }

    for module in &manifest.bundle.hidden_imports {
        args.push("--hidden-import".to_string());
        args.push(module.clone());
    }

    args.push(
        ctx.path(&manifest.bundle.entry_point)
            .display()
            .to_string(),
    );
    args
}

/// Check that the bundle tree contains the product executable.
///
/// PyInstaller emits `<name>.exe` when targeting Windows and a bare `<name>`
/// binary elsewhere; either satisfies the contract.
fn executable_path(bundle_dir: &Path, product_name: &str) -> Option<PathBuf> {
    let exe = bundle_dir.join(format!("{}.exe", product_name));
    if exe.is_file() {
        return Some(exe);
    }
    let bare = bundle_dir.join(product_name);
    bare.is_file().then_some(bare)
}

/// Bundling stage.
///
/// 1. Validate the entry point, the spec file (when configured), and
///    every auxiliary data directory exist
/// 2. Run PyInstaller to completion
/// 3. Verify the output tree and executable exist
/// 4. Ensure every auxiliary directory is present in the tree under the
///    same relative path, copying it in verbatim if the tool did not
///
/// Returns the bundle output tree and records it in the context.
pub async fn run<R: ToolRunner>(
    ctx: &mut PipelineContext,
    runner: &R,
) -> Result<PathBuf, StageError> {
    let manifest = ctx.manifest().clone();

    // Stage preconditions: all inputs must exist before the tool runs
    let entry_point = ctx.path(&manifest.bundle.entry_point);
    if !entry_point.is_file() {
        return Err(StageError::MissingInput { path: entry_point });
    }
    if let Some(spec_file) = &manifest.bundle.spec_file {
        let spec_path = ctx.path(spec_file);
        if !spec_path.is_file() {
            return Err(StageError::MissingInput { path: spec_path });
        }
    }
    for dir in &manifest.bundle.data_dirs {
        let src = ctx.path(dir);
        if !src.is_dir() {
            return Err(StageError::MissingInput { path: src });
        }
    }

    log::info!(
        "Bundling {} from {}",
        manifest.package.product_name,
        entry_point.display()
    );

    let invocation = ToolInvocation::new("pyinstaller", pyinstaller_args(ctx), ctx.workspace());
    runner.run(&invocation).await?;

    // Verify the output tree
    let bundle_dir = ctx.path(&manifest.bundle_output());
    if !bundle_dir.is_dir() {
        return Err(StageError::OutputMismatch { path: bundle_dir });
    }
    if executable_path(&bundle_dir, &manifest.package.product_name).is_none() {
        return Err(StageError::OutputMismatch {
            path: bundle_dir.join(format!("{}.exe", manifest.package.product_name)),
        });
    }

    // Guarantee: every auxiliary directory lands in the tree under the same
    // relative path, regardless of what the tool carried over
    for dir in &manifest.bundle.data_dirs {
        let dest = bundle_dir.join(dir);
        if !dest.is_dir() {
            log::debug!("Copying auxiliary directory {} into bundle", dir.display());
            copy_dir(&ctx.path(dir), &dest).await?;
        }
    }

    log::info!("Bundle tree ready at {}", bundle_dir.display());
    ctx.set_bundle_dir(bundle_dir.clone());
    Ok(bundle_dir)
}

//! Command execution for the release pipeline CLI.

use crate::cli::args::{RunArgs, StampArgs};
use crate::error::{CliError, ReleaseError, Result};
use crate::manifest::ReleaseManifest;
use crate::pipeline::stamp::stamp_workspace;
use crate::pipeline::version::extract_version;
use crate::pipeline::{GitHubPublisher, Pipeline, PipelineContext};
use crate::tools::ProcessRunner;
use semver::Version;

/// Execute the full pipeline for a pushed tag.
pub async fn run_pipeline(args: RunArgs) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let manifest = ReleaseManifest::load(&args.workspace.join(&args.manifest))?;

    if args.dry_run {
        return run_dry(&args, &manifest).await;
    }

    let publisher = GitHubPublisher::new(
        &manifest.publish.owner,
        &manifest.publish.repo,
        args.token.as_deref().unwrap_or_default(),
    );
    let pipeline = Pipeline::new(ProcessRunner::new(), publisher).skip_publish(args.skip_publish);

    let mut ctx = PipelineContext::new(&args.workspace, manifest, &args.tag);
    let state = pipeline.run(&mut ctx).await?;

    // Named pipeline output consumed by the hosting automation
    if let Some(version) = ctx.version() {
        println!("version={}", version);
    }
    if let Some(installer) = ctx.installer_path() {
        println!("installer={}", installer.display());
    }
    println!("state={}", state);

    Ok(0)
}

/// Dry run: extract the version and report the stamp targets without
/// writing files, bundling, or contacting GitHub.
async fn run_dry(args: &RunArgs, manifest: &ReleaseManifest) -> Result<i32> {
    let version = extract_version(&args.tag, &manifest.package.tag_prefix)
        .map_err(|e| ReleaseError::stage("version-extraction", e))?;

    let reports = stamp_workspace(&args.workspace, manifest, &version, true)
        .await
        .map_err(|e| ReleaseError::stage("metadata-rewrite", e))?;

    println!("version={}", version);
    for report in &reports {
        println!("would update {}", report.path.display());
    }
    println!("Would stamp version {} in {} file(s)", version, reports.len());

    Ok(0)
}

/// Execute the standalone metadata-stamping subcommand.
pub async fn stamp(args: StampArgs) -> Result<i32> {
    let manifest = ReleaseManifest::load(&args.workspace.join(&args.manifest))?;

    let version = Version::parse(&args.version).map_err(|e| CliError::InvalidArguments {
        reason: format!("Invalid version {:?}: {}", args.version, e),
    })?;

    let reports = stamp_workspace(&args.workspace, &manifest, &version, args.dry_run)
        .await
        .map_err(|e| ReleaseError::stage("metadata-rewrite", e))?;

    for report in &reports {
        println!(
            "{} {}",
            if args.dry_run { "would update" } else { "updated" },
            report.path.display()
        );
    }
    println!(
        "{} version {} in {} file(s)",
        if args.dry_run { "Would stamp" } else { "Stamped" },
        version,
        reports.len()
    );

    Ok(0)
}

//! Version extraction from release tags.
//!
//! A release tag has the shape `v<major>.<minor>.<patch>`; the version
//! string is the tag with the leading prefix removed, exactly. Tags that do
//! not match the pattern are rejected here so a malformed version never
//! propagates into artifact names.

use crate::error::StageError;
use crate::pipeline::PipelineContext;
use semver::Version;

/// Derive the version from a tag reference by stripping the configured
/// prefix and parsing the remainder as a semantic version.
pub fn extract_version(tag: &str, prefix: &str) -> Result<Version, StageError> {
    let bad_tag = || StageError::TagPattern {
        tag: tag.to_string(),
        prefix: prefix.to_string(),
    };

    let rest = tag.strip_prefix(prefix).ok_or_else(bad_tag)?;
    let version = Version::parse(rest).map_err(|_| bad_tag())?;

    // Every stamped file and artifact name carries a plain three-part
    // version, so prerelease or build-metadata tags are rejected here
    // rather than failing later on a mismatched installer name.
    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(bad_tag());
    }
    Ok(version)
}

/// Four-part file version for the Windows version resource.
///
/// The version resource requires exactly four numeric components; the
/// fourth is always zero for tagged releases.
pub fn file_version_tuple(version: &Version) -> (u64, u64, u64, u64) {
    (version.major, version.minor, version.patch, 0)
}

/// Version-extraction stage: derive the version from the trigger tag and
/// record it as the pipeline's named `version` output.
pub fn run(ctx: &mut PipelineContext) -> Result<(), StageError> {
    let version = extract_version(ctx.tag(), &ctx.manifest().package.tag_prefix)?;
    log::info!("Extracted version {} from tag {}", version, ctx.tag());
    ctx.set_version(version);
    Ok(())
}

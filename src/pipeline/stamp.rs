//! Embedded version metadata rewrite.
//!
//! Stamps the derived version into the Windows version-info descriptor, the
//! Inno Setup script, and (when configured) the application version
//! constant, all in place. Rewrites are idempotent: running twice with the
//! same version yields byte-identical file content.

use crate::error::StageError;
use crate::manifest::ReleaseManifest;
use crate::pipeline::{PipelineContext, version::file_version_tuple};
use regex::Regex;
use semver::Version;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static FILEVERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"filevers=\(\d+,\s*\d+,\s*\d+,\s*\d+\)").expect("valid regex")
});

static PRODVERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"prodvers=\(\d+,\s*\d+,\s*\d+,\s*\d+\)").expect("valid regex")
});

static FILE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"StringStruct\(u'FileVersion',\s*u'[\d.]+'\)").expect("valid regex")
});

static PRODUCT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"StringStruct\(u'ProductVersion',\s*u'[\d.]+'\)").expect("valid regex")
});

static ISS_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"#define MyAppVersion "[\d.]+""#).expect("valid regex"));

static APP_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"APP_VERSION\s*=\s*"[^"]*""#).expect("valid regex"));

/// Outcome of stamping one file.
#[derive(Debug, Clone)]
pub struct StampReport {
    /// File that was (or would be) rewritten
    pub path: PathBuf,

    /// Whether the content differed from what was already on disk
    pub changed: bool,
}

/// The three kinds of files the pipeline stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampTarget {
    /// PyInstaller version-info descriptor (version_info.txt)
    VersionInfo,

    /// Inno Setup installer script (`#define MyAppVersion`)
    InstallerScript,

    /// Application source constant (`APP_VERSION = "..."`)
    AppVersion,
}

impl StampTarget {
    /// Rewrite `content` with the given version.
    ///
    /// Returns the new content, or a description of the pattern that failed
    /// to match. A non-matching file is fatal upstream: it means the target
    /// is not the descriptor we expect.
    pub fn rewrite(self, content: &str, version: &Version) -> Result<String, String> {
        match self {
            StampTarget::VersionInfo => rewrite_version_info(content, version),
            StampTarget::InstallerScript => rewrite_installer_script(content, version),
            StampTarget::AppVersion => rewrite_app_version(content, version),
        }
    }
}

/// Three-component version string matching the tag-derived version.
fn version_string(version: &Version) -> String {
    format!("{}.{}.{}", version.major, version.minor, version.patch)
}

fn rewrite_version_info(content: &str, version: &Version) -> Result<String, String> {
    let (major, minor, patch, build) = file_version_tuple(version);
    let tuple = format!("({}, {}, {}, {})", major, minor, patch, build);
    let string = version_string(version);

    let mut out = content.to_string();
    for (re, replacement) in [
        (&*FILEVERS_RE, format!("filevers={}", tuple)),
        (&*PRODVERS_RE, format!("prodvers={}", tuple)),
        (
            &*FILE_VERSION_RE,
            format!("StringStruct(u'FileVersion', u'{}')", string),
        ),
        (
            &*PRODUCT_VERSION_RE,
            format!("StringStruct(u'ProductVersion', u'{}')", string),
        ),
    ] {
        if !re.is_match(&out) {
            return Err(format!("version descriptor pattern {}", re.as_str()));
        }
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }

    Ok(out)
}

fn rewrite_installer_script(content: &str, version: &Version) -> Result<String, String> {
    if !ISS_VERSION_RE.is_match(content) {
        return Err("#define MyAppVersion directive".to_string());
    }
    let replacement = format!("#define MyAppVersion \"{}\"", version_string(version));
    Ok(ISS_VERSION_RE
        .replace_all(content, replacement.as_str())
        .into_owned())
}

fn rewrite_app_version(content: &str, version: &Version) -> Result<String, String> {
    if !APP_VERSION_RE.is_match(content) {
        return Err("APP_VERSION constant".to_string());
    }
    let replacement = format!("APP_VERSION = \"{}\"", version_string(version));
    Ok(APP_VERSION_RE
        .replace_all(content, replacement.as_str())
        .into_owned())
}

/// Stamp one file in place.
///
/// With `dry_run` the file is left untouched and the report only says
/// whether it would change.
async fn stamp_file(
    path: &Path,
    target: StampTarget,
    version: &Version,
    dry_run: bool,
) -> Result<StampReport, StageError> {
    if !path.is_file() {
        return Err(StageError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let content = tokio::fs::read_to_string(path).await?;

    let rewritten = target
        .rewrite(&content, version)
        .map_err(|pattern| StageError::PatternNotFound {
            pattern,
            path: path.to_path_buf(),
        })?;

    let changed = rewritten != content;
    if changed && !dry_run {
        tokio::fs::write(path, rewritten).await?;
    }

    Ok(StampReport {
        path: path.to_path_buf(),
        changed,
    })
}

/// Stamp every metadata target declared in the manifest.
///
/// Targets are resolved relative to the workspace root. Any missing file or
/// non-matching descriptor is fatal; nothing later in the pipeline runs on
/// a partially stamped tree.
pub async fn stamp_workspace(
    workspace: &Path,
    manifest: &ReleaseManifest,
    version: &Version,
    dry_run: bool,
) -> Result<Vec<StampReport>, StageError> {
    let mut targets = vec![
        (
            workspace.join(&manifest.metadata.version_info),
            StampTarget::VersionInfo,
        ),
        (
            workspace.join(&manifest.installer.script),
            StampTarget::InstallerScript,
        ),
    ];
    if let Some(app_file) = &manifest.metadata.app_version_file {
        targets.push((workspace.join(app_file), StampTarget::AppVersion));
    }

    let mut reports = Vec::with_capacity(targets.len());
    for (path, target) in targets {
        let report = stamp_file(&path, target, version, dry_run).await?;
        log::info!(
            "{} {} ({})",
            if dry_run { "Would stamp" } else { "Stamped" },
            report.path.display(),
            if report.changed { "changed" } else { "unchanged" }
        );
        reports.push(report);
    }

    Ok(reports)
}

/// Metadata-rewrite stage: stamp the derived version into every target.
pub async fn run(ctx: &PipelineContext) -> Result<(), StageError> {
    let version = ctx.version().ok_or_else(|| StageError::MissingInput {
        path: PathBuf::from("<derived version>"),
    })?;
    stamp_workspace(ctx.workspace(), ctx.manifest(), version, false).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSION_INFO: &str = r#"VSVersionInfo(
  ffi=FixedFileInfo(
    filevers=(0, 1, 0, 0),
    prodvers=(0, 1, 0, 0),
  ),
  kids=[
    StringFileInfo([
      StringTable(u'040904B0', [
        StringStruct(u'FileVersion', u'0.1.0'),
        StringStruct(u'ProductVersion', u'0.1.0'),
      ])
    ])
  ]
)
"#;

    const ISS: &str = r#"#define MyAppName "Sim-CPDLC"
#define MyAppVersion "0.1.0"
[Setup]
OutputBaseFilename=Sim-CPDLC-{#MyAppVersion}
"#;

    #[test]
    fn rewrites_all_version_info_fields() {
        let out = rewrite_version_info(VERSION_INFO, &Version::new(1, 2, 3)).unwrap();
        assert!(out.contains("filevers=(1, 2, 3, 0)"));
        assert!(out.contains("prodvers=(1, 2, 3, 0)"));
        assert!(out.contains("StringStruct(u'FileVersion', u'1.2.3')"));
        assert!(out.contains("StringStruct(u'ProductVersion', u'1.2.3')"));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let version = Version::new(1, 2, 3);
        let once = rewrite_version_info(VERSION_INFO, &version).unwrap();
        let twice = rewrite_version_info(&once, &version).unwrap();
        assert_eq!(once, twice);

        let iss_once = rewrite_installer_script(ISS, &version).unwrap();
        let iss_twice = rewrite_installer_script(&iss_once, &version).unwrap();
        assert_eq!(iss_once, iss_twice);
    }

    #[test]
    fn rewrites_iss_version_define() {
        let out = rewrite_installer_script(ISS, &Version::new(2, 0, 1)).unwrap();
        assert!(out.contains("#define MyAppVersion \"2.0.1\""));
        assert!(!out.contains("0.1.0"));
    }

    #[test]
    fn rewrites_app_version_constant() {
        let content = "APP_NAME = \"Sim-CPDLC\"\nAPP_VERSION = \"0.1.0\"\n";
        let out = rewrite_app_version(content, &Version::new(1, 0, 0)).unwrap();
        assert!(out.contains("APP_VERSION = \"1.0.0\""));
    }

    #[test]
    fn unmatched_descriptor_is_an_error() {
        assert!(rewrite_version_info("not a descriptor", &Version::new(1, 0, 0)).is_err());
        assert!(rewrite_installer_script("[Setup]", &Version::new(1, 0, 0)).is_err());
    }

    #[tokio::test]
    async fn stamp_file_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version_info.txt");
        std::fs::write(&path, VERSION_INFO).unwrap();
        let version = Version::new(1, 2, 3);

        let first = stamp_file(&path, StampTarget::VersionInfo, &version, false)
            .await
            .unwrap();
        assert!(first.changed);
        let after_first = std::fs::read(&path).unwrap();

        let second = stamp_file(&path, StampTarget::VersionInfo, &version, false)
            .await
            .unwrap();
        assert!(!second.changed);
        assert_eq!(after_first, std::fs::read(&path).unwrap());
    }

    #[tokio::test]
    async fn dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.iss");
        std::fs::write(&path, ISS).unwrap();

        let report = stamp_file(&path, StampTarget::InstallerScript, &Version::new(9, 9, 9), true)
            .await
            .unwrap();
        assert!(report.changed);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ISS);
    }

    #[tokio::test]
    async fn missing_target_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = stamp_file(
            &dir.path().join("absent.txt"),
            StampTarget::VersionInfo,
            &Version::new(1, 0, 0),
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StageError::MissingInput { .. }));
    }
}

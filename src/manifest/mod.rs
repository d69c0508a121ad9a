//! Release manifest parsing from `release.toml`.
//!
//! The manifest is static, maintainer-authored configuration read once at
//! startup: what to stamp, what to bundle, how the installer is named, and
//! where releases are published. It is read-only at pipeline run time.

use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Complete release manifest loaded from `release.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    /// Product identity ([package] section)
    pub package: PackageSection,

    /// Version metadata rewrite targets ([metadata] section)
    pub metadata: MetadataSection,

    /// Bundle inclusion rules ([bundle] section)
    pub bundle: BundleSection,

    /// Installer generation settings ([installer] section)
    pub installer: InstallerSection,

    /// Release publication target ([publish] section)
    pub publish: PublishSection,
}

/// Product identity
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    /// Product name embedded in artifact names (e.g. "Sim-CPDLC")
    pub product_name: String,

    /// Literal prefix that marks a release tag (default "v")
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

/// Version metadata rewrite targets, relative to the workspace root
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataSection {
    /// Windows version-info descriptor consumed by the bundler
    pub version_info: PathBuf,

    /// Optional source file carrying the application version constant
    #[serde(default)]
    pub app_version_file: Option<PathBuf>,
}

/// Bundle inclusion rules: entry point, auxiliary data directories, and
/// dependency names invisible to import-graph analysis
#[derive(Debug, Clone, Deserialize)]
pub struct BundleSection {
    /// Application entry-point script
    pub entry_point: PathBuf,

    /// Maintainer-authored PyInstaller spec file. When set it drives the
    /// bundler directly; inclusion rules below are then expressed in the
    /// spec file itself and passed-through flags are not used
    #[serde(default)]
    pub spec_file: Option<PathBuf>,

    /// Auxiliary data directories copied verbatim into the bundle tree
    /// under the same relative path
    #[serde(default)]
    pub data_dirs: Vec<PathBuf>,

    /// Dynamically loaded modules that must be force-included
    #[serde(default)]
    pub hidden_imports: Vec<String>,

    /// Bundler output parent directory (default "dist")
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

/// Installer generation settings
#[derive(Debug, Clone, Deserialize)]
pub struct InstallerSection {
    /// Installer-definition script (Inno Setup .iss)
    pub script: PathBuf,

    /// Directory the installer compiler writes into
    pub output_dir: PathBuf,

    /// Output filename pattern; `{version}` is replaced with the derived
    /// version string (default "Sim-CPDLC-{version}.exe")
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

/// Release publication target
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSection {
    /// GitHub repository owner
    pub owner: String,

    /// GitHub repository name
    pub repo: String,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_file_pattern() -> String {
    "Sim-CPDLC-{version}.exe".to_string()
}

impl ReleaseManifest {
    /// Load and parse the manifest from the given path.
    ///
    /// Reads and parses the file exactly once; a missing or malformed
    /// manifest is fatal before any stage runs.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReleaseError::Cli(crate::error::CliError::InvalidArguments {
                reason: format!("Failed to read {}: {}", path.display(), e),
            })
        })?;

        let manifest: ReleaseManifest = toml::from_str(&content)?;
        Ok(manifest)
    }

    /// Installer filename for a given version string, interpolated from the
    /// configured pattern.
    pub fn installer_file_name(&self, version: &str) -> String {
        self.installer.file_pattern.replace("{version}", version)
    }

    /// Bundle output tree: `<dist_dir>/<product_name>`.
    ///
    /// Matches PyInstaller one-directory mode, which nests the tree under
    /// the product name.
    pub fn bundle_output(&self) -> PathBuf {
        self.bundle.dist_dir.join(&self.package.product_name)
    }
}

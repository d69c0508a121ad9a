//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release pipeline for the Sim-CPDLC desktop client
#[derive(Parser, Debug)]
#[command(
    name = "sim_cpdlc_release",
    version,
    about = "Release pipeline for the Sim-CPDLC desktop client",
    long_about = "Turns a pushed version tag into a published Windows installer.

Stages: version extraction, metadata stamping, PyInstaller bundling,
Inno Setup packaging, GitHub release publication. Every stage failure is
fatal; nothing is published on a failed run.

Usage:
  sim_cpdlc_release run --tag v1.2.3
  sim_cpdlc_release run --tag v1.2.3 --skip-publish
  sim_cpdlc_release stamp 1.2.3 --dry-run

Exit code 0 = the terminal pipeline state was reached."
)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full release pipeline for a pushed tag
    Run(RunArgs),

    /// Rewrite embedded version metadata without building anything
    Stamp(StampArgs),
}

/// Arguments for the `run` subcommand
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Triggering tag reference (e.g. v1.2.3)
    #[arg(short, long, value_name = "TAG")]
    pub tag: String,

    /// Workspace root containing the source tree
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Release manifest path, relative to the workspace
    #[arg(long, value_name = "PATH", default_value = "release.toml")]
    pub manifest: PathBuf,

    /// Stop after the installer is built; do not contact GitHub
    #[arg(long)]
    pub skip_publish: bool,

    /// Extract the version and report what stamping would change, without
    /// writing files or building anything
    #[arg(long)]
    pub dry_run: bool,

    /// GitHub token with permission to create releases and upload assets
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Arguments for the `stamp` subcommand
#[derive(clap::Args, Debug)]
pub struct StampArgs {
    /// Version to stamp (e.g. 1.2.3)
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Workspace root containing the source tree
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Release manifest path, relative to the workspace
    #[arg(long, value_name = "PATH", default_value = "release.toml")]
    pub manifest: PathBuf,

    /// Show what would change without writing any files
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl RunArgs {
    /// Validate arguments for consistency before any stage runs.
    pub fn validate(&self) -> Result<(), String> {
        if self.tag.is_empty() {
            return Err("Tag cannot be empty".to_string());
        }
        if !self.skip_publish && !self.dry_run && self.token.is_none() {
            return Err(
                "Publication requires a token: pass --token or set GITHUB_TOKEN \
                 (or use --skip-publish for a local build)"
                    .to_string(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Args::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run subcommand, got {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let args = run_args(&[
            "sim_cpdlc_release",
            "run",
            "--tag",
            "v1.2.3",
            "--skip-publish",
        ]);
        assert_eq!(args.tag, "v1.2.3");
        assert_eq!(args.workspace, PathBuf::from("."));
        assert_eq!(args.manifest, PathBuf::from("release.toml"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn publish_without_token_is_rejected() {
        let mut args = run_args(&["sim_cpdlc_release", "run", "--tag", "v1.2.3"]);
        args.token = None;
        assert!(args.validate().is_err());

        args.token = Some("ghp_example".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn run_dry_run_needs_no_token() {
        let args = run_args(&[
            "sim_cpdlc_release",
            "run",
            "--tag",
            "v1.2.3",
            "--dry-run",
        ]);
        assert!(args.dry_run);
        let mut args = args;
        args.token = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn stamp_parses_dry_run() {
        let parsed = Args::try_parse_from([
            "sim_cpdlc_release",
            "stamp",
            "1.2.3",
            "--dry-run",
        ])
        .unwrap();
        match parsed.command {
            Command::Stamp(args) => {
                assert_eq!(args.version, "1.2.3");
                assert!(args.dry_run);
            }
            other => panic!("expected stamp subcommand, got {other:?}"),
        }
    }
}

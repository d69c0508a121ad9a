//! External tool invocation seam.
//!
//! Every stage that shells out to a third-party tool (PyInstaller, the Inno
//! Setup compiler) goes through [`ToolRunner`], so the sequencing logic can
//! be tested with fake implementations independent of the real tools.

use crate::error::StageError;
use std::path::{Path, PathBuf};

/// A single external tool invocation.
///
/// The `program` is a logical name ("pyinstaller", "iscc"); resolution to a
/// concrete executable is the runner's concern.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Logical program name
    pub program: String,

    /// Command line arguments
    pub args: Vec<String>,

    /// Working directory for the invocation
    pub cwd: PathBuf,
}

impl ToolInvocation {
    /// Create a new invocation.
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.to_path_buf(),
        }
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

/// Narrow interface over external tool execution: `run(inputs) -> outputs`,
/// where any spawn failure or nonzero exit status is a fatal [`StageError`].
#[allow(async_fn_in_trait)]
pub trait ToolRunner {
    /// Run the tool to completion, blocking the pipeline until it exits.
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, StageError>;
}

/// Tool runner backed by real subprocesses.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, StageError> {
        let program = locate(&invocation.program)?;

        log::info!(
            "Running {} {}",
            program.display(),
            invocation.args.join(" ")
        );

        let output = tokio::process::Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .output()
            .await
            .map_err(|e| StageError::ToolFailed {
                tool: invocation.program.clone(),
                reason: format!("failed to spawn: {}", e),
            })?;

        if !output.status.success() {
            return Err(StageError::ToolFailed {
                tool: invocation.program.clone(),
                reason: format!(
                    "exit code {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Locate an external tool on PATH.
///
/// The Inno Setup compiler installs as `ISCC.exe` on Windows but is commonly
/// exposed as lowercase `iscc` under Wine wrappers, so both spellings are
/// probed.
pub fn locate(program: &str) -> Result<PathBuf, StageError> {
    let candidates: Vec<&str> = match program {
        "iscc" => vec!["iscc", "ISCC"],
        other => vec![other],
    };

    for candidate in candidates {
        match which::which(candidate) {
            Ok(path) => {
                log::debug!("Found {} at: {}", program, path.display());
                return Ok(path);
            }
            Err(e) => {
                log::debug!("{} not found in PATH: {}", candidate, e);
            }
        }
    }

    Err(StageError::ToolFailed {
        tool: program.to_string(),
        reason: format!("{} not found in PATH", program),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_reports_missing_tool() {
        let err = locate("definitely-not-a-real-tool-name").unwrap_err();
        match err {
            StageError::ToolFailed { tool, .. } => {
                assert_eq!(tool, "definitely-not-a-real-tool-name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn process_runner_captures_output() {
        let runner = ProcessRunner::new();
        let invocation = ToolInvocation::new(
            "echo",
            vec!["hello".to_string()],
            Path::new("."),
        );
        let output = runner.run(&invocation).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn process_runner_fails_on_nonzero_exit() {
        let runner = ProcessRunner::new();
        let invocation = ToolInvocation::new("false", Vec::new(), Path::new("."));
        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, StageError::ToolFailed { .. }));
    }
}

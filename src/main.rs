//! Sim-CPDLC Release - release pipeline for the Sim-CPDLC desktop client.
//!
//! This binary drives a tag-triggered release: version extraction, metadata
//! stamping, PyInstaller bundling, Inno Setup packaging, and GitHub release
//! publication, with fatal-on-failure semantics at every stage.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match sim_cpdlc_release::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}

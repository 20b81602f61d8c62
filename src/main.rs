//! Dymo - interactive CodePush release tool.
//!
//! This binary tags a GitHub release for the chosen remote commit and
//! deploys the bundle through the App Center CLI.

use dymo::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let output = OutputManager::default();
    let exit_code = match dymo::cli::run().await {
        Ok(code) => code,
        Err(e) if e.is_cancellation() => {
            let _ = output.warn("Cancelled by user.");
            e.exit_code()
        }
        Err(e) => {
            let _ = output.error(&format!("Error: {}", e));
            e.exit_code()
        }
    };

    process::exit(exit_code);
}

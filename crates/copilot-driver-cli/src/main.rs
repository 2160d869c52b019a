//! copilot-driver
//!
//! Opens a project in VS Code, installs its Python requirements, asks GitHub
//! Copilot Chat (Agent mode) for code and accepts the answer once a vision
//! model reports the "Keep" button as enabled.
//!
//! Usage:
//!   copilot-driver                                   # defaults: ~/pyauto-gui-samples/project1
//!   copilot-driver --project-folder C:\work\demo     # another project
//!   copilot-driver --skip-install --save-frames out  # no pip, keep screenshots

use crate::cli::Args;
use clap::Parser;

mod cli;
mod session;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    utils::init_logging();

    let args = Args::parse();
    session::run(args).await?;
    Ok(())
}

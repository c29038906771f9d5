//! Scout CLI: relevance reviews of web resources against BrainDrive projects.
//!
//! Fetches an article, post, or video, asks a language model how it relates
//! to a project's specification, and appends the verdict to the project's
//! research log.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

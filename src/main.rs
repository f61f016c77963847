//! Entry point for the nami CLI, a replay/debug harness around the
//! streaming assistant-message parser library.

use anyhow::Result;

use nami::cli;

/// Runs the nami CLI.
///
/// Parses command-line arguments into a [`cli::Cli`] struct and dispatches
/// the chosen subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::parse();
    cli::run(cli).await
}

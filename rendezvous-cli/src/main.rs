//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use eyre::WrapErr;
use rendezvous_cli::CliError;

fn main() -> eyre::Result<()> {
    match rendezvous_cli::run() {
        // Help and version requests surface as parse errors; let clap print them.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        outcome => outcome.wrap_err("rendezvous failed"),
    }
}

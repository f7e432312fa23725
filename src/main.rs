use clap::Parser;
use tracing::error;

use chain::EthersChain;
use cli::Args;
use terminal::{prompt::ConsolePrompter, Terminal};

mod abis;
mod chain;
mod cli;
mod error;
mod network;
mod session;
mod terminal;
mod units;
mod wallet;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    setup_logging(args.verbose);

    let terminal =
        match Terminal::bootstrap(&args, ConsolePrompter::default(), EthersChain::connect).await {
            Ok(terminal) => terminal,
            Err(err) => {
                error!("Could not start session: {}", err);
                std::process::exit(1);
            }
        };

    if let Err(err) = terminal.run().await {
        error!("Session ended unexpectedly: {}", err);
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never interleave with the menu on stdout.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

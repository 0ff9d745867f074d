use clap::Parser;
use shellcast::app::{handle_fatal_error, init_logging};
use shellcast::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(verbose);

    match execute(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => handle_fatal_error(e, verbose),
    }
}

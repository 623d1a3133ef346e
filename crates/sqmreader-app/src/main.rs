use clap::Parser;
use std::process::ExitCode;

use sqmreader_app::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    sqmreader_app::logging::init(cli.log.as_deref(), cli.verbose);

    match sqmreader_app::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

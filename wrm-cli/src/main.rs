//! WRM CLI - Command line tool for tracking water sources, storage and demand.

use clap::Parser;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "wrm-cli",
    version,
    about = "Water resource management toolkit"
)]
struct Cli {
    #[command(flatten)]
    args: wrm_cmd::GlobalArgs,

    #[command(subcommand)]
    command: wrm_cmd::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match wrm_cmd::run(cli.args, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("[WRM] cli: command failed: {:?}", err);
            let _ = wrm_cmd::report_error(&err, &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}

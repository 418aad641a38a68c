use clap::Parser;
use futures::prelude::*;
use graph_publisher::tracing_err;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = graph_publisher::Cli::parse();

    if dotenvy::dotenv().is_err() {
        eprintln!("Dotenv config was not found, ignoring this...")
    }

    graph_publisher::init_logging();

    AssertUnwindSafe(async {
        let result = try_main(cli).await;

        result.map(|()| ExitCode::SUCCESS).unwrap_or_else(|err| {
            error!(err = tracing_err(&err), "Exitting with an error...");
            ExitCode::FAILURE
        })
    })
    .catch_unwind()
    .unwrap_or_else(|_| {
        error!("Exitting due to a panic...");
        ExitCode::FAILURE
    })
    .await
}

async fn try_main(cli: graph_publisher::Cli) -> graph_publisher::Result {
    let config = graph_publisher::Config::load_or_panic();

    graph_publisher::init_metrics(config.metrics())?;

    cli.run(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            err = tracing_err(&err),
            "Failed to wait for Ctrl+C, exiting..."
        );
    } else {
        info!("Ctrl+C received, exiting...");
    }
}

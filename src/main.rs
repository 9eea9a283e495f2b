//
//  buildkite-cli
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use buildkite_cli::api::ApiError;
use buildkite_cli::cli::{Cli, Commands, PartialFailure};
use buildkite_cli::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("BK_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Maps partial failures and API status codes onto the documented exit codes
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<PartialFailure>().is_some() {
        return exit_codes::PARTIAL_FAILURE;
    }

    let status = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(ApiError::status);

    match status {
        Some(401) | Some(403) => exit_codes::AUTH_ERROR,
        Some(404) => exit_codes::NOT_FOUND,
        Some(429) => exit_codes::RATE_LIMIT,
        _ => exit_codes::ERROR,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(cmd) => cmd.run(&cli.global).await,
        Commands::Job(cmd) => cmd.run(&cli.global).await,
        Commands::Pipeline(cmd) => cmd.run(&cli.global).await,
        Commands::Org(cmd) => cmd.run(&cli.global).await,
        Commands::Whoami(cmd) => cmd.run(&cli.global).await,
        Commands::Token(cmd) => cmd.run(&cli.global).await,
        Commands::Meta(cmd) => cmd.run(&cli.global).await,
        Commands::Ping(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
    }
}

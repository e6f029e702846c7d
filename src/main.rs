//
//  bitbucket-context
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_context::cli::{Cli, Commands};
use bitbucket_context::exit_codes;

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
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("BBCTX_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Repos(cmd) => cmd.run(&cli.global).await,
        Commands::Prs(cmd) => cmd.run(&cli.global).await,
        Commands::Whoami(cmd) => cmd.run(&cli.global).await,
        Commands::Mirrors(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("bbctx version {}", bitbucket_context::VERSION);
            Ok(())
        }
    }
}

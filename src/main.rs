// Copyright 2026 Sphinx Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sphinx_runtime::cli;

#[derive(Parser)]
#[command(
    name = "sphinx",
    about = "Sphinx — task-page solving endpoint",
    version,
    after_help = "Run 'sphinx <command> --help' for details on each command."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the task endpoint
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
    },
    /// Solve a single task URL and print the outcome
    Solve {
        /// URL of the task page
        url: String,
        /// Recipient email for the submission (defaults to SPHINX_EMAIL)
        #[arg(long)]
        email: Option<String>,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cli::serve::run(port).await,
        Commands::Solve { url, email } => cli::solve_cmd::run(&url, email.as_deref()).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sphinx", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}

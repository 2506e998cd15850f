//! configure-azure - Microsoft Entra ID login setup
//!
//! Provisions the `.streamlit/secrets.toml` a Streamlit app needs for
//! Microsoft sign-in and, optionally, OneDrive/SharePoint access.

mod auth;
mod config;
mod wizard;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::RedirectTarget;
use config::ProjectPaths;
use wizard::WizardError;

/// Exit status when the operator cancels (matches a shell's SIGINT status).
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "configure-azure")]
#[command(about = "Set up Microsoft Entra ID login credentials for a Streamlit app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive setup wizard (default)
    Configure {
        /// Project directory containing .streamlit/ and .gitignore
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print the redirect URIs to register for an app name
    Uris {
        /// Streamlit Community Cloud app name (a pasted URL is accepted)
        name: String,
    },

    /// Validate an existing secrets file and show a masked summary
    Check {
        /// Project directory containing .streamlit/ and .gitignore
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print a sign-in URL built from the [login] section
    AuthorizeUrl {
        /// Project directory containing .streamlit/
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Use the production redirect URI instead of localhost
        #[arg(long)]
        production: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stderr so it never mixes with prompts
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Commands::Configure {
        dir: PathBuf::from("."),
    });
    let result = runtime.block_on(run(command));
    // A prompt may still be blocked on stdin after Ctrl-C
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            eprintln!("\n\nOperation cancelled. Nothing was written.");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Configure { dir } => {
            tracing::info!("Starting setup wizard in {}", dir.display());
            wizard::run(ProjectPaths::new(dir)).await?;
        }
        Commands::Uris { name } => {
            let uris = config::derive(&name)?;
            println!("{}", wizard::instructions::redirect_uri_banner(&uris));
        }
        Commands::Check { dir } => {
            config::check(&ProjectPaths::new(dir))?;
        }
        Commands::AuthorizeUrl { dir, production } => {
            let target = if production {
                RedirectTarget::Production
            } else {
                RedirectTarget::Local
            };
            auth::print_authorize_url(&ProjectPaths::new(dir), target)?;
        }
    }

    Ok(())
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<WizardError>(),
        Some(WizardError::Cancelled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_wizard() {
        let cli = Cli::try_parse_from(["configure-azure"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_authorize_url_flags() {
        let cli =
            Cli::try_parse_from(["configure-azure", "authorize-url", "--production", "-d", "app"])
                .unwrap();
        match cli.command {
            Some(Commands::AuthorizeUrl { dir, production }) => {
                assert!(production);
                assert_eq!(dir, PathBuf::from("app"));
            }
            _ => panic!("expected authorize-url"),
        }
    }

    #[test]
    fn test_cancellation_is_distinguished() {
        let cancelled = anyhow::Error::from(WizardError::Cancelled);
        assert!(is_cancelled(&cancelled));

        let failed = anyhow::anyhow!("disk full");
        assert!(!is_cancelled(&failed));
    }
}

//! Auxilia CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! auxilia migrate
//!
//! # Create an admin, or promote an existing account
//! auxilia admin create -e admin@example.com -f Ada -l Lovelace
//!
//! # Load categories and products from YAML
//! auxilia seed catalog crates/cli/fixtures/catalog.yaml --clear
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create or promote admin users
//! - `seed catalog` - Seed the catalog from a YAML file
//!
//! All commands read `DATABASE_URL` (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "auxilia")]
#[command(author, version, about = "Auxilia CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin user, or promote an existing account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: Option<String>,

        /// Last name
        #[arg(short, long)]
        last_name: Option<String>,

        /// Password (a temporary one is generated when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load categories and products from a YAML file
    Catalog {
        /// Path to the YAML file
        file: String,

        /// Delete every product and category first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                first_name,
                last_name,
                password,
            } => {
                commands::admin::create_user(
                    &email,
                    first_name.as_deref(),
                    last_name.as_deref(),
                    password.as_deref(),
                )
                .await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, clear } => {
                commands::seed::catalog(&file, clear).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "auxilia", "admin", "create", "-e", "ada@example.com", "-f", "Ada",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Admin {
                action:
                    AdminAction::Create {
                        email,
                        first_name,
                        last_name,
                        password,
                    },
            } => {
                assert_eq!(email, "ada@example.com");
                assert_eq!(first_name.as_deref(), Some("Ada"));
                assert!(last_name.is_none());
                assert!(password.is_none());
            }
            _ => panic!("expected admin create"),
        }
    }

    #[test]
    fn test_parse_seed_catalog_with_clear() {
        let cli = Cli::try_parse_from(["auxilia", "seed", "catalog", "catalog.yaml", "--clear"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Seed {
                target: SeedTarget::Catalog { clear: true, .. }
            }
        ));
    }
}

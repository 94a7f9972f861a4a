//! Threadline CLI - Database migrations and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! threadline-cli migrate
//!
//! # Load the demo catalog, user, membership and coupon
//! threadline-cli seed
//!
//! # Print a bearer token for local testing
//! threadline-cli token --user-id 1 --ttl-minutes 120
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo data
//! - `token` - Sign a development access token

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "threadline-cli")]
#[command(author, version, about = "Threadline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Insert the demo catalog (skipped if the catalog is not empty)
    Seed,
    /// Sign an access token for an existing user
    Token {
        /// User id to put in the token subject
        #[arg(short, long)]
        user_id: i32,

        /// Token lifetime in minutes
        #[arg(short, long, default_value_t = 60)]
        ttl_minutes: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed => commands::seed::demo_catalog().await?,
        Commands::Token {
            user_id,
            ttl_minutes,
        } => commands::token::issue(user_id, ttl_minutes)?,
    }
    Ok(())
}

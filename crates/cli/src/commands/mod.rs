//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod token;

use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Token error: {0}")]
    Identity(#[from] threadline_storefront::services::IdentityError),
}

/// Read a secret from the environment, loading `.env` first.
pub(crate) fn secret_env(key: &'static str) -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();
    std::env::var(key)
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar(key))
}

/// Storefront database URL, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Result<SecretString, CliError> {
    secret_env("STOREFRONT_DATABASE_URL")
        .or_else(|_| secret_env("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

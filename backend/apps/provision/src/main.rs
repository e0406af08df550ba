//! Provisioning CLI
//!
//! Creates accounts directly against the auth database. There is no
//! self-service registration endpoint; this binary is the only way in.

mod args;

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;

use auth::{AuthConfig, AuthError, Authenticator, SqlAuthRepository};
use clap::Parser;
use query::{AnyExecutor, PoolSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays scriptable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "provision=info,auth=warn,query=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let executor = AnyExecutor::connect(&cli.database_url, &PoolSettings::default()).await?;
    let repository = SqlAuthRepository::new(executor)?;
    repository.initialize().await?;

    let config = Arc::new(AuthConfig::from_env()?);
    let repository = Arc::new(repository);
    let authenticator = Authenticator::new(repository.clone(), repository, config)?;

    match cli.command {
        Command::CreateUser { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };

            match authenticator.credentials().create_user(&username, password).await {
                Ok(user_id) => {
                    println!("{user_id}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(AuthError::DuplicateUsername) => {
                    eprintln!("error: user name already exists");
                    Ok(ExitCode::FAILURE)
                }
                Err(AuthError::Validation(reason)) => {
                    eprintln!("error: {reason}");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::PurgeSessions => {
            let deleted = authenticator.purge_expired().await?;
            tracing::info!(sessions_deleted = deleted, "Expired sessions purged");
            println!("{deleted}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// First line of stdin, without the line terminator
fn read_password() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

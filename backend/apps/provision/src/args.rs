//! CLI argument definitions using clap
//!
//! Commands:
//! - provision create-user <username> [password]
//! - provision purge-sessions

use clap::{Parser, Subcommand};

/// Out-of-band account provisioning for the auth database
#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database URL (`sqlite://...` or `postgres://...`)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://auth.db")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user. The password is read from stdin when omitted.
    CreateUser {
        /// User name to register
        username: String,

        /// Clear-text password. Prefer stdin; argv is visible to other processes.
        password: Option<String>,
    },

    /// Delete every expired session
    PurgeSessions,
}

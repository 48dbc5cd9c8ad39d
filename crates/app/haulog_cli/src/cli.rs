//! Command-line interface definition.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "haulog", about = "Haulog fleet trip-logging client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist the session.
    Login {
        username: String,
        password: String,
    },
    /// Register a new account (and log in).
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Clear the persisted session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Issue an authenticated GET against the API (path relative to the
    /// API base, e.g. `trips/`).
    Get {
        path: String,
    },
    /// Request a password-reset link.
    ResetPassword {
        email: String,
    },
    /// Print the version.
    Version,
}

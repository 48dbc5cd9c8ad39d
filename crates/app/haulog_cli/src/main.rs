// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

mod cli;
mod logging;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};

use haulog_client::config::ClientConfig;
use haulog_client::models::{LoginRequest, RegisterRequest};
use haulog_client::{ApiRequest, Client};
use haulog_core::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    if let Commands::Version = args.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ClientConfig::from_env();
    let store = match &config.store_path {
        Some(path) => FileStore::at_path(path, &config.store_key),
        None => FileStore::open_default(&config.store_key),
    };
    let client = haulog_client::connect(&config, Arc::new(store))?;

    dispatch_command(&args.command, &client).await
}

async fn dispatch_command(command: &Commands, client: &Client) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let session = client
                .session
                .login(LoginRequest {
                    username: username.clone(),
                    password: password.clone(),
                })
                .await?;
            if let Some(user) = &session.user {
                println!("logged in as {} ({})", user.username, user.role);
            }
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let session = client
                .session
                .register(RegisterRequest {
                    username: username.clone(),
                    email: email.clone(),
                    password: password.clone(),
                    confirm_password: password.clone(),
                })
                .await?;
            if let Some(user) = &session.user {
                println!("registered as {} ({})", user.username, user.role);
            }
        }
        Commands::Logout => {
            if client.session.logout()? {
                println!("logged out");
            } else {
                println!("no active session");
            }
        }
        Commands::Whoami => match client.session.current_user() {
            Some(user) => println!("{} ({}) [id {}]", user.username, user.role, user.id),
            None => println!("not logged in"),
        },
        Commands::Get { path } => {
            let response = client.dispatcher.dispatch(ApiRequest::get(path)).await?;
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
        Commands::ResetPassword { email } => {
            let detail = client.session.request_password_reset(email).await?;
            println!("{detail}");
        }
        Commands::Version => unreachable!("handled before client setup"),
    }

    Ok(())
}

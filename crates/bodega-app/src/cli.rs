//! CLI argument definitions for the bodega binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Storefront account companion: a thin shell over the sync service,
/// standing in for the mobile UI.
#[derive(Parser, Debug)]
#[command(name = "bodega")]
#[command(about = "Bodega storefront account tool")]
#[command(version)]
pub struct Cli {
    /// Identity service base URL
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "BODEGA_API_URL")]
    pub api_url: String,

    /// Path of the local account database
    #[arg(long, default_value = "bodega.db", env = "BODEGA_DB_PATH")]
    pub db_path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account, locally pending sync if the provider is down
    Register(RegisterArgs),
    /// Open a session, falling back to the local cache when offline
    Login { email: String, password: String },
    /// Close the current session
    Logout,
    /// Show the current session, if any
    Whoami,
    /// List accounts known to this device
    Accounts,
    /// Set or clear the profile photo of a local account
    Photo {
        local_id: i64,
        /// Omit to clear the photo
        uri: Option<String>,
    },
    /// Delete an account, remotely and locally
    Delete { local_id: i64 },
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    pub email: String,
    pub password: String,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,

    #[arg(long, default_value = "")]
    pub region: String,
}

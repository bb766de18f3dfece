mod cli;

use clap::Parser;

use bodega_db::{Database, UserStore};
use bodega_remote::HttpIdentityClient;
use bodega_sync::UserSyncService;
use bodega_types::models::{RegistrationInput, UserRecord};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bodega=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    let db = Database::open(&cli.db_path)?;
    let store = UserStore::new(db)?;
    let api = HttpIdentityClient::new(&cli.api_url);
    let service = UserSyncService::new(api, store);

    match cli.command {
        Commands::Register(args) => {
            let input = RegistrationInput {
                name: args.name,
                last_name: args.last_name,
                email: args.email.clone(),
                password: args.password,
                region: args.region,
                registered_at: chrono::Utc::now().to_rfc3339(),
            };
            if service.register(input).await {
                match service.active_user().borrow().clone() {
                    Some(user) => println!("registered and signed in as {}", user.email),
                    None => println!("registered {} locally, pending sync", args.email),
                }
            } else {
                anyhow::bail!("registration could not be saved locally");
            }
        }

        Commands::Login { email, password } => {
            if service.login(&email, &password).await {
                println!("signed in as {}", email);
            } else {
                anyhow::bail!(
                    "no session: provider unreachable and no cached account for {}",
                    email
                );
            }
        }

        Commands::Logout => {
            service.logout().await?;
            println!("signed out");
        }

        Commands::Whoami => match service.active_user().borrow().clone() {
            Some(user) => print_user(&user),
            None => println!("no active session"),
        },

        Commands::Accounts => {
            let users = service.store().list().await?;
            if users.is_empty() {
                println!("no accounts on this device");
            }
            for user in users {
                print_user(&user);
            }
        }

        Commands::Photo { local_id, uri } => {
            service.update_photo(local_id, uri).await?;
            println!("photo updated for account {}", local_id);
        }

        Commands::Delete { local_id } => {
            // The two halves are independent; report each on its own.
            let record = service.store().find_by_id(local_id).await?;
            match record.as_ref().and_then(|r| r.remote_id) {
                Some(remote_id) => match service.delete_account_remote(remote_id).await {
                    Ok(()) => println!("remote account {} deleted", remote_id),
                    Err(e) => eprintln!("remote delete failed: {}", e),
                },
                None => println!("no remote account recorded, skipping remote delete"),
            }
            service.delete_account_local(local_id).await?;
            println!("local account {} deleted", local_id);
        }
    }

    Ok(())
}

fn print_user(user: &UserRecord) {
    let marker = if user.active { "*" } else { " " };
    println!(
        "{} [{}] {} {} <{}> ({})",
        marker,
        user.local_id.unwrap_or_default(),
        user.name,
        user.last_name,
        user.email,
        if user.remote_id.is_some() {
            "synced"
        } else {
            "local only"
        },
    );
}

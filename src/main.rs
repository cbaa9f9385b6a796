//! authwho - View the currently authenticated user
//!
//! A small CLI that fetches the signed-in user from an auth service and
//! caches the result, so repeated invocations within the time-to-live window
//! answer without a network round trip.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use authwho::auth::{AuthClient, User, UserRole};
use authwho::cache::{SessionCache, UserState};
use authwho::cli::{Cli, Command};
use authwho::store::{FileStore, MemoryStore, SessionStore};

/// Prints a user record in a human-readable form
fn print_user(user: &User) {
    println!("id:    {}", user.id);
    println!("email: {}", user.email);
    if let Some(name) = &user.full_name {
        println!("name:  {}", name);
    }
    match user.role {
        UserRole::Admin => println!("role:  admin"),
        UserRole::User => println!("role:  user"),
    }
}

/// Builds the session store, falling back to in-memory when no directory is
/// available
fn build_store(cli: &Cli) -> Arc<dyn SessionStore> {
    if let Some(dir) = &cli.store_dir {
        return Arc::new(FileStore::with_dir(dir.clone()));
    }
    match FileStore::new() {
        Some(store) => Arc::new(store),
        None => {
            tracing::warn!("no store directory available, session will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = SessionCache::with_ttl(build_store(&cli), cli.ttl());

    match cli.command {
        Command::Whoami { offline } => {
            let state = if offline {
                cache.cached_user().await?
            } else {
                let client = AuthClient::new(cli.endpoint.clone()).with_token(cli.token.clone());
                cache
                    .fetch_user(Some(move || async move { client.fetch_current_user().await }))
                    .await?
            };

            match state {
                UserState::Fresh(user) => print_user(&user),
                UserState::Stale(user) => {
                    eprintln!("warning: auth service unreachable, showing cached session");
                    print_user(&user);
                }
                UserState::NoUser => println!("not signed in"),
            }
        }
        Command::Clear => {
            cache.clear().await;
            println!("session cleared");
        }
    }

    Ok(())
}

//! Command-line interface parsing for authwho
//!
//! This module handles parsing of CLI arguments using clap, including the
//! connection flags shared by all subcommands and the `whoami`/`clear`
//! commands themselves.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// authwho - View the currently authenticated user with session caching
#[derive(Parser, Debug)]
#[command(name = "authwho")]
#[command(about = "View the currently authenticated user with session caching")]
#[command(version)]
pub struct Cli {
    /// Base URL of the auth service
    #[arg(long, default_value = "http://localhost:8080")]
    pub endpoint: String,

    /// Bearer token sent with the user fetch
    #[arg(long)]
    pub token: Option<String>,

    /// Cache time-to-live in seconds
    #[arg(long, default_value_t = 60)]
    pub ttl_secs: u64,

    /// Override the session store directory (defaults to the XDG cache dir)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands supported by authwho
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the currently authenticated user
    Whoami {
        /// Answer from the cache only, without contacting the auth service
        #[arg(long)]
        offline: bool,
    },
    /// Clear the cached session (sign out locally)
    Clear,
}

impl Cli {
    /// Returns the cache time-to-live as a Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_whoami_defaults() {
        let cli = Cli::parse_from(["authwho", "whoami"]);

        assert_eq!(cli.endpoint, "http://localhost:8080");
        assert!(cli.token.is_none());
        assert_eq!(cli.ttl_secs, 60);
        assert!(cli.store_dir.is_none());
        assert!(matches!(cli.command, Command::Whoami { offline: false }));
    }

    #[test]
    fn test_cli_parse_whoami_offline() {
        let cli = Cli::parse_from(["authwho", "whoami", "--offline"]);

        assert!(matches!(cli.command, Command::Whoami { offline: true }));
    }

    #[test]
    fn test_cli_parse_clear() {
        let cli = Cli::parse_from(["authwho", "clear"]);

        assert!(matches!(cli.command, Command::Clear));
    }

    #[test]
    fn test_cli_parse_connection_flags() {
        let cli = Cli::parse_from([
            "authwho",
            "--endpoint",
            "https://auth.example.com",
            "--token",
            "t0ken",
            "--ttl-secs",
            "5",
            "whoami",
        ]);

        assert_eq!(cli.endpoint, "https://auth.example.com");
        assert_eq!(cli.token.as_deref(), Some("t0ken"));
        assert_eq!(cli.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_cli_parse_store_dir() {
        let cli = Cli::parse_from(["authwho", "--store-dir", "/tmp/session", "whoami"]);

        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/session")));
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        let result = Cli::try_parse_from(["authwho"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        let result = Cli::try_parse_from(["authwho", "frobnicate"]);

        assert!(result.is_err());
    }
}

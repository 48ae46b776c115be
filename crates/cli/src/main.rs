//! Helpdesk CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! helpdesk-cli migrate
//!
//! # Create a user
//! helpdesk-cli user create -e it.head@powergrid.in -n "IT Head" -r admin --password '...'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create users

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "helpdesk-cli")]
#[command(author, version, about = "POWERGRID IT helpdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `support`, `employee`)
        #[arg(short, long, default_value = "employee")]
        role: String,

        /// Corporate employee number
        #[arg(long)]
        employee_id: Option<String>,

        /// Initial password; omit to create a user that cannot log in yet
        #[arg(long, env = "HELPDESK_INITIAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                employee_id,
                password,
            } => {
                commands::user::create(commands::user::CreateUser {
                    email: &email,
                    name: &name,
                    role: &role,
                    employee_id: employee_id.as_deref(),
                    password: password.as_deref(),
                })
                .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "helpdesk-cli",
            "user",
            "create",
            "-e",
            "agent@powergrid.in",
            "-n",
            "Agent",
            "-r",
            "support",
            "--employee-id",
            "PG0042",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Create { .. }
            })
        ));
    }
}

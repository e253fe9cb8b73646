pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "salesdesk")]
#[command(about = "SalesDesk CLI - Command-line client for the SalesDesk API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SALESDESK_URL",
        default_value = "http://localhost:8000",
        help = "Base URL of the SalesDesk API"
    )]
    pub url: String,

    #[arg(long, global = true, env = "SALESDESK_TOKEN", help = "Bearer token from `salesdesk login`")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Log in and print a bearer token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, env = "SALESDESK_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Provision a new user (requires the admin provisioning token)")]
    CreateUser(commands::auth::CreateUserArgs),

    #[command(about = "Show the user the current token belongs to")]
    Whoami,

    #[command(about = "Send anonymous feedback")]
    Feedback {
        #[arg(help = "Your email address")]
        email: String,
        #[arg(help = "Feedback message")]
        message: String,
    },

    #[command(about = "Customer visits")]
    Visits {
        #[command(subcommand)]
        cmd: commands::visits::VisitCommands,
    },

    #[command(about = "Sales opportunities")]
    Opportunities {
        #[command(subcommand)]
        cmd: commands::opportunities::OpportunityCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token.clone())?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&client, email, password, output_format).await
        }
        Commands::CreateUser(args) => commands::auth::create_user(&client, args, output_format).await,
        Commands::Whoami => commands::auth::whoami(&client, output_format).await,
        Commands::Feedback { email, message } => {
            commands::feedback::send(&client, email, message, output_format).await
        }
        Commands::Visits { cmd } => commands::visits::handle(&client, cmd, output_format).await,
        Commands::Opportunities { cmd } => {
            commands::opportunities::handle(&client, cmd, output_format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_resource_commands() {
        let cli = Cli::try_parse_from([
            "salesdesk",
            "--json",
            "--url",
            "http://api.test",
            "visits",
            "update",
            "7",
            "--date",
            "2024-05-01",
            "--customer",
            "Acme",
            "--purpose",
            "Demo",
            "--notes",
            "ok",
        ])
        .unwrap();

        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert_eq!(cli.url, "http://api.test");
        assert!(matches!(
            cli.command,
            Commands::Visits {
                cmd: commands::visits::VisitCommands::Update { id: 7, .. }
            }
        ));
    }

    #[test]
    fn opportunity_stage_must_be_numeric() {
        let parsed = Cli::try_parse_from([
            "salesdesk",
            "opportunities",
            "create",
            "--customer",
            "Acme",
            "--description",
            "Fab line",
            "--notes",
            "",
            "--stage",
            "closing",
        ]);
        assert!(parsed.is_err());
    }
}

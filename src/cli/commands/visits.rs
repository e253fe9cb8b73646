use clap::{Args, Subcommand};
use reqwest::Method;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_rows;
use crate::cli::OutputFormat;
use crate::models::VisitRequest;

const COLUMNS: &[&str] = &["date", "customer", "purpose", "location", "notes"];

#[derive(Args)]
pub struct VisitArgs {
    #[arg(long, help = "Visit date (e.g. 2024-05-01)")]
    pub date: String,
    #[arg(long, help = "Customer name")]
    pub customer: String,
    #[arg(long, help = "Purpose of the visit")]
    pub purpose: String,
    #[arg(long, default_value = "", help = "Free-form notes")]
    pub notes: String,
    #[arg(long, help = "Where the visit took place")]
    pub location: Option<String>,
}

impl From<VisitArgs> for VisitRequest {
    fn from(args: VisitArgs) -> Self {
        VisitRequest {
            date: args.date,
            customer: args.customer,
            purpose: args.purpose,
            notes: args.notes,
            location: args.location,
        }
    }
}

#[derive(Subcommand)]
pub enum VisitCommands {
    #[command(about = "List your visits")]
    List,

    #[command(about = "Record a visit")]
    Create(VisitArgs),

    #[command(about = "Replace the fields of one of your visits")]
    Update {
        #[arg(help = "Visit ID")]
        id: i64,
        #[command(flatten)]
        visit: VisitArgs,
    },
}

pub async fn handle(client: &ApiClient, cmd: VisitCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let rows = match cmd {
        VisitCommands::List => client.data(Method::GET, "/visits", None).await?,
        VisitCommands::Create(args) => {
            let body = serde_json::to_value(VisitRequest::from(args))?;
            client.data(Method::POST, "/visits", Some(&body)).await?
        }
        VisitCommands::Update { id, visit } => {
            let body = serde_json::to_value(VisitRequest::from(visit))?;
            client.data(Method::PUT, &format!("/visits/{}", id), Some(&body)).await?
        }
    };

    output_rows(output_format, "visits", rows, COLUMNS)
}

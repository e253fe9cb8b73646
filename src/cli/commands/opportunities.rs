use clap::{Args, Subcommand};
use reqwest::Method;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_rows;
use crate::cli::OutputFormat;
use crate::models::OpportunityRequest;

const COLUMNS: &[&str] = &["customer", "stage", "description", "notes"];

#[derive(Args)]
pub struct OpportunityArgs {
    #[arg(long, help = "Customer name")]
    pub customer: String,
    #[arg(long, help = "What is being sold")]
    pub description: String,
    #[arg(long, default_value = "", help = "Free-form notes")]
    pub notes: String,
    #[arg(long, help = "Pipeline stage number")]
    pub stage: i32,
}

impl From<OpportunityArgs> for OpportunityRequest {
    fn from(args: OpportunityArgs) -> Self {
        OpportunityRequest {
            customer: args.customer,
            description: args.description,
            notes: args.notes,
            stage: args.stage,
        }
    }
}

#[derive(Subcommand)]
pub enum OpportunityCommands {
    #[command(about = "List your opportunities")]
    List,

    #[command(about = "Open an opportunity")]
    Create(OpportunityArgs),

    #[command(about = "Replace the fields of one of your opportunities")]
    Update {
        #[arg(help = "Opportunity ID")]
        id: i64,
        #[command(flatten)]
        opportunity: OpportunityArgs,
    },
}

pub async fn handle(client: &ApiClient, cmd: OpportunityCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let rows = match cmd {
        OpportunityCommands::List => client.data(Method::GET, "/opportunities", None).await?,
        OpportunityCommands::Create(args) => {
            let body = serde_json::to_value(OpportunityRequest::from(args))?;
            client.data(Method::POST, "/opportunity", Some(&body)).await?
        }
        OpportunityCommands::Update { id, opportunity } => {
            let body = serde_json::to_value(OpportunityRequest::from(opportunity))?;
            client
                .data(Method::PUT, &format!("/opportunity/{}", id), Some(&body))
                .await?
        }
    };

    output_rows(output_format, "opportunities", rows, COLUMNS)
}

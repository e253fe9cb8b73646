use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::models::FeedbackRequest;

pub async fn send(client: &ApiClient, email: String, message: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let (status, body) = client
        .post("/feedback", &FeedbackRequest { user_email: email, message })
        .await?;

    if !status.is_success() {
        output_error(output_format, body["message"].as_str().unwrap_or("Failed to send feedback"), None)?;
        anyhow::bail!("feedback rejected ({})", status);
    }

    output_success(output_format, "Feedback sent", Some(json!({ "data": body["data"] })))
}

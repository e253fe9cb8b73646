use clap::Args;
use reqwest::Method;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::models::{CreateUserRequest, LoginRequest};

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(help = "Email address")]
    pub email: String,
    #[arg(long, help = "Initial password")]
    pub password: String,
    #[arg(long, help = "Display name")]
    pub name: String,
    #[arg(long, default_value = "sales", help = "Role")]
    pub role: String,
    #[arg(long, env = "ADMIN_PROVISIONING_TOKEN", help = "Admin provisioning token")]
    pub admin_token: String,
}

pub async fn login(client: &ApiClient, email: String, password: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, body) = client.post("/login", &LoginRequest { email, password }).await?;

    if body.get("success").and_then(Value::as_bool) != Some(true) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Login failed");
        output_error(output_format, message, None)?;
        anyhow::bail!("login failed");
    }

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
        // Bare token so `export SALESDESK_TOKEN=$(salesdesk login ...)` works
        OutputFormat::Text => println!("{}", body["token"].as_str().unwrap_or_default()),
    }
    Ok(())
}

pub async fn create_user(client: &ApiClient, args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let request = CreateUserRequest {
        email: args.email,
        password: args.password,
        name: args.name,
        role: args.role,
        admin_token: args.admin_token,
    };
    let (_, body) = client.post("/create-user", &request).await?;

    if let Some(error) = body.get("error").and_then(Value::as_str) {
        output_error(output_format, error, body.get("details").and_then(Value::as_str))?;
        anyhow::bail!("user provisioning failed");
    }

    output_success(
        output_format,
        &format!("Created user {}", request.email),
        Some(json!({ "user": body["user"] })),
    )
}

pub async fn whoami(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let user = client.data(Method::GET, "/me", None).await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => {
            println!("ID: {}", user["id"].as_str().unwrap_or("-"));
            println!("Email: {}", user["email"].as_str().unwrap_or("-"));
            println!("Name: {}", user["name"].as_str().unwrap_or("-"));
            println!("Role: {}", user["role"].as_str().unwrap_or("-"));
        }
    }
    Ok(())
}

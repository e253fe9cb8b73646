use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(fields)) = (data, response.as_object_mut()) {
                fields.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, details: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(details) = details {
                response["details"] = json!(details);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => match details {
            Some(details) => eprintln!("Error: {} ({})", message, details),
            None => eprintln!("Error: {}", message),
        },
    }
    Ok(())
}

/// Output rows returned by the API, one line per row in text mode
pub fn output_rows(output_format: OutputFormat, collection_name: &str, rows: Value, columns: &[&str]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: rows }))?);
        }
        OutputFormat::Text => {
            let rows = rows.as_array().cloned().unwrap_or_default();
            if rows.is_empty() {
                println!("No {} found", collection_name);
            }
            for row in &rows {
                println!("{}", format_row(row, columns));
            }
        }
    }
    Ok(())
}

/// `id` followed by the requested columns, tab separated
fn format_row(row: &Value, columns: &[&str]) -> String {
    std::iter::once("id")
        .chain(columns.iter().copied())
        .map(|column| match row.get(column) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

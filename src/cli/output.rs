use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Prints a command result. Text mode prints `text`; JSON mode merges `data`
/// into a `{"success": true}` object.
pub fn output_result(
    output_format: OutputFormat,
    text: &str,
    data: Map<String, Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.extend(data);
            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

/// Prints a failure. Callers decide the exit status.
pub fn output_error(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({ "success": false, "error": message });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
    Ok(())
}

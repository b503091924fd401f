pub mod init;
pub mod issue;
pub mod keys;
pub mod status;
pub mod verify;
pub mod wellknown;

use serde::Deserialize;
use serde_json::Value;

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Read a JSON argument given inline or as a path to a file.
///
/// A value that is not JSON is taken as a bare string, so a compact JWT can
/// be passed directly.
pub fn read_json_arg(arg: &str) -> anyhow::Result<Value> {
    let text = if std::path::Path::new(arg).is_file() {
        std::fs::read_to_string(arg)?
    } else {
        arg.to_string()
    };
    let trimmed = text.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(_) if !trimmed.starts_with('{') && !trimmed.starts_with('[') => {
            Ok(Value::String(trimmed.to_string()))
        }
        Err(e) => Err(anyhow::anyhow!("invalid JSON: {}", e)),
    }
}

/// Turn a non-success response into an error carrying the node's message.
pub async fn fail(action: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}): {}", action, status, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", action, status),
    }
}

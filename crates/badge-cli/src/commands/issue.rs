//! `badge issue`: Issue a signed credential.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{read_json_arg, DEFAULT_ENDPOINT};

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jsonld,
    Jwt,
}

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Unsigned credential JSON (inline or path to file).
    #[arg(short, long)]
    pub credential: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Jsonld)]
    pub format: Format,

    /// Signing key id (defaults to the newest active key).
    #[arg(short, long)]
    pub key_id: Option<String>,

    /// Write the signed credential to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueRequest {
    credential: Value,
    format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,
}

#[derive(Deserialize)]
struct IssueResponse {
    credential: Value,
}

fn render(credential: &Value) -> anyhow::Result<String> {
    Ok(match credential {
        Value::String(token) => token.clone(),
        other => serde_json::to_string_pretty(other)?,
    })
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let credential = read_json_arg(&args.credential)?;
    let url = format!("{}/api/v1/credentials/issue", args.endpoint);
    let body = IssueRequest {
        credential,
        format: args.format,
        key_id: args.key_id.clone(),
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await?;
    if !resp.status().is_success() {
        return Err(super::fail("issuance", resp).await);
    }

    let issued: IssueResponse = resp.json().await?;
    let rendered = render(&issued.credential)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("Credential written to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

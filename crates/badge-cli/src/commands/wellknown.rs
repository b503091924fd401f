//! `badge did` / `badge jwks`: Fetch the node's well-known documents.

use clap::Args;
use serde_json::Value;

use super::DEFAULT_ENDPOINT;

pub const DID_PATH: &str = "/.well-known/did.json";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

#[derive(Args, Debug)]
pub struct WellKnownArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &WellKnownArgs, path: &str) -> anyhow::Result<()> {
    let url = format!("{}{}", args.endpoint, path);
    let resp = reqwest::get(&url).await?;
    if !resp.status().is_success() {
        return Err(super::fail("fetching document", resp).await);
    }
    let document: Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

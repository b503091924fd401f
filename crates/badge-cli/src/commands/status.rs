//! `badge status`: Query the health of a running badge node.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    did: String,
    active_key: bool,
    trusted_issuers: usize,
    uptime_secs: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/health", args.endpoint);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let health: HealthResponse = r.json().await?;
            println!("Node Status:      {}", health.status);
            println!("  Version:        {}", health.version);
            println!("  DID:            {}", health.did);
            println!("  Active key:     {}", if health.active_key { "yes" } else { "no" });
            println!("  Trusted issuers: {}", health.trusted_issuers);
            println!("  Uptime:         {}s", health.uptime_secs);
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: badge-node");
        }
    }

    Ok(())
}

//! `badge keys`: List, generate and toggle the node's signing keys.

use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,

    /// API endpoint of the node.
    #[arg(short, long, global = true, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// List every key with its status.
    List,
    /// Generate a new active key.
    Generate {
        /// Key id, used as the JWK `kid` and DID URL fragment.
        id: String,
        #[arg(short = 't', long = "type", value_enum, default_value_t = KeyType::Ed25519)]
        key_type: KeyType,
    },
    /// Publish a key again.
    Activate { id: String },
    /// Withdraw a key from the DID document and JWK Set.
    Deactivate { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum, Serialize)]
pub enum KeyType {
    #[value(name = "ed25519")]
    Ed25519,
    #[value(name = "rsa")]
    #[serde(rename = "RSA")]
    Rsa,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeySummary {
    id: String,
    #[serde(rename = "type")]
    key_type: String,
    status: String,
    created_at: String,
}

#[derive(Deserialize)]
struct KeysResponse {
    did: String,
    keys: Vec<KeySummary>,
}

fn key_line(key: &KeySummary) -> String {
    format!(
        "  {:<16} {:<8} {:<9} {}",
        key.id, key.key_type, key.status, key.created_at
    )
}

pub async fn run(args: &KeysArgs) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let base = format!("{}/api/v1/keys", args.endpoint);

    let (action, resp) = match &args.command {
        KeysCommand::List => {
            let resp = client.get(&base).send().await?;
            if !resp.status().is_success() {
                return Err(super::fail("listing keys", resp).await);
            }
            let listing: KeysResponse = resp.json().await?;
            println!("Keys of {}:", listing.did);
            for key in &listing.keys {
                println!("{}", key_line(key));
            }
            return Ok(());
        }
        KeysCommand::Generate { id, key_type } => (
            "key generation",
            client
                .post(&base)
                .json(&json!({"id": id, "type": key_type}))
                .send()
                .await?,
        ),
        KeysCommand::Activate { id } => (
            "activation",
            client
                .put(format!("{}/{}/status", base, id))
                .json(&json!({"status": "active"}))
                .send()
                .await?,
        ),
        KeysCommand::Deactivate { id } => (
            "deactivation",
            client
                .put(format!("{}/{}/status", base, id))
                .json(&json!({"status": "inactive"}))
                .send()
                .await?,
        ),
    };

    if !resp.status().is_success() {
        return Err(super::fail(action, resp).await);
    }
    let key: KeySummary = resp.json().await?;
    println!("{}", key_line(&key));
    Ok(())
}

//! `badge init`: Write a default node configuration.

use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Host the node's did:web identifier is built from.
    #[arg(long, default_value = "localhost:9101")]
    pub did_host: String,
}

fn default_config(did_host: &str) -> String {
    format!(
        r#"# Badge Node Configuration

[api]
listen_addr = "127.0.0.1"
port = 9101

[storage]
backend = "rocksdb"
data_dir = "./data"

[keys]
did_host = "{}"
initial_key_type = "Ed25519"
initial_key_id = "default"
rsa_bits = 2048

[verification]
collaborator_timeout_ms = 5000
trusted_issuers = []

[logging]
level = "info"
format = "text"
"#,
        did_host
    )
}

fn write_config(dir: &Path, did_host: &str) -> anyhow::Result<PathBuf> {
    let config_path = dir.join("badge.toml");
    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(&config_path, default_config(did_host))?;
    std::fs::create_dir_all(dir.join("data"))?;
    Ok(config_path)
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = write_config(&args.dir, &args.did_host)?;
    println!("Initialized badge node at {}", config_path.display());
    println!("Edit badge.toml to customize your configuration.");
    println!("Run 'badge-node --config {}' to start the node.", config_path.display());
    Ok(())
}

//! Badge CLI: command-line client for a running badge node.
//!
//! Subcommands: init, status, verify, issue, keys, did, jwks.

mod commands;

use clap::{Parser, Subcommand};

/// Open Badges issuer and verifier.
#[derive(Parser, Debug)]
#[command(name = "badge", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default node configuration.
    Init(commands::init::InitArgs),
    /// Query the health of a running node.
    Status(commands::status::StatusArgs),
    /// Verify a credential.
    Verify(commands::verify::VerifyArgs),
    /// Issue a signed credential.
    Issue(commands::issue::IssueArgs),
    /// Manage the node's signing keys.
    Keys(commands::keys::KeysArgs),
    /// Print the node's DID document.
    Did(commands::wellknown::WellKnownArgs),
    /// Print the node's public JWK Set.
    Jwks(commands::wellknown::WellKnownArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Keys(args) => commands::keys::run(args).await,
        Commands::Did(args) => commands::wellknown::run(args, commands::wellknown::DID_PATH).await,
        Commands::Jwks(args) => commands::wellknown::run(args, commands::wellknown::JWKS_PATH).await,
    }
}

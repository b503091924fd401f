//! `badge verify`: Verify a credential.

use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{read_json_arg, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential JSON or compact JWT (inline or path to file).
    #[arg(short, long)]
    pub credential: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long)]
    pub skip_proof: bool,

    #[arg(long)]
    pub skip_status: bool,

    #[arg(long)]
    pub skip_temporal: bool,

    #[arg(long)]
    pub skip_issuer: bool,

    /// Accept expired credentials.
    #[arg(long)]
    pub allow_expired: bool,

    /// Clock skew tolerance in seconds.
    #[arg(long, default_value_t = 0)]
    pub clock_tolerance: u64,

    /// Print the raw JSON result.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOptions {
    skip_proof_verification: bool,
    skip_status_check: bool,
    skip_temporal_validation: bool,
    skip_issuer_verification: bool,
    allow_expired: bool,
    clock_tolerance: u64,
}

#[derive(Serialize)]
struct VerifyRequest {
    credential: Value,
    options: VerifyOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    status: String,
    is_valid: bool,
    checks: Map<String, Value>,
    #[serde(default)]
    credential_id: Option<String>,
    #[serde(default)]
    issuer: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct Check {
    check: String,
    passed: bool,
    #[serde(default)]
    details: Option<Map<String, Value>>,
}

fn request(args: &VerifyArgs, credential: Value) -> VerifyRequest {
    VerifyRequest {
        credential,
        options: VerifyOptions {
            skip_proof_verification: args.skip_proof,
            skip_status_check: args.skip_status,
            skip_temporal_validation: args.skip_temporal,
            skip_issuer_verification: args.skip_issuer,
            allow_expired: args.allow_expired,
            clock_tolerance: args.clock_tolerance,
        },
    }
}

fn check_line(check: &Check) -> String {
    let icon = if check.passed { "PASS" } else { "FAIL" };
    let reason = check
        .details
        .as_ref()
        .and_then(|d| d.get("reason"))
        .and_then(Value::as_str);
    match reason {
        Some(reason) => format!("  [{}] {}: {}", icon, check.check, reason),
        None => format!("  [{}] {}", icon, check.check),
    }
}

fn print_result(result: &VerifyResponse) -> anyhow::Result<()> {
    if result.status == "error" {
        println!("Credential REJECTED: {}", result.error.as_deref().unwrap_or("unknown error"));
    } else if result.is_valid {
        println!("Credential is VALID");
    } else {
        println!("Credential is INVALID");
    }
    if let Some(id) = &result.credential_id {
        println!("  Credential: {}", id);
    }
    if let Some(issuer) = &result.issuer {
        println!("  Issuer:     {}", issuer);
    }
    println!();
    for category in ["temporal", "proof", "issuer", "status"] {
        let Some(checks) = result.checks.get(category) else {
            continue;
        };
        let checks: Vec<Check> = serde_json::from_value(checks.clone())?;
        for check in &checks {
            println!("{}", check_line(check));
        }
    }
    Ok(())
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let credential = read_json_arg(&args.credential)?;
    let url = format!("{}/api/v1/credentials/verify", args.endpoint);

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&request(args, credential)).send().await?;

    // Rejected credentials come back as 400 with a full result body.
    let status = resp.status();
    let body: Value = resp.json().await?;
    if !status.is_success() && body.get("isValid").is_none() {
        let error = body.get("error").and_then(Value::as_str).unwrap_or_default();
        anyhow::bail!("verification failed (HTTP {}): {}", status, error);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_result(&serde_json::from_value(body)?)?;
    }
    Ok(())
}

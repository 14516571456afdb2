//! State file management and argument parsing

use anyhow::{Context, Result};
use primitive_types::U256;
use riptide::{Address, Exchange};
use std::fs;
use std::path::Path;

/// Load the deployment from the state file
pub fn load(path: &Path) -> Result<Exchange> {
    if !path.exists() {
        anyhow::bail!(
            "State file not found: {}\n\
             Create a deployment with: riptide --state {} init",
            path.display(),
            path.display()
        );
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;

    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Write the deployment back to the state file
pub fn save(path: &Path, exchange: &Exchange) -> Result<()> {
    let data = serde_json::to_string_pretty(exchange).context("Failed to serialize state")?;
    fs::write(path, data)
        .with_context(|| format!("Failed to write state file: {}", path.display()))
}

/// Parse an address argument: decimal, or hex with an 0x prefix
pub fn parse_address(arg: &str) -> Result<Address> {
    parse_amount(arg).map(Address)
}

/// Parse an amount argument: decimal, or hex with an 0x prefix
pub fn parse_amount(arg: &str) -> Result<U256> {
    if let Some(hex) = arg.strip_prefix("0x") {
        U256::from_str_radix(hex, 16).with_context(|| format!("Invalid hex amount: {}", arg))
    } else {
        U256::from_dec_str(arg).with_context(|| format!("Invalid amount: {}", arg))
    }
}

/// Resolve an optional address argument, defaulting to the admin account
pub fn caller_or_admin(exchange: &Exchange, arg: Option<&str>) -> Result<Address> {
    match arg {
        Some(value) => parse_address(value),
        None => Ok(exchange.admin()),
    }
}

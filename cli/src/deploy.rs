//! Deployment operations: accounts, tokens, pools, whitelist, approvals

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::state;
use riptide::Exchange;

pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("State file already exists: {}", path.display());
    }

    let exchange = Exchange::new();
    state::save(path, &exchange)?;

    println!("{}", "=== Deployment Created ===".bright_green().bold());
    println!("{} {}", "Admin:".bright_cyan(), exchange.admin());
    println!("{} {}", "Router:".bright_cyan(), exchange.router.address());
    println!("{} {}", "State:".bright_cyan(), path.display());
    Ok(())
}

pub fn account(path: &Path) -> Result<()> {
    let mut exchange = state::load(path)?;
    let address = exchange.deploy_account();
    state::save(path, &exchange)?;

    println!("{}", "=== Account Deployed ===".bright_green().bold());
    println!("{} {}", "Address:".bright_cyan(), address);
    Ok(())
}

pub fn token(
    path: &Path,
    name: &str,
    symbol: &str,
    decimals: u8,
    supply: &str,
    owner: Option<&str>,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let supply = state::parse_amount(supply)?;
    let owner = state::caller_or_admin(&exchange, owner)?;

    let address = exchange.deploy_token(name, symbol, decimals, supply, owner);
    state::save(path, &exchange)?;

    println!("{}", "=== Token Deployed ===".bright_green().bold());
    println!("{} {} ({})", "Token:".bright_cyan(), name, symbol);
    println!("{} {}", "Address:".bright_cyan(), address);
    println!("{} {}", "Supply:".bright_cyan(), supply);
    println!("{} {}", "Owner:".bright_cyan(), owner);
    Ok(())
}

pub fn pool(path: &Path, token_a: &str, token_b: &str) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token_a = state::parse_address(token_a)?;
    let token_b = state::parse_address(token_b)?;

    let address = exchange.deploy_pool(token_a, token_b)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Pool Deployed ===".bright_green().bold());
    println!("{} {}", "Address:".bright_cyan(), address);
    println!("{} {}", "Token0:".bright_cyan(), token_a);
    println!("{} {}", "Token1:".bright_cyan(), token_b);
    println!(
        "\n{}",
        "Whitelist it before routing: riptide whitelist --pool <address>".dimmed()
    );
    Ok(())
}

pub fn whitelist(path: &Path, pool: &str, caller: Option<&str>) -> Result<()> {
    let mut exchange = state::load(path)?;
    let pool = state::parse_address(pool)?;
    let caller = state::caller_or_admin(&exchange, caller)?;

    exchange.whitelist_pool(caller, pool)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Pool Whitelisted ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), pool);
    Ok(())
}

pub fn approve(
    path: &Path,
    token: &str,
    owner: Option<&str>,
    spender: Option<&str>,
    amount: &str,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token = state::parse_address(token)?;
    let owner = state::caller_or_admin(&exchange, owner)?;
    let spender = match spender {
        Some(value) => state::parse_address(value)?,
        None => exchange.router.address(),
    };
    let amount = state::parse_amount(amount)?;

    exchange.approve(token, owner, spender, amount)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Approval Set ===".bright_green().bold());
    println!("{} {}", "Token:".bright_cyan(), token);
    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Spender:".bright_cyan(), spender);
    println!("{} {}", "Amount:".bright_cyan(), amount);
    Ok(())
}

pub fn approve_lp(
    path: &Path,
    pool: &str,
    owner: Option<&str>,
    spender: Option<&str>,
    amount: &str,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let pool = state::parse_address(pool)?;
    let owner = state::caller_or_admin(&exchange, owner)?;
    let spender = match spender {
        Some(value) => state::parse_address(value)?,
        None => exchange.router.address(),
    };
    let amount = state::parse_amount(amount)?;

    exchange.lp_approve(pool, owner, spender, amount)?;
    state::save(path, &exchange)?;

    println!("{}", "=== LP Approval Set ===".bright_green().bold());
    println!("{} {}", "Pool:".bright_cyan(), pool);
    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Spender:".bright_cyan(), spender);
    println!("{} {}", "Amount:".bright_cyan(), amount);
    Ok(())
}

pub fn transfer(
    path: &Path,
    token: &str,
    from: Option<&str>,
    to: &str,
    amount: &str,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token = state::parse_address(token)?;
    let from = state::caller_or_admin(&exchange, from)?;
    let to = state::parse_address(to)?;
    let amount = state::parse_amount(amount)?;

    exchange.transfer(token, from, to, amount)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Transfer ===".bright_green().bold());
    println!("{} {}", "Token:".bright_cyan(), token);
    println!("{} {} -> {}", "Route:".bright_cyan(), from, to);
    println!("{} {}", "Amount:".bright_cyan(), amount);
    Ok(())
}

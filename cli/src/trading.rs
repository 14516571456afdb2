//! Quoting and swapping

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::state;

pub fn quote_out(path: &Path, token_in: &str, token_out: &str, amount_in: &str) -> Result<()> {
    let exchange = state::load(path)?;
    let token_in = state::parse_address(token_in)?;
    let token_out = state::parse_address(token_out)?;
    let amount_in = state::parse_amount(amount_in)?;

    let amount_out = exchange.quote_amount_out(token_in, token_out, amount_in)?;

    println!("{}", "=== Quote: Exact Input ===".bright_green().bold());
    println!("{} {}", "Amount in:".bright_cyan(), amount_in);
    println!("{} {}", "Amount out:".bright_cyan(), amount_out);
    Ok(())
}

pub fn quote_in(path: &Path, token_in: &str, token_out: &str, amount_out: &str) -> Result<()> {
    let exchange = state::load(path)?;
    let token_in = state::parse_address(token_in)?;
    let token_out = state::parse_address(token_out)?;
    let amount_out = state::parse_amount(amount_out)?;

    let amount_in = exchange.quote_amount_in(token_in, token_out, amount_out)?;

    println!("{}", "=== Quote: Exact Output ===".bright_green().bold());
    println!("{} {}", "Amount out:".bright_cyan(), amount_out);
    println!("{} {}", "Amount in:".bright_cyan(), amount_in);
    Ok(())
}

pub fn swap(
    path: &Path,
    token_in: &str,
    token_out: &str,
    amount_in: &str,
    min_out: &str,
    caller: Option<&str>,
) -> Result<()> {
    let mut exchange = state::load(path)?;
    let token_in = state::parse_address(token_in)?;
    let token_out = state::parse_address(token_out)?;
    let amount_in = state::parse_amount(amount_in)?;
    let min_out = state::parse_amount(min_out)?;
    let caller = state::caller_or_admin(&exchange, caller)?;

    let amount_out = exchange.exact_input(caller, token_in, token_out, amount_in, min_out)?;
    state::save(path, &exchange)?;

    println!("{}", "=== Swap Executed ===".bright_green().bold());
    println!("{} {}", "Amount in:".bright_cyan(), amount_in);
    println!("{} {}", "Amount out:".bright_cyan(), amount_out);
    println!("{} {}", "Recipient:".bright_cyan(), caller);
    Ok(())
}

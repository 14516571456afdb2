//! Deployment inspection

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::state;

pub fn show(path: &Path) -> Result<()> {
    let exchange = state::load(path)?;

    println!("{}", "=== Deployment ===".bright_green().bold());
    println!("{} {}", "Admin:".bright_cyan(), exchange.admin());
    println!("{} {}", "Router:".bright_cyan(), exchange.router.address());

    println!("\n{}", "Tokens".bright_green().bold());
    let mut tokens: Vec<_> = exchange.bank.iter().collect();
    tokens.sort_by_key(|(address, _)| **address);
    for (address, token) in tokens {
        println!(
            "  {} {} ({}) supply {}",
            address,
            token.name,
            token.symbol,
            token.total_supply
        );
    }

    println!("\n{}", "Pools".bright_green().bold());
    let mut pools: Vec<_> = exchange.pools.values().collect();
    pools.sort_by_key(|pool| pool.address());
    for pool in pools {
        let (reserve0, reserve1) = pool.get_reserves();
        let whitelisted = exchange.verify_pool_is_whitelisted(pool.address()).is_ok();
        println!(
            "  {} {} / {} reserves {} : {} supply {}{}",
            pool.address(),
            pool.token0(),
            pool.token1(),
            reserve0,
            reserve1,
            pool.total_supply(),
            if whitelisted { "" } else { " (not whitelisted)" }
        );
    }

    Ok(())
}

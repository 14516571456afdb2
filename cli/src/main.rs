//! Riptide CLI - deployment and driver tool for the AMM engine
//!
//! Operates a persistent in-process deployment: tokens, pools, the router
//! and every account balance live in a JSON state file that each command
//! loads, mutates and writes back.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod deploy;
mod inspect;
mod liquidity;
mod state;
mod trading;

#[derive(Parser)]
#[command(name = "riptide")]
#[command(about = "Riptide AMM CLI - deploy tokens and pools, provide liquidity, swap", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the deployment state file
    #[arg(short, long, default_value = "riptide-state.json")]
    state: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh deployment (admin account + router)
    Init,

    /// Deploy a new externally-owned account address
    Account,

    /// Deploy a token and credit its supply to an owner
    DeployToken {
        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Decimals
        #[arg(short, long, default_value = "18")]
        decimals: u8,

        /// Initial supply (base units)
        #[arg(long)]
        supply: String,

        /// Owner address (defaults to the admin account)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Deploy an empty pool over two tokens
    DeployPool {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,
    },

    /// Whitelist a pool on the router (owner only)
    Whitelist {
        /// Pool address
        #[arg(long)]
        pool: String,

        /// Caller address (defaults to the admin account)
        #[arg(long)]
        caller: Option<String>,
    },

    /// Approve the router (or any spender) to pull tokens
    Approve {
        #[arg(long)]
        token: String,

        /// Owner granting the allowance (defaults to the admin account)
        #[arg(long)]
        owner: Option<String>,

        /// Spender (defaults to the router)
        #[arg(long)]
        spender: Option<String>,

        #[arg(long)]
        amount: String,
    },

    /// Approve the router (or any spender) to pull LP shares
    ApproveLp {
        #[arg(long)]
        pool: String,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        spender: Option<String>,

        #[arg(long)]
        amount: String,
    },

    /// Transfer tokens between accounts
    Transfer {
        #[arg(long)]
        token: String,

        /// Sender (defaults to the admin account)
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: String,
    },

    /// Liquidity operations
    Liquidity {
        #[command(subcommand)]
        command: LiquidityCommands,
    },

    /// Quote swap amounts against current reserves
    Quote {
        #[command(subcommand)]
        command: QuoteCommands,
    },

    /// Swap an exact input for at least a minimum output
    Swap {
        #[arg(long)]
        token_in: String,

        #[arg(long)]
        token_out: String,

        #[arg(long)]
        amount_in: String,

        #[arg(long)]
        min_out: String,

        /// Caller address (defaults to the admin account)
        #[arg(long)]
        caller: Option<String>,
    },

    /// Show the deployment: tokens, pools, reserves, whitelist
    Show,
}

#[derive(Subcommand)]
enum LiquidityCommands {
    /// Seed an empty pool with its first liquidity
    Init {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        #[arg(long)]
        amount_a: String,

        #[arg(long)]
        amount_b: String,

        #[arg(long)]
        caller: Option<String>,

        /// LP share recipient (defaults to the caller)
        #[arg(long)]
        to: Option<String>,
    },

    /// Add liquidity to a live pool at the current price
    Add {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        #[arg(long)]
        amount_a: String,

        #[arg(long)]
        amount_b: String,

        #[arg(long)]
        caller: Option<String>,
    },

    /// Remove liquidity with minimum-amount slippage guards
    Remove {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        #[arg(long)]
        liquidity: String,

        #[arg(long)]
        min_a: String,

        #[arg(long)]
        min_b: String,

        #[arg(long)]
        caller: Option<String>,

        /// Token recipient (defaults to the caller)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Output for an exact input
    Out {
        #[arg(long)]
        token_in: String,

        #[arg(long)]
        token_out: String,

        #[arg(long)]
        amount_in: String,
    },

    /// Input required for an exact output
    In {
        #[arg(long)]
        token_in: String,

        #[arg(long)]
        token_out: String,

        #[arg(long)]
        amount_out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Init => deploy::init(&cli.state),
        Commands::Account => deploy::account(&cli.state),
        Commands::DeployToken {
            name,
            symbol,
            decimals,
            supply,
            owner,
        } => deploy::token(&cli.state, &name, &symbol, decimals, &supply, owner.as_deref()),
        Commands::DeployPool { token_a, token_b } => {
            deploy::pool(&cli.state, &token_a, &token_b)
        }
        Commands::Whitelist { pool, caller } => {
            deploy::whitelist(&cli.state, &pool, caller.as_deref())
        }
        Commands::Approve {
            token,
            owner,
            spender,
            amount,
        } => deploy::approve(&cli.state, &token, owner.as_deref(), spender.as_deref(), &amount),
        Commands::ApproveLp {
            pool,
            owner,
            spender,
            amount,
        } => deploy::approve_lp(&cli.state, &pool, owner.as_deref(), spender.as_deref(), &amount),
        Commands::Transfer {
            token,
            from,
            to,
            amount,
        } => deploy::transfer(&cli.state, &token, from.as_deref(), &to, &amount),
        Commands::Liquidity { command } => match command {
            LiquidityCommands::Init {
                token_a,
                token_b,
                amount_a,
                amount_b,
                caller,
                to,
            } => liquidity::init(
                &cli.state,
                &token_a,
                &token_b,
                &amount_a,
                &amount_b,
                caller.as_deref(),
                to.as_deref(),
            ),
            LiquidityCommands::Add {
                token_a,
                token_b,
                amount_a,
                amount_b,
                caller,
            } => liquidity::add(
                &cli.state,
                &token_a,
                &token_b,
                &amount_a,
                &amount_b,
                caller.as_deref(),
            ),
            LiquidityCommands::Remove {
                token_a,
                token_b,
                liquidity,
                min_a,
                min_b,
                caller,
                to,
            } => liquidity::remove(
                &cli.state,
                &token_a,
                &token_b,
                &liquidity,
                &min_a,
                &min_b,
                caller.as_deref(),
                to.as_deref(),
            ),
        },
        Commands::Quote { command } => match command {
            QuoteCommands::Out {
                token_in,
                token_out,
                amount_in,
            } => trading::quote_out(&cli.state, &token_in, &token_out, &amount_in),
            QuoteCommands::In {
                token_in,
                token_out,
                amount_out,
            } => trading::quote_in(&cli.state, &token_in, &token_out, &amount_out),
        },
        Commands::Swap {
            token_in,
            token_out,
            amount_in,
            min_out,
            caller,
        } => trading::swap(
            &cli.state,
            &token_in,
            &token_out,
            &amount_in,
            &min_out,
            caller.as_deref(),
        ),
        Commands::Show => inspect::show(&cli.state),
    }
}

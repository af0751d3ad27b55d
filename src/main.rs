/// v4swap command line front-end
///
/// Usage:
/// v4swap pool
/// v4swap balances
/// v4swap quote 1.5
/// v4swap swap 1.5 --yes
/// v4swap --config data/config.toml --debug swap --debug allowance swap 0.1
///
/// The signing key is read from the V4SWAP_PRIVATE_KEY environment variable.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;
use v4swap::{
    amounts::TokenAmount,
    chain::AlloyChain,
    config::{load_config_from_path, Config, CONFIG_FILE_PATH, PRIVATE_KEY_ENV},
    logger::{self, LogTag, LoggerConfig},
    pool::{PoolInfo, PoolKey},
    swaps::{
        amount_out_minimum, config::SLIPPAGE_TOLERANCE_BPS, ApprovalStep, Quote,
        SwapExecutionState, SwapOrchestrator,
    },
    utils::SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "v4swap", version)]
#[command(about = "Swap tokens through a Uniswap v4 pool via the Universal Router")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Enable debug output for a log tag (repeatable, "all" for every tag)
    #[arg(long = "debug", value_name = "TAG", global = true)]
    debug: Vec<String>,

    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the configured pool and its id
    Pool,
    /// Show both token balances of the signing account
    Balances,
    /// Quote selling an amount of the input token
    Quote {
        /// Amount of the input token, in whole units ("1.5")
        amount: String,
    },
    /// Quote, approve as needed, and execute a swap
    Swap {
        /// Amount of the input token, in whole units ("1.5")
        amount: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (logger_config, unknown) =
        LoggerConfig::from_switches(cli.debug.iter().map(String::as_str), cli.verbose);
    logger::init(logger_config);
    for tag in unknown {
        logger::warning(LogTag::System, &format!("Unknown debug tag '{}' ignored", tag));
    }

    if let Err(e) = run(cli).await {
        logger::error(LogTag::System, &format!("{:#}", e));
        eprintln!("\n{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config_from_path(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    match cli.command {
        Commands::Pool => show_pool(&config, cli.json),
        Commands::Balances => {
            let orchestrator = connect(config).await?;
            let snapshot = orchestrator.refresh_balances().await;
            if cli.json {
                print_json(&snapshot)
            } else {
                print_header("BALANCES");
                println!("Account: {}", snapshot.owner);
                println!("{}", snapshot);
                Ok(())
            }
        }
        Commands::Quote { amount } => {
            let orchestrator = connect(config.clone()).await?;
            quote(&orchestrator, &config, &amount, cli.json).await
        }
        Commands::Swap { amount, yes } => {
            let orchestrator = connect(config.clone()).await?;
            swap(&orchestrator, &config, &amount, yes, cli.json).await
        }
    }
}

async fn connect(config: Config) -> Result<SwapOrchestrator> {
    let private_key = std::env::var(PRIVATE_KEY_ENV)
        .with_context(|| format!("{} must hold the signing key", PRIVATE_KEY_ENV))?;
    let chain = Arc::new(AlloyChain::connect(&config.rpc.url, &private_key).await?);

    let chain_id = chain.chain_id().await?;
    logger::info(LogTag::Chain, &format!("Chain id {}", chain_id));

    let orchestrator =
        SwapOrchestrator::new(config, chain.clone(), chain, Arc::new(SystemClock))?;
    Ok(orchestrator)
}

fn show_pool(config: &Config, json: bool) -> Result<()> {
    let key = PoolKey::from_config(config)?;
    let info = PoolInfo::new(&key, config);
    if json {
        return print_json(&info);
    }
    print_header("POOL INFORMATION");
    println!("{}", info);
    Ok(())
}

async fn quote(
    orchestrator: &SwapOrchestrator,
    config: &Config,
    amount: &str,
    json: bool,
) -> Result<()> {
    let amount_in = orchestrator.parse_input_amount(amount)?;
    let quote = orchestrator.request_quote(amount_in).await?;
    let approvals = orchestrator.pending_approvals().await?;

    let minimum = amount_out_minimum(quote.amount_out, SLIPPAGE_TOLERANCE_BPS);

    if json {
        #[derive(Serialize)]
        struct QuoteReport<'a> {
            quote: &'a Quote,
            amount_out_minimum: String,
            approvals: Vec<ApprovalStep>,
        }
        return print_json(&QuoteReport {
            quote: &quote,
            amount_out_minimum: minimum.to_string(),
            approvals: approvals.required(),
        });
    }

    let input = &config.tokens.input;
    let output = &config.tokens.output;

    print_header("QUOTE");
    println!(
        "Sell:        {} {}",
        TokenAmount::new(quote.amount_in, input.decimals),
        input.symbol
    );
    println!(
        "Receive:     {} {}",
        TokenAmount::new(quote.amount_out, output.decimals).to_string().green(),
        output.symbol
    );
    println!(
        "Minimum:     {} {} (0.5% slippage)",
        TokenAmount::new(minimum, output.decimals),
        output.symbol
    );
    if approvals.is_ready() {
        println!("Approvals:   none needed");
    } else {
        println!("Approvals:   {:?}", approvals.required());
    }
    Ok(())
}

async fn swap(
    orchestrator: &SwapOrchestrator,
    config: &Config,
    amount: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    quote(orchestrator, config, amount, json).await?;

    if !yes && !confirm("Execute this swap?")? {
        println!("Swap cancelled");
        orchestrator.reset()?;
        return Ok(());
    }

    let mut states = orchestrator.subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match &state {
                SwapExecutionState::Succeeded => println!("  {}", state.label().green().bold()),
                SwapExecutionState::Failed(_) => println!("  {}", state.label().red().bold()),
                _ => println!("  {}", state.label().cyan()),
            }
        }
    });

    let result = orchestrator.execute_swap().await;
    // Let the watcher print the final state before the result
    tokio::task::yield_now().await;

    match result {
        Ok(outcome) => {
            if json {
                print_json(&outcome)?;
            } else {
                print_header("SWAP CONFIRMED");
                println!("Transaction: {}", outcome.tx_hash);
                if let Some(block) = outcome.block_number {
                    println!("Block:       {}", block);
                }
                println!("Explorer:    {}", outcome.explorer_url.underline());
                if let Some(balances) = orchestrator.last_balances() {
                    println!("Balances:    {}", balances);
                }
            }
            orchestrator.complete().await?;
            watcher.abort();
            Ok(())
        }
        Err(e) => {
            watcher.abort();
            match e.failure() {
                Some(failure) => bail!(failure.user_message()),
                None => Err(e.into()),
            }
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt.yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title.bold());
    println!("{}", "=".repeat(60));
}

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use solswap::{
    apis::JupiterTokenList,
    config::{self, get_config_clone, OkxConfig},
    errors::SwapError,
    logger::{self, LogTag, LoggerConfig},
    swaps::{routers::OkxRouter, QuoteAggregator, QuoteRequest, StorePhase, StoreSnapshot, SwapStore},
    tokens::{init_token_cache, token_cache, Token, TokenCache, TokenMetadataCache},
    utils::{format_amount, format_output_amount, format_price_impact, shorten_address, to_smallest_unit},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Multi-source Solana swap quote aggregator
#[derive(Debug, Parser)]
#[command(name = "solswap", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = config::CONFIG_FILE_PATH)]
    config: String,

    /// Enable debug output for tags (e.g. quotes,store,okx)
    #[arg(long, global = true, value_delimiter = ',')]
    debug: Vec<String>,

    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch and rank quotes from every enabled source
    Quote {
        /// Input token symbol or mint
        input: String,
        /// Output token symbol or mint
        output: String,
        /// Amount in input token units (e.g. 1.5)
        amount: String,
        /// Wallet that would sign the order
        #[arg(long)]
        taker: Option<String>,
    },
    /// Feed amounts from stdin through the debounced swap store
    Watch { input: String, output: String },
    /// Search the token list
    Tokens { query: String },
    /// Sign and relay one OKX quote request, printing the raw payload
    OkxRelay {
        from: String,
        to: String,
        amount: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init(LoggerConfig::from_cli(&cli.debug, cli.verbose));

    if let Err(e) = run(cli).await {
        logger::error(LogTag::System, &format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    config::load_config_from_path(&cli.config).map_err(|e| anyhow!(e))?;
    let cfg = get_config_clone();

    let provider = JupiterTokenList::new(&cfg.tokens)?;
    let cache = Arc::new(TokenMetadataCache::new(Arc::new(provider), cfg.tokens.search_limit));
    init_token_cache(cache).map_err(|e| anyhow!(e))?;

    match cli.command {
        Command::Quote {
            input,
            output,
            amount,
            taker,
        } => run_quote(&input, &output, &amount, taker).await,
        Command::Watch { input, output } => run_watch(&input, &output).await,
        Command::Tokens { query } => run_tokens(&query).await,
        Command::OkxRelay { from, to, amount } => run_okx_relay(cfg.okx, &from, &to, &amount).await,
    }
}

async fn resolve_token(symbol_or_mint: &str) -> Result<Token> {
    let cache = token_cache().context("token cache not initialized")?;
    cache
        .resolve(symbol_or_mint)
        .await
        .with_context(|| format!("unknown token '{}'", symbol_or_mint))
}

async fn run_quote(input: &str, output: &str, amount: &str, taker: Option<String>) -> Result<()> {
    let input_token = resolve_token(input).await?;
    let output_token = resolve_token(output).await?;

    let raw = to_smallest_unit(amount, input_token.decimals)
        .filter(|raw| *raw > 0)
        .with_context(|| format!("invalid amount '{}'", amount))?;
    let request = QuoteRequest::new(&input_token.address, &output_token.address, raw.to_string())
        .with_taker(taker);
    request.validate()?;

    logger::info(
        LogTag::Quotes,
        &format!(
            "Quoting {} {} → {}",
            amount, input_token.symbol, output_token.symbol
        ),
    );

    let aggregator = QuoteAggregator::from_config(&get_config_clone())?;
    let quotes = aggregator
        .fetch_all_quotes(&request, output_token.decimals)
        .await?;
    if quotes.is_empty() {
        bail!(SwapError::NoRouteFound);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "Source", "Output", "Route", "Impact", "Savings"]);

    for quote in &quotes {
        let marker = if quote.is_best {
            Cell::new("BEST").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            marker,
            Cell::new(&quote.source_name),
            Cell::new(format!(
                "{} {}",
                format_output_amount(&quote.output_amount_raw, output_token.decimals),
                output_token.symbol
            )),
            Cell::new(quote.route_label()),
            Cell::new(
                quote
                    .price_impact_pct
                    .map(format_price_impact)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(format!("+{:.6}", quote.savings_over_worst)),
        ]);
    }

    println!("{}", table);
    Ok(())
}

async fn run_watch(input: &str, output: &str) -> Result<()> {
    let input_token = resolve_token(input).await?;
    let output_token = resolve_token(output).await?;
    let cfg = get_config_clone();

    let aggregator = Arc::new(QuoteAggregator::from_config(&cfg)?);
    let store = SwapStore::new(aggregator, &cfg.store);
    store.set_input_token(input_token.clone());
    store.set_output_token(output_token.clone());

    let mut updates = store.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if matches!(snapshot.phase, StorePhase::Ready | StorePhase::Error) {
                print_snapshot(&snapshot);
            }
        }
    });

    logger::info(
        LogTag::Store,
        &format!(
            "Enter {} amounts, one per line (Ctrl-D to quit)",
            input_token.symbol
        ),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        store.set_input_amount(line.trim());
    }

    // let a pending fetch land before exiting
    tokio::time::sleep(Duration::from_millis(cfg.store.debounce_ms) + Duration::from_secs(2)).await;
    Ok(())
}

fn print_snapshot(snapshot: &StoreSnapshot) {
    if let Some(error) = &snapshot.error {
        println!("{} {}: {}", snapshot.input_amount, snapshot.input_token.symbol, error);
        return;
    }

    let routes: Vec<String> = snapshot
        .quotes
        .iter()
        .map(|q| {
            format!(
                "{}{} {}",
                if q.is_best { "*" } else { " " },
                q.source_name,
                format_amount(&q.output_amount_raw, snapshot.output_token.decimals)
            )
        })
        .collect();

    println!(
        "{} {} → {} {}  [{}]",
        snapshot.input_amount,
        snapshot.input_token.symbol,
        snapshot.output_amount,
        snapshot.output_token.symbol,
        routes.join(", ")
    );
}

async fn run_tokens(query: &str) -> Result<()> {
    let cache = token_cache().context("token cache not initialized")?;
    let tokens = cache.search(query).await;
    if tokens.is_empty() {
        println!("No tokens match '{}'", query);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Name", "Mint", "Decimals"]);
    for token in tokens {
        table.add_row(vec![
            Cell::new(&token.symbol),
            Cell::new(&token.name),
            Cell::new(shorten_address(&token.address, 4)),
            Cell::new(token.decimals),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn run_okx_relay(okx: OkxConfig, from: &str, to: &str, amount: &str) -> Result<()> {
    let router = OkxRouter::new(okx)?;
    let response = router.relay(Some(from), Some(to), Some(amount)).await;

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        bail!("OKX relay returned HTTP {}", response.status);
    }
    Ok(())
}

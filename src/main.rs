use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walletfolio::address::hex_to_bech32;
use walletfolio::aggregate::PortfolioAggregator;
use walletfolio::chart::TimeRange;
use walletfolio::config::{default_config_path, Config};
use walletfolio::credentials::EnvCredentialStore;
use walletfolio::dashboard::{Dashboard, RawAddress, StaticWalletProvider};
use walletfolio::format::{format_fiat, format_percent, format_quantity};
use walletfolio::models::{FiatCurrency, NetworkFilter, WalletKind};
use walletfolio::state::{Action, AppState};
use walletfolio::view::DashboardView;

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    walletfolio::duration::parse_duration(s).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "walletfolio")]
#[command(about = "Aggregate crypto wallet balances into one fiat-valued portfolio")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect the given addresses and print the portfolio
    Summary(SummaryArgs),
    /// Show the resolved configuration
    Config,
    /// Convert a hex-encoded Cardano address to bech32
    Resolve { hex: String },
}

#[derive(clap::Args, Debug)]
struct SummaryArgs {
    /// EVM address for the MetaMask wallet
    #[arg(long)]
    metamask: Option<String>,

    /// Solana address for the Phantom wallet
    #[arg(long)]
    phantom: Option<String>,

    /// Cardano address for the Yoroi wallet, bech32 or CIP-30 hex
    #[arg(long)]
    yoroi: Option<String>,

    /// Network filter (ALL, ETH, BSC, SOLANA, CARDANO)
    #[arg(long, default_value = "ALL")]
    network: NetworkFilter,

    /// Display currency; defaults to the configured one
    #[arg(long)]
    fiat: Option<FiatCurrency>,

    /// Chart range (1D, 1S, 1M, 3M, 6M, 1A); defaults to the configured one
    #[arg(long)]
    range: Option<TimeRange>,

    /// Override the HTTP timeout (e.g. "5s", "1500ms")
    #[arg(long, value_parser = parse_duration_arg)]
    timeout: Option<Duration>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).json())
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }
}

/// Yoroi hands out hex bytes; anything that already looks bech32 is used as-is.
fn yoroi_address(raw: &str) -> RawAddress {
    if raw.trim_start().starts_with("addr") || raw.trim_start().starts_with("stake") {
        RawAddress::Text(raw.to_string())
    } else {
        RawAddress::Hex(raw.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    match cli.command {
        Command::Config => {
            println!("Config file: {}", cli.config.display());
            println!("{}", toml::to_string_pretty(&config).context("Failed to render config")?);
        }
        Command::Resolve { hex } => {
            let address = hex_to_bech32(&hex).context("Failed to decode address")?;
            println!("{address}");
        }
        Command::Summary(args) => {
            if let Some(timeout) = args.timeout {
                config.http.timeout = timeout;
            }
            run_summary(&config, args).await?;
        }
    }

    Ok(())
}

async fn run_summary(config: &Config, args: SummaryArgs) -> Result<()> {
    let aggregator = PortfolioAggregator::from_config(config, &EnvCredentialStore::new()).await?;
    let state = AppState::new(
        args.fiat.unwrap_or(config.default_fiat),
        args.range.unwrap_or(config.default_range),
    );

    let mut dashboard = Dashboard::new(Arc::new(aggregator), state);
    let mut kinds = Vec::new();
    let addresses = [
        (WalletKind::MetaMask, args.metamask.map(RawAddress::Text)),
        (WalletKind::Phantom, args.phantom.map(RawAddress::Text)),
        (WalletKind::Yoroi, args.yoroi.as_deref().map(yoroi_address)),
    ];
    for (kind, address) in addresses {
        if let Some(address) = address {
            dashboard = dashboard.with_provider(Arc::new(StaticWalletProvider::new(kind, address)));
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        anyhow::bail!("No wallet addresses given; pass --metamask, --phantom or --yoroi");
    }

    for kind in kinds {
        dashboard
            .connect(kind)
            .await
            .with_context(|| format!("Failed to connect {kind}"))?;
    }

    if !dashboard.dispatch(Action::SelectNetwork(args.network)).await {
        tracing::warn!(network = %args.network, "network not available for connected wallets; showing all");
    }

    let view = dashboard.view().await;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => print_table(&view, config),
    }
    Ok(())
}

fn print_table(view: &DashboardView, config: &Config) {
    let decimals = config.display.currency_decimals;
    let grouping = config.display.currency_grouping;
    let money = |value: f64| format_fiat(value, &view.fiat, decimals, grouping);

    println!("Network: {} | Currency: {}", view.network.label(), view.fiat.code);
    if let Some(wallet) = &view.connected_with {
        println!("Connected with {} ({})", wallet.kind, wallet.address);
    }
    println!();
    println!(
        "{:<10} {:<8} {:>20} {:>16} {:>18} {:>9}",
        "Asset", "Network", "Quantity", "Price", "Value", "24h"
    );
    for row in &view.rows {
        println!(
            "{:<10} {:<8} {:>20} {:>16} {:>18} {:>9}",
            row.asset.ticker,
            row.asset.network.as_str(),
            format_quantity(row.asset.balance),
            money(row.display_price),
            money(row.display_value),
            format_percent(row.asset.change_24h),
        );
    }
    println!();
    println!(
        "Total ({} assets): {}  {}",
        view.asset_count,
        money(view.total_value),
        format_percent(view.change_24h)
    );

    let chart: Vec<String> = view
        .chart
        .iter()
        .map(|point| format!("{}={}", point.label, point.value))
        .collect();
    println!("History {}: {}", view.range, chart.join(" "));
}

//! Command-line interface for stockscope

mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing::info;

use stock_engine::{
    AnalysisParams, DataProvider, DcfParameters, Fetched, MAX_YEARS, MarketData, NewsSource,
    PriceHistorySource, Screener, ScreenerCriteria, StockConfig, analyze,
};

#[derive(Parser, Debug)]
#[command(name = "stockscope", version)]
#[command(about = "Stock screener, technical levels and DCF valuation", long_about = None)]
struct Cli {
    /// Where daily price history comes from
    #[arg(long, global = true, value_enum, default_value_t = Provider::Yahoo)]
    provider: Provider,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Provider {
    Yahoo,
    Finnhub,
}

impl From<Provider> for DataProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Yahoo => Self::Yahoo,
            Provider::Finnhub => Self::Finnhub,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank a universe of tickers by momentum and valuation
    Screen(ScreenArgs),
    /// Technical levels, indicators and DCF value for one ticker
    Analyze(AnalyzeArgs),
    /// Latest company news for one ticker
    News(NewsArgs),
}

#[derive(Args, Debug)]
struct ScreenArgs {
    /// Maximum trailing PE
    #[arg(long, default_value_t = 30.0)]
    max_pe: f64,
    /// Maximum PEG ratio
    #[arg(long, default_value_t = 2.0)]
    max_peg: f64,
    /// Maximum RSI(14)
    #[arg(long, default_value_t = 55.0)]
    max_rsi: f64,
    /// Maximum distance from the 200-day EMA, percent (negative = below)
    #[arg(long, allow_negative_numbers = true)]
    max_ema_distance: Option<f64>,
    /// Number of rows to show
    #[arg(long, default_value_t = 15)]
    top: usize,
    /// Comma-separated tickers (defaults to the built-in universe)
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,
    /// Calendar days of history per ticker
    #[arg(long, default_value_t = 365)]
    days: u32,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl ScreenArgs {
    fn criteria(&self) -> ScreenerCriteria {
        ScreenerCriteria {
            max_rsi: Some(self.max_rsi),
            max_pe: Some(self.max_pe),
            max_peg: Some(self.max_peg),
            max_ema_distance_pct: self.max_ema_distance,
            top_n: self.top,
            history_days: self.days,
            ..ScreenerCriteria::default()
        }
    }
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Ticker symbol, e.g. AAPL
    ticker: String,
    /// Calendar days of history
    #[arg(long, default_value_t = 365)]
    days: u32,
    /// Discount rate, percent
    #[arg(long, default_value_t = 10.0)]
    discount_rate: f64,
    /// Growth rate for the projection years, percent
    #[arg(long, default_value_t = 5.0)]
    growth_rate: f64,
    /// Terminal growth rate, percent
    #[arg(long, default_value_t = 2.5)]
    terminal_growth: f64,
    /// Projection years
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_YEARS))
    )]
    years: u32,
    /// Starting free cash flow per share (defaults to 5% of the last price)
    #[arg(long)]
    fcf_per_share: Option<f64>,
    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl AnalyzeArgs {
    fn params(&self) -> AnalysisParams {
        AnalysisParams {
            dcf: DcfParameters::default()
                .with_discount_rate(self.discount_rate)
                .with_growth_rate(self.growth_rate)
                .with_terminal_growth(self.terminal_growth)
                .with_years(self.years),
            fcf_per_share: self.fcf_per_share,
            ..AnalysisParams::default()
        }
    }
}

#[derive(Args, Debug)]
struct NewsArgs {
    /// Ticker symbol, e.g. AAPL
    ticker: String,
    /// Trailing window in days
    #[arg(long)]
    days: Option<u32>,
    /// Maximum number of headlines
    #[arg(long)]
    limit: Option<usize>,
}

fn stock_config(provider: Provider, tickers: &[String]) -> anyhow::Result<StockConfig> {
    let mut builder = StockConfig::builder()
        .with_env_api_key()
        .history_provider(provider.into());
    if !tickers.is_empty() {
        builder = builder.universe(tickers.iter().cloned());
    }
    builder.build().context("invalid configuration")
}

async fn run_screen(config: &StockConfig, args: &ScreenArgs) -> anyhow::Result<()> {
    let market = Arc::new(MarketData::from_config(config)?);

    let mut screener = Screener::new(market.clone(), config.screener_delay);
    if config.has_finnhub_key() {
        screener = screener.with_fundamentals(market);
    } else {
        info!("FINNHUB_API_KEY not set; screening without PE/PEG");
    }

    let rows = screener.run(&config.universe, &args.criteria()).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No screener results (data unavailable for every ticker).");
    } else {
        println!("{}", output::screener_table(&rows));
    }
    Ok(())
}

async fn run_analyze(config: &StockConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let market = MarketData::from_config(config)?;
    let ticker = args.ticker.trim().to_uppercase();

    let series = match market.price_history(&ticker, args.days).await {
        Fetched::Data(series) => series,
        Fetched::Empty(reason) => {
            println!("Price data unavailable for {ticker} ({reason}). Check API key or ticker.");
            return Ok(());
        }
    };

    let Some(report) = analyze(&ticker, &series, &args.params()) else {
        println!("Price data unavailable for {ticker}. Check API key or ticker.");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", output::report_overview(&report));
    println!("{}", output::levels_table(&report));
    println!("{}", output::dcf_table(&report.dcf));
    println!("Summary");
    for bullet in report.summary() {
        println!("  - {bullet}");
    }
    Ok(())
}

async fn run_news(config: &StockConfig, args: &NewsArgs) -> anyhow::Result<()> {
    let market = MarketData::from_config(config)?;
    let ticker = args.ticker.trim().to_uppercase();
    let days = args.days.unwrap_or(config.news_lookback_days);
    let limit = args.limit.unwrap_or(config.news_limit);

    match market.company_news(&ticker, days, limit).await {
        Fetched::Data(items) if !items.is_empty() => {
            println!("{}", output::news_list(&items));
        }
        Fetched::Data(_) => println!("No news found for {ticker} in the last {days} days."),
        Fetched::Empty(reason) => {
            println!("No news found for {ticker} ({reason}).");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = stock_utils::Config::from_env()?;
    stock_utils::init_tracing_with(settings.log_format);

    let cli = Cli::parse();

    info!(environment = %settings.environment, "Starting {}", settings.app_name);

    match &cli.command {
        Commands::Screen(args) => {
            let config = stock_config(cli.provider, &args.tickers)?;
            run_screen(&config, args).await
        }
        Commands::Analyze(args) => {
            let config = stock_config(cli.provider, &[])?;
            run_analyze(&config, args).await
        }
        Commands::News(args) => {
            let config = stock_config(cli.provider, &[])?;
            run_news(&config, args).await
        }
    }
}

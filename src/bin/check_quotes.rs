use anyhow::{Context, Result};
use clap::Parser;
use prime_screener::core::Thresholds;
use prime_screener::market::quotes::QuoteClient;

/// Fetches the screening fundamentals for a single symbol. Useful for
/// checking the quote API shape without running a full screen.
#[derive(Debug, Parser)]
#[command(name = "check_quotes")]
#[command(about = "Fetch ROE/PER/PBR for one symbol")]
struct Args {
    /// Quote symbol, e.g. 7203.T
    symbol: String,

    #[arg(long, default_value = prime_screener::config::DEFAULT_QUOTE_ENDPOINT)]
    quote_endpoint: String,
}

fn fmt_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("🚀 Fetching fundamentals for {}", args.symbol);
    let client = QuoteClient::new(args.quote_endpoint);
    let fundamentals = client
        .fetch_fundamentals(&args.symbol)
        .await
        .with_context(|| format!("quote lookup failed for {}", args.symbol))?;

    println!("  ROE: {}%", fmt_ratio(fundamentals.roe));
    println!("  PER: {}", fmt_ratio(fundamentals.per));
    println!("  PBR: {}", fmt_ratio(fundamentals.pbr));

    let thresholds = Thresholds::default();
    if thresholds.matches(&fundamentals) {
        println!("✅ 条件に合致します (ROE>10, PER<15, PBR<1)");
    } else {
        println!("➖ 条件外です");
    }

    Ok(())
}

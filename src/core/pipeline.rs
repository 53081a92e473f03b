use crate::config::profile::ScreenProfile;
use crate::core::{ConfigProvider, Listing, Pipeline, ScreenReport, ScreenedStock, Storage, Thresholds};
use crate::domain::model::today_stamp;
use crate::market::quotes::QuoteClient;
use crate::market::universe::UniverseClient;
use crate::utils::error::{Result, ScreenerError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const CSV_HEADER: [&str; 5] = ["Ticker", "銘柄名", "PBR", "PER", "ROE"];

pub struct ScreenerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    universe: UniverseClient,
    quotes: QuoteClient,
    thresholds: Thresholds,
    markets: Vec<String>,
}

impl<S: Storage, C: ConfigProvider> ScreenerPipeline<S, C> {
    pub fn new(storage: S, config: C, profile: &ScreenProfile) -> Self {
        let universe = UniverseClient::new(config.universe_url().to_string());
        let quotes = QuoteClient::new(config.quote_endpoint().to_string());

        Self {
            storage,
            config,
            universe,
            quotes,
            thresholds: profile.screen,
            markets: profile.markets.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScreenerPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Listing>> {
        tracing::info!("JPX公式サイトから銘柄データを取得中...");
        self.universe.fetch(&self.markets).await
    }

    /// Bounded fan-out: one task per listing, `concurrent_requests` permits.
    /// A task that fails to fetch or parse yields "no match" for its ticker;
    /// nothing is consumed until every task has finished.
    async fn transform(&self, listings: Vec<Listing>) -> Result<ScreenReport> {
        let universe_size = listings.len();
        let pool_size = self.config.concurrent_requests().max(1);
        tracing::info!(
            "スクリーニングを開始します... ({} tickers, {} workers)",
            universe_size,
            pool_size
        );

        let semaphore = Arc::new(Semaphore::new(pool_size));
        let mut join_set: JoinSet<(String, Option<ScreenedStock>, bool)> = JoinSet::new();

        for listing in listings {
            let semaphore = Arc::clone(&semaphore);
            let quotes = self.quotes.clone();
            let thresholds = self.thresholds;

            join_set.spawn(async move {
                let symbol = listing.symbol();
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (symbol, None, true);
                };

                match quotes.fetch_fundamentals(&symbol).await {
                    Ok(f) => {
                        let hit = match (f.roe, f.per, f.pbr) {
                            (Some(roe), Some(per), Some(pbr)) if thresholds.matches(&f) => {
                                Some(ScreenedStock {
                                    ticker: symbol.clone(),
                                    name: listing.name.clone(),
                                    pbr,
                                    per,
                                    roe,
                                })
                            }
                            _ => None,
                        };
                        (symbol, hit, false)
                    }
                    Err(e) => {
                        tracing::debug!("{}: 取得エラー ({})", symbol, e);
                        (symbol, None, true)
                    }
                }
            });
        }

        let mut rows = Vec::new();
        let mut fetch_failures = 0;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Some(row), _)) => rows.push(row),
                Ok((_, None, failed)) => {
                    if failed {
                        fetch_failures += 1;
                    }
                }
                Err(join_error) => {
                    tracing::warn!("screen task failed: {}", join_error);
                    fetch_failures += 1;
                }
            }
        }

        // Completion order is nondeterministic; sort so concurrent and
        // sequential runs emit identical CSVs.
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let csv_output = render_csv(&rows)?;
        Ok(ScreenReport {
            rows,
            csv_output,
            universe_size,
            fetch_failures,
        })
    }

    async fn load(&self, report: &ScreenReport) -> Result<String> {
        if report.rows.is_empty() {
            tracing::info!("条件に合致する銘柄なし");
        } else {
            tracing::info!("抽出数: {}", report.rows.len());
        }

        let file_name = format!("Prime_Value_Stocks_{}.csv", today_stamp());
        self.storage
            .write_file(&file_name, &report.csv_bytes())
            .await?;

        Ok(format!("{}/{}", self.config.output_path(), file_name))
    }
}

fn render_csv(rows: &[ScreenedStock]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        // serialize() would normally emit the header; keep it for the
        // header-only artifact of a run without matches.
        writer.write_record(CSV_HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScreenerError::ProcessingError {
            message: format!("CSV buffer flush failed: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| ScreenerError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

use crate::core::{Notifier, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::Path;

pub struct ScreenerEngine<P: Pipeline, N: Notifier> {
    pipeline: P,
    notifier: N,
    monitor: SystemMonitor,
}

impl<P: Pipeline, N: Notifier> ScreenerEngine<P, N> {
    pub fn new(pipeline: P, notifier: N) -> Self {
        Self::new_with_monitoring(pipeline, notifier, false)
    }

    pub fn new_with_monitoring(pipeline: P, notifier: N, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            notifier,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs the batch: universe -> screen -> CSV, then the notification.
    /// A notification failure is logged and does not fail the run; the CSV
    /// is already on disk at that point.
    pub async fn run(&self) -> Result<String> {
        println!("Starting screening run...");

        println!("Fetching ticker universe...");
        let listings = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");
        println!("Universe size: {} tickers", listings.len());

        println!("Screening fundamentals...");
        let report = self.pipeline.transform(listings).await?;
        self.monitor.log_stats("Transform");
        println!(
            "Matched {} stocks ({} fetch failures)",
            report.rows.len(),
            report.fetch_failures
        );

        println!("Writing CSV...");
        let output_path = self.pipeline.load(&report).await?;
        self.monitor.log_stats("Load");
        println!("Output saved to: {}", output_path);

        let csv_name = Path::new(&output_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output_path.clone());
        if let Err(e) = self.notifier.notify(&report, &csv_name).await {
            tracing::error!("メール送信エラー: {}", e);
        }

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

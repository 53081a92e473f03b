use crate::domain::model::{Listing, ScreenReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn universe_url(&self) -> &str;
    fn quote_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Listing>>;
    async fn transform(&self, listings: Vec<Listing>) -> Result<ScreenReport>;
    async fn load(&self, report: &ScreenReport) -> Result<String>;
}

/// Post-run delivery of the screening result. Implementations must not fail
/// the run; the engine logs errors and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &ScreenReport, csv_name: &str) -> Result<()>;
}

pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{Fundamentals, Listing, ScreenReport, ScreenedStock, Thresholds};
pub use crate::domain::ports::{ConfigProvider, Notifier, Pipeline, Storage};
pub use crate::utils::error::Result;

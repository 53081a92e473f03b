pub mod config;
pub mod core;
pub mod domain;
pub mod market;
pub mod notify;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig, MailSettings};
pub use core::{engine::ScreenerEngine, pipeline::ScreenerPipeline};
pub use utils::error::{Result, ScreenerError};

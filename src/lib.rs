pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod finance;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConsoleSink, FileSink, MemorySink};
pub use config::TomlConfig;
pub use crate::core::{dashboard::Dashboard, fetcher::ResourceFetcher};
pub use domain::model::{RefreshReport, RenderedOutput, Resource};
pub use domain::ports::{ConfigProvider, OutputSink};
pub use utils::error::{FinanceClientError, Result};

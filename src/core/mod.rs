pub mod dashboard;
pub mod fetcher;

pub use crate::domain::model::{RefreshReport, RenderedOutput, Resource, ResourceOutcome};
pub use crate::domain::ports::{ConfigProvider, OutputSink};
pub use crate::utils::error::Result;

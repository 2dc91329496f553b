use crate::domain::model::Resource;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Destination for rendered text, addressed by target name.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Replaces the whole content of `target` with `text`.
    async fn write_text(&self, target: &str, text: &str) -> Result<()>;
}

#[async_trait]
impl<S: OutputSink + ?Sized> OutputSink for Arc<S> {
    async fn write_text(&self, target: &str, text: &str) -> Result<()> {
        (**self).write_text(target, text).await
    }
}

#[async_trait]
impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    async fn write_text(&self, target: &str, text: &str) -> Result<()> {
        (**self).write_text(target, text).await
    }
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn resources(&self) -> Vec<Resource>;
    fn output_dir(&self) -> &str;
    fn write_to_stdout(&self) -> bool;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Option<Duration>;
}

use crate::core::OutputSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes each target to `<base_path>/<target>.json`.
#[derive(Debug, Clone)]
pub struct FileSink {
    base_path: PathBuf,
}

impl FileSink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn target_path(&self, target: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", target))
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn write_text(&self, target: &str, text: &str) -> Result<()> {
        let full_path = self.target_path(target);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, text).await?;
        tracing::debug!("Wrote {} bytes to {}", text.len(), full_path.display());
        Ok(())
    }
}

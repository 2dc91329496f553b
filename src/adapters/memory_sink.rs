use crate::core::OutputSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory targets. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    texts: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `target` already holds `text`.
    pub fn with_text(target: &str, text: &str) -> Self {
        let mut texts = HashMap::new();
        texts.insert(target.to_string(), text.to_string());
        Self {
            texts: Arc::new(RwLock::new(texts)),
        }
    }

    pub async fn text(&self, target: &str) -> Option<String> {
        self.texts.read().await.get(target).cloned()
    }

    pub async fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.texts.read().await.keys().cloned().collect();
        targets.sort();
        targets
    }

    pub async fn is_empty(&self) -> bool {
        self.texts.read().await.is_empty()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write_text(&self, target: &str, text: &str) -> Result<()> {
        self.texts
            .write()
            .await
            .insert(target.to_string(), text.to_string());
        Ok(())
    }
}

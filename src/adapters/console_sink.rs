use crate::core::OutputSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Prints each target as a `==> target <==` block on stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    // serialises blocks from concurrent refreshes
    lock: Mutex<()>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn format_block(target: &str, text: &str) -> String {
    format!("==> {} <==\n{}\n", target, text)
}

#[async_trait]
impl OutputSink for ConsoleSink {
    async fn write_text(&self, target: &str, text: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format_block(target, text).as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_block() {
        assert_eq!(
            format_block("personal-output", "{\n  \"a\": 1\n}"),
            "==> personal-output <==\n{\n  \"a\": 1\n}\n"
        );
    }
}

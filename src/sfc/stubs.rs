use std::time::Duration;

use crate::sfc::traits::{ComponentCompiler, SfcOutput};

/// Scripted component-compiler double returning a fixed output after a delay.
#[derive(Debug, Clone)]
pub struct SfcStub {
    output: SfcOutput,
    delay: Duration,
}

impl SfcStub {
    pub fn new(output: SfcOutput, delay: Duration) -> Self {
        Self { output, delay }
    }

    /// A stub that compiles every component to the given script with no style.
    pub fn script_only(script: &str) -> Self {
        Self::new(
            SfcOutput::Compiled {
                script: script.to_string(),
                style: String::new(),
            },
            Duration::ZERO,
        )
    }
}

#[async_trait::async_trait]
impl ComponentCompiler for SfcStub {
    #[tracing::instrument]
    async fn compile(&self, filename: &str, source: &str) -> SfcOutput {
        tracing::debug!(
            "Start component compile: filename={:?}, source_len={}",
            filename,
            source.len()
        );
        tokio::time::sleep(self.delay).await;
        self.output.clone()
    }
}

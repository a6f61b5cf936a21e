use std::time::Duration;

use crate::engine::traits::{
    BuildFailure, BuildMessage, BuildOutput, BuildRequest, BundleEngine, EngineError, EngineInit,
    OutputFile,
};

/// Scripted engine double: initialization takes `init_delay` and yields
/// `init_result`; every build yields `build_result`.
#[derive(Debug, Clone)]
pub struct EngineStub {
    init_result: Result<(), EngineError>,
    build_result: Result<String, Vec<BuildMessage>>,
    init_delay: Duration,
}

impl EngineStub {
    pub fn new(
        init_result: Result<(), EngineError>,
        build_result: Result<String, Vec<BuildMessage>>,
        init_delay: Duration,
    ) -> Self {
        Self {
            init_result,
            build_result,
            init_delay,
        }
    }

    pub fn succeeding(output: &str) -> Self {
        Self::new(Ok(()), Ok(output.to_string()), Duration::ZERO)
    }

    pub fn failing_build(messages: Vec<BuildMessage>) -> Self {
        Self::new(Ok(()), Err(messages), Duration::ZERO)
    }
}

#[async_trait::async_trait]
impl BundleEngine for EngineStub {
    #[tracing::instrument]
    async fn initialize(&self, options: &EngineInit) -> Result<(), EngineError> {
        tracing::debug!("Start initialization: options={:?}", options);
        tokio::time::sleep(self.init_delay).await;
        tracing::debug!("Initialization result: {:?}", self.init_result);
        self.init_result.clone()
    }

    async fn build(&self, _request: BuildRequest<'_>) -> Result<BuildOutput, BuildFailure> {
        match &self.build_result {
            Ok(output) => Ok(BuildOutput {
                output_files: vec![OutputFile {
                    contents: output.clone().into_bytes(),
                }],
            }),
            Err(messages) => Err(BuildFailure {
                messages: messages.clone(),
            }),
        }
    }
}

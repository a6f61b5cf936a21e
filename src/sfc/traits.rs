/// What the external component compiler produced: either a script/style pair
/// ready for stitching, or the diagnostics it rejected the input with.
#[derive(Debug, Clone)]
pub enum SfcOutput {
    Compiled { script: String, style: String },
    Diagnostics(Vec<String>),
}

/// The external single-file-component compiler (template/script/style
/// parsing, scoped-CSS ids). Only its interface matters here.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ComponentCompiler: std::fmt::Debug + Send + Sync {
    async fn compile(&self, filename: &str, source: &str) -> SfcOutput;
}

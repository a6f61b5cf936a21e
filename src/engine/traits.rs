//! Interface boundary to the generic bundling engine.
//!
//! The engine itself (WASM build, transform primitives, source maps) is an
//! external collaborator; this module only pins down the request/result
//! shapes and the resolve/load plugin protocol the compiler plugs into.

use thiserror::Error;

use crate::styles::StyleError;
use crate::vfs::traits::FileError;

/// Engine initialization options.
#[derive(Debug, Clone)]
pub struct EngineInit {
    /// CDN location of the engine's binary asset.
    pub wasm_url: String,
    /// Run the engine in an execution worker.
    pub worker: bool,
}

/// Why the engine asked to resolve a specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    EntryPoint,
    ImportStatement,
    DynamicImport,
    RequireCall,
}

/// One resolve request, produced by the engine once per import edge.
#[derive(Debug, Clone)]
pub struct ResolveArgs {
    /// The import specifier as written in source.
    pub path: String,
    /// Virtual path of the importing module. Empty for the entry point.
    pub importer: String,
    pub kind: ResolveKind,
}

/// Resolve result. `external` means the engine must not inline the module;
/// the browser's own loader fetches it from `path` at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: String,
    pub external: bool,
}

#[derive(Debug, Clone)]
pub struct LoadArgs {
    pub path: String,
}

/// Language kind the engine parses module contents as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Ts,
    Tsx,
    Jsx,
    Js,
    Json,
}

/// Maps a file extension to the loader the engine should use. CSS and
/// single-file components are plain script by the time the engine sees them;
/// unknown extensions get the most permissive kind.
pub fn loader_for_ext(ext: &str) -> Loader {
    match ext {
        ".ts" => Loader::Ts,
        ".tsx" => Loader::Tsx,
        ".js" | ".jsx" => Loader::Jsx,
        ".json" => Loader::Json,
        ".css" | ".vue" => Loader::Js,
        _ => Loader::Tsx,
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub contents: String,
    pub loader: Loader,
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("import kind {0:?} is not resolvable")]
    Unresolvable(ResolveKind),
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Style(#[from] StyleError),
}

/// The resolve/load callback pair the engine drives while walking the module
/// graph. Implementations hold no mutable state; callbacks may interleave
/// across modules in any order.
#[async_trait::async_trait]
pub trait BundlePlugin: Send + Sync {
    async fn on_resolve(&self, args: &ResolveArgs) -> Result<Resolution, PluginError>;
    async fn on_load(&self, args: &LoadArgs) -> Result<LoadOutput, PluginError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMapMode {
    Inline,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Esm,
    Iife,
}

/// Build options handed to the engine. Bundling and in-memory output are not
/// options at all: every build bundles and returns its output buffer.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source_map: SourceMapMode,
    pub target: String,
    pub platform: Platform,
    pub format: OutputFormat,
    pub minify: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_map: SourceMapMode::Inline,
            target: "es2015".to_string(),
            platform: Platform::Browser,
            format: OutputFormat::Esm,
            minify: false,
        }
    }
}

pub struct BuildRequest<'a> {
    pub entry_points: Vec<String>,
    pub plugin: &'a dyn BundlePlugin,
    pub options: BuildOptions,
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub output_files: Vec<OutputFile>,
}

#[derive(Debug, Clone)]
pub struct MessageLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// One structured diagnostic from a failed build.
#[derive(Debug, Clone)]
pub struct BuildMessage {
    pub text: String,
    pub location: Option<MessageLocation>,
}

impl BuildMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("build failed with {} error(s)", messages.len())]
pub struct BuildFailure {
    pub messages: Vec<BuildMessage>,
}

impl From<PluginError> for BuildFailure {
    fn from(err: PluginError) -> Self {
        Self {
            messages: vec![BuildMessage::text(err.to_string())],
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    Init(String),
}

/// The generic bundling engine. `initialize` is a one-time background step;
/// `build` may be called many times afterwards, each call independent.
#[async_trait::async_trait]
pub trait BundleEngine: std::fmt::Debug + Send + Sync {
    async fn initialize(&self, options: &EngineInit) -> Result<(), EngineError>;
    async fn build(&self, request: BuildRequest<'_>) -> Result<BuildOutput, BuildFailure>;
}

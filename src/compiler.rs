//! The compiler orchestrator: owns configuration, gates on engine readiness,
//! and normalizes build results into the public compile result shape.

use std::sync::Arc;

use itertools::Itertools;
use tokio::sync::watch;
use uuid::Uuid;

use crate::cdn::DEFAULT_ESM_HOST;
use crate::engine::traits::{
    BuildMessage, BuildOptions, BuildOutput, BuildRequest, BundleEngine, EngineInit, SourceMapMode,
};
use crate::manifest::PackageManifest;
use crate::plugin::ResolveLoadPlugin;
use crate::sfc::traits::ComponentCompiler;
use crate::vfs::traits::FileResolver;

const MESSAGE_WRAP_WIDTH: usize = 100;
const ENGINE_WASM_ASSET: &str = "esbuild-wasm@0.20.0/esbuild.wasm";

/// Configuration fixed for the lifetime of a [`Compiler`].
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// CDN location of the engine's binary asset. Defaults to the esm host.
    pub wasm_url: Option<String>,
    /// Run the engine in an execution worker.
    pub worker: bool,
    /// CDN module host override.
    pub esm_service_url: Option<String>,
    /// Declared dependency versions for bare-import resolution.
    pub manifest: Option<PackageManifest>,
    /// When false, bare imports pass through unresolved but external.
    pub rewrite_bare_imports: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            wasm_url: None,
            worker: true,
            esm_service_url: None,
            manifest: None,
            rewrite_bare_imports: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn esm_host(&self) -> &str {
        self.esm_service_url.as_deref().unwrap_or(DEFAULT_ESM_HOST)
    }
}

/// Per-call build tweaks. Bundling and in-memory output are invariants of
/// every compile and deliberately cannot be expressed here.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub source_map: Option<SourceMapMode>,
    pub target: Option<String>,
    pub minify: Option<bool>,
    /// Overrides the instance manifest for this call only.
    pub manifest: Option<PackageManifest>,
}

/// The structured failure half of a compile result. `compile` never panics
/// for build-time problems; callers branch on the `Result`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompileFailure {
    pub message: String,
}

pub type CompileResult = Result<String, CompileFailure>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum InitState {
    Pending,
    Ready,
    Failed(String),
}

/// One compiler per playground session. Engine initialization starts in the
/// background at construction; `compile` calls wait on it once and then run
/// independently of each other.
pub struct Compiler {
    engine: Arc<dyn BundleEngine>,
    files: Arc<dyn FileResolver>,
    sfc: Arc<dyn ComponentCompiler>,
    options: CompilerOptions,
    ready: watch::Receiver<InitState>,
}

impl Compiler {
    /// Starts the engine initialization in the background. Must be called
    /// from within a Tokio runtime.
    pub fn new(
        engine: Arc<dyn BundleEngine>,
        files: Arc<dyn FileResolver>,
        sfc: Arc<dyn ComponentCompiler>,
        options: CompilerOptions,
    ) -> Self {
        let init = EngineInit {
            wasm_url: options
                .wasm_url
                .clone()
                .unwrap_or_else(|| format!("{}/{}", options.esm_host(), ENGINE_WASM_ASSET)),
            worker: options.worker,
        };

        let (ready_tx, ready_rx) = watch::channel(InitState::Pending);
        let init_engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let state = match init_engine.initialize(&init).await {
                Ok(()) => InitState::Ready,
                Err(e) => {
                    tracing::error!(error = %e, "engine initialization failed");
                    InitState::Failed(e.to_string())
                }
            };
            let _ = ready_tx.send(state);
        });

        Self {
            engine,
            files,
            sfc,
            options,
            ready: ready_rx,
        }
    }

    /// Suspends until the one-time engine initialization has finished. Many
    /// compile calls may wait here concurrently; none resolves before the
    /// engine is usable.
    async fn await_ready(&self) -> Result<(), CompileFailure> {
        let mut ready = self.ready.clone();
        let state = ready
            .wait_for(|state| *state != InitState::Pending)
            .await
            .map_err(|_| CompileFailure {
                message: "engine initialization task was dropped".to_string(),
            })?
            .clone();
        match state {
            InitState::Ready => Ok(()),
            InitState::Failed(message) => Err(CompileFailure { message }),
            InitState::Pending => Err(CompileFailure {
                message: "engine initialization incomplete".to_string(),
            }),
        }
    }

    pub async fn compile(&self, entry_point: &str) -> CompileResult {
        self.compile_with(entry_point, BuildOverrides::default())
            .await
    }

    #[tracing::instrument(skip(self, overrides))]
    pub async fn compile_with(
        &self,
        entry_point: &str,
        overrides: BuildOverrides,
    ) -> CompileResult {
        self.await_ready().await?;

        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, entry_point, "starting compile");

        let manifest = overrides
            .manifest
            .as_ref()
            .or(self.options.manifest.as_ref());
        let dependencies = manifest.and_then(|m| m.dependencies()).cloned();
        let plugin = ResolveLoadPlugin::new(
            Arc::clone(&self.files),
            Arc::clone(&self.sfc),
            dependencies,
            self.options.esm_host().to_string(),
            self.options.rewrite_bare_imports,
        );

        let mut options = BuildOptions::default();
        if let Some(source_map) = overrides.source_map {
            options.source_map = source_map;
        }
        if let Some(target) = overrides.target {
            options.target = target;
        }
        if let Some(minify) = overrides.minify {
            options.minify = minify;
        }

        // The resolve callback re-roots the entry, so strip the slash here.
        let entry = entry_point.strip_prefix('/').unwrap_or(entry_point);
        let request = BuildRequest {
            entry_points: vec![entry.to_string()],
            plugin: &plugin,
            options,
        };

        match self.engine.build(request).await {
            Ok(output) => {
                let code = decode_output(output)?;
                tracing::debug!(%run_id, bytes = code.len(), "compile succeeded");
                Ok(code)
            }
            Err(failure) => {
                let message = format_messages(&failure.messages, MESSAGE_WRAP_WIDTH);
                tracing::debug!(%run_id, "compile failed:\n{message}");
                Err(CompileFailure { message })
            }
        }
    }
}

fn decode_output(output: BuildOutput) -> Result<String, CompileFailure> {
    let first = output
        .output_files
        .into_iter()
        .next()
        .ok_or_else(|| CompileFailure {
            message: "engine produced no output file".to_string(),
        })?;
    String::from_utf8(first.contents).map_err(|_| CompileFailure {
        message: "engine output was not valid UTF-8".to_string(),
    })
}

/// Formats engine diagnostics into a plain multi-line message: no color
/// codes, wrapped at a fixed width, one block per message.
fn format_messages(messages: &[BuildMessage], width: usize) -> String {
    if messages.is_empty() {
        return "build failed".to_string();
    }
    messages
        .iter()
        .map(|message| {
            let mut block = wrap(&message.text, width)
                .into_iter()
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 {
                        format!("error: {line}")
                    } else {
                        format!("       {line}")
                    }
                })
                .join("\n");
            if let Some(loc) = &message.location {
                block.push_str(&format!("\n  --> {}:{}:{}", loc.file, loc.line, loc.column));
            }
            block
        })
        .join("\n\n")
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

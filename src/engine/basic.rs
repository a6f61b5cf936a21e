//! Minimal in-process bundling engine.
//!
//! `BasicEngine` drives the full resolve/load plugin protocol over a naive
//! textual inliner: local modules are concatenated post-order, external
//! imports are rewritten to their resolved URLs. It exists to exercise the
//! plugin pipeline in tests and demos; a production playground plugs a real
//! WASM engine in behind the same trait.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::traits::{
    BuildFailure, BuildMessage, BuildOutput, BuildRequest, BundleEngine, BundlePlugin, EngineError,
    EngineInit, LoadArgs, OutputFile, ResolveArgs, ResolveKind,
};

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*(?:import|export)[^'"\n]*?from[ \t]*['"]([^'"]+)['"];?|^[ \t]*import[ \t]*['"]([^'"]+)['"];?"#,
    )
    .expect("import pattern compiles")
});

#[derive(Debug, Default)]
pub struct BasicEngine {
    initialized: AtomicBool,
}

impl BasicEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct WalkState {
    visited: HashSet<String>,
    chunks: Vec<String>,
}

/// Inlines one module and, recursively, its non-external imports. Emits
/// dependencies before their importer so the entry chunk lands last.
fn inline_module<'a>(
    plugin: &'a dyn BundlePlugin,
    path: String,
    state: &'a mut WalkState,
) -> BoxFuture<'a, Result<(), BuildFailure>> {
    Box::pin(async move {
        if !state.visited.insert(path.clone()) {
            return Ok(());
        }
        let loaded = plugin.on_load(&LoadArgs { path: path.clone() }).await?;
        let contents = loaded.contents;

        let mut emitted = String::new();
        let mut cursor = 0;
        for caps in IMPORT_RE.captures_iter(&contents) {
            let statement = caps.get(0).expect("whole match");
            let specifier = caps
                .get(1)
                .or_else(|| caps.get(2))
                .expect("specifier group")
                .as_str()
                .to_string();
            emitted.push_str(&contents[cursor..statement.start()]);
            cursor = statement.end();

            let resolved = plugin
                .on_resolve(&ResolveArgs {
                    path: specifier.clone(),
                    importer: path.clone(),
                    kind: ResolveKind::ImportStatement,
                })
                .await?;
            if resolved.external {
                emitted.push_str(&statement.as_str().replace(&specifier, &resolved.path));
            } else {
                inline_module(plugin, resolved.path, &mut *state).await?;
            }
        }
        emitted.push_str(&contents[cursor..]);
        state.chunks.push(emitted);
        Ok(())
    })
}

#[async_trait::async_trait]
impl BundleEngine for BasicEngine {
    async fn initialize(&self, options: &EngineInit) -> Result<(), EngineError> {
        tracing::debug!(
            wasm_url = %options.wasm_url,
            worker = options.worker,
            "initializing reference engine"
        );
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[tracing::instrument(skip(request))]
    async fn build(&self, request: BuildRequest<'_>) -> Result<BuildOutput, BuildFailure> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(BuildFailure {
                messages: vec![BuildMessage::text(
                    "build called before engine initialization completed",
                )],
            });
        }

        let mut state = WalkState::default();
        for entry in &request.entry_points {
            let resolved = request
                .plugin
                .on_resolve(&ResolveArgs {
                    path: entry.clone(),
                    importer: String::new(),
                    kind: ResolveKind::EntryPoint,
                })
                .await?;
            inline_module(request.plugin, resolved.path, &mut state).await?;
        }

        let bundle = state.chunks.join("\n");
        Ok(BuildOutput {
            output_files: vec![OutputFile {
                contents: bundle.into_bytes(),
            }],
        })
    }
}

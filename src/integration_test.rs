use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::compiler::{BuildOverrides, Compiler, CompilerOptions};
use crate::engine::basic::BasicEngine;
use crate::manifest::PackageManifest;
use crate::sfc::stubs::SfcStub;
use crate::sfc::traits::SfcOutput;
use crate::vfs::memory::InMemoryFiles;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

fn playground_compiler(files: InMemoryFiles, manifest: Option<PackageManifest>) -> Compiler {
    init_logging();
    let sfc = SfcStub::new(
        SfcOutput::Compiled {
            script: "const component = {}; export default component".to_string(),
            style: ".component { display: flex }".to_string(),
        },
        Duration::ZERO,
    );
    Compiler::new(
        Arc::new(BasicEngine::new()),
        Arc::new(files),
        Arc::new(sfc),
        CompilerOptions {
            manifest,
            ..CompilerOptions::new()
        },
    )
}

#[tokio::test]
async fn test_entry_without_imports_compiles_to_plain_module() {
    let files = InMemoryFiles::from_files([("/main.ts", "export const answer = 42\n")]);
    let compiler = playground_compiler(files, None);

    let code = compiler.compile("/main.ts").await.expect("compile succeeds");
    assert!(code.contains("export const answer = 42"));
    assert!(!code.contains("from 'lodash'"));
}

#[tokio::test]
async fn test_full_playground_graph() {
    let manifest =
        PackageManifest::from_json(r#"{ "dependencies": { "lodash": "^4.17.21" } }"#).unwrap();
    let files = InMemoryFiles::from_files([
        (
            "/main.ts",
            "import { shout } from './lib/shout'\nimport App from './App.vue'\nimport './theme.css'\nimport debounce from 'lodash'\nconsole.log(shout('hi'), App, debounce)\n",
        ),
        (
            "/lib/shout.ts",
            "export const shout = (s: string) => s.toUpperCase()\n",
        ),
        ("/App.vue", "<template><h1>hi</h1></template>\n"),
        ("/theme.css", "body { margin: 0 }\n"),
    ]);
    let compiler = playground_compiler(files, Some(manifest));

    let code = compiler.compile("/main.ts").await.expect("compile succeeds");

    // Local modules inlined.
    assert!(code.contains("s.toUpperCase()"));
    assert!(code.contains("export default component"));
    // Stylesheet became an installation script.
    assert!(code.contains("body { margin: 0 }"));
    assert!(code.contains("document.head.appendChild"));
    // Bare import rewritten to a pinned CDN URL, nothing left unresolved.
    assert!(code.contains("https://esm.sh/lodash@4.17.21"));
    assert!(!code.contains("from 'lodash'"));
}

#[tokio::test]
async fn test_missing_import_is_a_structured_failure() {
    let files = InMemoryFiles::from_files([("/main.ts", "import { x } from './nope'\n")]);
    let compiler = playground_compiler(files, None);

    let err = compiler.compile("/main.ts").await.unwrap_err();
    assert!(!err.message.is_empty());
    assert!(err.message.contains("/nope"));
}

#[tokio::test]
async fn test_rewrite_disabled_leaves_bare_imports_alone() {
    init_logging();
    let files = InMemoryFiles::from_files([(
        "/main.ts",
        "import debounce from 'lodash'\nconsole.log(debounce)\n",
    )]);
    let sfc = SfcStub::script_only("export default {}");
    let compiler = Compiler::new(
        Arc::new(BasicEngine::new()),
        Arc::new(files),
        Arc::new(sfc),
        CompilerOptions {
            rewrite_bare_imports: false,
            ..CompilerOptions::new()
        },
    );

    let code = compiler.compile("/main.ts").await.expect("compile succeeds");
    assert!(code.contains("from 'lodash'"));
}

#[tokio::test]
async fn test_per_call_manifest_override() {
    let files = InMemoryFiles::from_files([(
        "/main.ts",
        "import dayjs from 'dayjs'\nconsole.log(dayjs)\n",
    )]);
    let compiler = playground_compiler(files, None);

    let overrides = BuildOverrides {
        manifest: Some(
            PackageManifest::from_json(r#"{ "dependencies": { "dayjs": "~1.11.10" } }"#).unwrap(),
        ),
        ..BuildOverrides::default()
    };
    let code = compiler
        .compile_with("/main.ts", overrides)
        .await
        .expect("compile succeeds");
    assert!(code.contains("https://esm.sh/dayjs@1.11.10"));
}

//! The resolve/load plugin registered against the bundling engine.
//!
//! One instance is built per compile call. It classifies every import edge
//! (entry / relative / bare), answers resolve requests with virtual paths or
//! external CDN URLs, and transforms module contents on load (components to
//! script, stylesheets to injection scripts).

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cdn;
use crate::engine::traits::{
    BundlePlugin, LoadArgs, LoadOutput, PluginError, ResolveArgs, ResolveKind, Resolution,
    loader_for_ext,
};
use crate::manifest::DependencyMap;
use crate::paths;
use crate::sfc::adapter::transform_component;
use crate::sfc::traits::ComponentCompiler;
use crate::styles::{REMOTE_PREFIX, css_to_js};
use crate::vfs::traits::FileResolver;

static FRAMEWORK_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+React\b").expect("import pattern compiles"));
static FRAMEWORK_USAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bReact\.|\buse[A-Z]\w*\s*\(").expect("usage pattern compiles"));

/// Prepends the framework's root import when a snippet uses hooks or the
/// `React.` namespace without importing it. Playground convenience for
/// snippets that omit the boilerplate line.
fn inject_framework_import(contents: &str) -> String {
    if !FRAMEWORK_IMPORT_RE.is_match(contents) && FRAMEWORK_USAGE_RE.is_match(contents) {
        format!("import React from \"react\";\n{contents}")
    } else {
        contents.to_string()
    }
}

pub struct ResolveLoadPlugin {
    files: Arc<dyn FileResolver>,
    sfc: Arc<dyn ComponentCompiler>,
    dependencies: Option<DependencyMap>,
    esm_host: String,
    rewrite_bare_imports: bool,
}

impl ResolveLoadPlugin {
    pub fn new(
        files: Arc<dyn FileResolver>,
        sfc: Arc<dyn ComponentCompiler>,
        dependencies: Option<DependencyMap>,
        esm_host: String,
        rewrite_bare_imports: bool,
    ) -> Self {
        Self {
            files,
            sfc,
            dependencies,
            esm_host,
            rewrite_bare_imports,
        }
    }

    fn resolve_bare(&self, specifier: &str) -> Resolution {
        if !self.rewrite_bare_imports {
            return Resolution {
                path: specifier.to_string(),
                external: true,
            };
        }
        let url = cdn::resolve_url(self.dependencies.as_ref(), specifier, &self.esm_host);
        if url.ends_with(".css") {
            // Remote stylesheets still go through the load path so their
            // content gets the style-to-script transform.
            Resolution {
                path: format!("/{url}"),
                external: false,
            }
        } else {
            Resolution {
                path: url,
                external: true,
            }
        }
    }
}

#[async_trait::async_trait]
impl BundlePlugin for ResolveLoadPlugin {
    async fn on_resolve(&self, args: &ResolveArgs) -> Result<Resolution, PluginError> {
        match args.kind {
            ResolveKind::EntryPoint => Ok(Resolution {
                path: format!("/{}", args.path.trim_start_matches('/')),
                external: false,
            }),
            ResolveKind::ImportStatement => {
                if args.path.starts_with('.') {
                    let dir = paths::dirname(&args.importer);
                    Ok(Resolution {
                        path: paths::join(dir, &args.path),
                        external: false,
                    })
                } else {
                    Ok(self.resolve_bare(&args.path))
                }
            }
            other => Err(PluginError::Unresolvable(other)),
        }
    }

    async fn on_load(&self, args: &LoadArgs) -> Result<LoadOutput, PluginError> {
        let ext = paths::extname(&args.path);

        if args.path.starts_with(REMOTE_PREFIX) {
            // Remote stylesheet: content is fetched by the codegen itself,
            // never through the virtual file set.
            let contents = css_to_js(&args.path, None).await?;
            return Ok(LoadOutput {
                contents,
                loader: loader_for_ext(ext),
            });
        }

        let mut contents = self.files.get_file_content(&args.path).await?;
        match ext {
            ".vue" => {
                let filename = paths::basename(&args.path);
                contents = transform_component(self.sfc.as_ref(), filename, &contents).await?;
            }
            ".css" => {
                contents = css_to_js(&args.path, Some(&contents)).await?;
            }
            ".jsx" | ".tsx" => {
                contents = inject_framework_import(&contents);
            }
            _ => {}
        }

        Ok(LoadOutput {
            contents,
            loader: loader_for_ext(ext),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::Loader;
    use crate::sfc::stubs::SfcStub;
    use crate::sfc::traits::SfcOutput;
    use crate::vfs::traits::{FileError, MockFileResolver};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn plugin_with(
        files: MockFileResolver,
        sfc: SfcStub,
        dependencies: Option<DependencyMap>,
        rewrite_bare_imports: bool,
    ) -> ResolveLoadPlugin {
        ResolveLoadPlugin::new(
            Arc::new(files),
            Arc::new(sfc),
            dependencies,
            cdn::DEFAULT_ESM_HOST.to_string(),
            rewrite_bare_imports,
        )
    }

    fn default_plugin() -> ResolveLoadPlugin {
        plugin_with(
            MockFileResolver::new(),
            SfcStub::script_only("export default {}"),
            None,
            true,
        )
    }

    fn deps(entries: &[(&str, &str)]) -> DependencyMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
    }

    #[tokio::test]
    async fn test_entry_point_is_rooted_and_never_external() {
        let plugin = default_plugin();
        let resolved = plugin
            .on_resolve(&ResolveArgs {
                path: "main.ts".to_string(),
                importer: String::new(),
                kind: ResolveKind::EntryPoint,
            })
            .await
            .unwrap();
        assert_eq!(resolved.path, "/main.ts");
        assert!(!resolved.external);
    }

    #[tokio::test]
    async fn test_relative_import_resolves_against_importer_directory() {
        let plugin = default_plugin();
        let resolved = plugin
            .on_resolve(&ResolveArgs {
                path: "../lib/util".to_string(),
                importer: "/src/pages/home.ts".to_string(),
                kind: ResolveKind::ImportStatement,
            })
            .await
            .unwrap();
        assert_eq!(resolved.path, "/src/lib/util");
        assert!(!resolved.external);
    }

    #[tokio::test]
    async fn test_bare_import_resolves_to_external_cdn_url() {
        let plugin = plugin_with(
            MockFileResolver::new(),
            SfcStub::script_only(""),
            Some(deps(&[("lodash", "^4.17.21")])),
            true,
        );
        let resolved = plugin
            .on_resolve(&ResolveArgs {
                path: "lodash".to_string(),
                importer: "/main.ts".to_string(),
                kind: ResolveKind::ImportStatement,
            })
            .await
            .unwrap();
        assert_eq!(resolved.path, "https://esm.sh/lodash@4.17.21");
        assert!(resolved.external);
    }

    #[tokio::test]
    async fn test_bare_stylesheet_import_stays_internal() {
        let plugin = plugin_with(
            MockFileResolver::new(),
            SfcStub::script_only(""),
            Some(deps(&[("normalize.css", "8.0.1")])),
            true,
        );
        let resolved = plugin
            .on_resolve(&ResolveArgs {
                path: "normalize.css/normalize.css".to_string(),
                importer: "/main.ts".to_string(),
                kind: ResolveKind::ImportStatement,
            })
            .await
            .unwrap();
        assert!(!resolved.external);
        assert!(resolved.path.starts_with("/https://esm.sh/"));
        assert!(resolved.path.ends_with(".css"));
    }

    #[tokio::test]
    async fn test_rewrite_disabled_passes_bare_import_through() {
        let plugin = plugin_with(
            MockFileResolver::new(),
            SfcStub::script_only(""),
            Some(deps(&[("lodash", "^4.17.21")])),
            false,
        );
        let resolved = plugin
            .on_resolve(&ResolveArgs {
                path: "lodash".to_string(),
                importer: "/main.ts".to_string(),
                kind: ResolveKind::ImportStatement,
            })
            .await
            .unwrap();
        assert_eq!(resolved.path, "lodash");
        assert!(resolved.external);
    }

    #[tokio::test]
    async fn test_unknown_resolve_kind_is_a_protocol_violation() {
        let plugin = default_plugin();
        let err = plugin
            .on_resolve(&ResolveArgs {
                path: "./x".to_string(),
                importer: "/main.ts".to_string(),
                kind: ResolveKind::RequireCall,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::Unresolvable(ResolveKind::RequireCall)
        ));
    }

    #[tokio::test]
    async fn test_load_typescript_untouched() {
        let mut files = MockFileResolver::new();
        files
            .expect_get_file_content()
            .returning(|_| Ok("export const x = 1".to_string()));
        let plugin = plugin_with(files, SfcStub::script_only(""), None, true);

        let loaded = plugin
            .on_load(&LoadArgs {
                path: "/main.ts".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(loaded.contents, "export const x = 1");
        assert_eq!(loaded.loader, Loader::Ts);
    }

    #[tokio::test]
    async fn test_load_stylesheet_becomes_install_script() {
        let mut files = MockFileResolver::new();
        files
            .expect_get_file_content()
            .returning(|_| Ok("h1 { color: red }".to_string()));
        let plugin = plugin_with(files, SfcStub::script_only(""), None, true);

        let loaded = plugin
            .on_load(&LoadArgs {
                path: "/app.css".to_string(),
            })
            .await
            .unwrap();
        assert!(loaded.contents.contains("document.head.appendChild"));
        assert!(loaded.contents.contains("h1 { color: red }"));
        assert_eq!(loaded.loader, Loader::Js);
    }

    #[tokio::test]
    async fn test_load_component_goes_through_sfc_compiler() {
        let mut files = MockFileResolver::new();
        files
            .expect_get_file_content()
            .returning(|_| Ok("<template><h1>hi</h1></template>".to_string()));
        let sfc = SfcStub::new(
            SfcOutput::Compiled {
                script: "const comp = {}; export default comp".to_string(),
                style: "h1 { font-weight: bold }".to_string(),
            },
            Duration::ZERO,
        );
        let plugin = plugin_with(files, sfc, None, true);

        let loaded = plugin
            .on_load(&LoadArgs {
                path: "/App.vue".to_string(),
            })
            .await
            .unwrap();
        assert!(loaded.contents.starts_with("const comp = {}"));
        assert!(loaded.contents.contains("h1 { font-weight: bold }"));
        assert_eq!(loaded.loader, Loader::Js);
    }

    #[tokio::test]
    async fn test_load_missing_file_propagates_not_found() {
        let mut files = MockFileResolver::new();
        files.expect_get_file_content().returning(|path| {
            Err(FileError::NotFound {
                path: path.to_string(),
            })
        });
        let plugin = plugin_with(files, SfcStub::script_only(""), None, true);

        let err = plugin
            .on_load(&LoadArgs {
                path: "/missing.ts".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::File(FileError::NotFound { .. })));
    }

    #[test]
    fn test_framework_import_injected_only_when_needed() {
        let hooked = "const [n, setN] = useState(0)";
        let injected = inject_framework_import(hooked);
        assert!(injected.starts_with("import React from \"react\";\n"));

        let already = "import React from 'react'\nconst x = React.createElement('div')";
        assert_eq!(inject_framework_import(already), already);

        let unrelated = "export const plain = 1";
        assert_eq!(inject_framework_import(unrelated), unrelated);
    }
}

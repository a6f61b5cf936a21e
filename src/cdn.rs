//! Bare-specifier to CDN URL derivation.
//!
//! A bare import such as `lodash/debounce` never exists in the virtual file
//! tree. It is rewritten to a module URL on an esm CDN so the browser's own
//! loader fetches it at run time.

use crate::manifest::DependencyMap;

/// Default CDN module host.
pub const DEFAULT_ESM_HOST: &str = "https://esm.sh";

/// The framework runtime must match the reconciler embedded in the
/// playground shell, so these packages ignore the manifest entirely.
const FRAMEWORK_PACKAGES: [&str; 2] = ["react", "react-dom"];
const FRAMEWORK_PINNED_VERSION: &str = "18.2.0";

/// Strips semver range tokens (`^ ~ latest = >= <= > < *`), leaving a
/// concrete version usable in a CDN path segment. Idempotent.
pub fn clean_version(version: &str) -> String {
    version
        .replace("latest", "")
        .chars()
        .filter(|c| !matches!(c, '^' | '~' | '=' | '>' | '<' | '*'))
        .collect()
}

/// Derives the package name of a specifier.
///
/// Scoped specifiers keep two segments (`@scope/pkg/dist/x` -> `@scope/pkg`)
/// unless the whole specifier is itself a manifest key, in which case the
/// manifest entry wins.
fn package_name<'a>(deps: Option<&DependencyMap>, specifier: &'a str) -> &'a str {
    if specifier.starts_with('@') {
        if deps.is_some_and(|d| d.contains_key(specifier)) {
            return specifier;
        }
        let mut separators = specifier.match_indices('/');
        separators.next();
        match separators.next() {
            Some((idx, _)) => &specifier[..idx],
            None => specifier,
        }
    } else {
        specifier.split('/').next().unwrap_or(specifier)
    }
}

/// Resolves a bare import specifier to a CDN module URL.
///
/// With a declared version the URL pins it (`<host>/pkg@1.2.3`, sub-paths
/// preserved). Without one the whole specifier is forwarded unchanged and the
/// CDN's default-version resolution applies.
pub fn resolve_url(deps: Option<&DependencyMap>, specifier: &str, host: &str) -> String {
    let name = package_name(deps, specifier);
    let sub_path = &specifier[name.len()..];

    if FRAMEWORK_PACKAGES.contains(&name) {
        return format!("{host}/stable/{name}@{FRAMEWORK_PINNED_VERSION}{sub_path}");
    }

    let version = deps
        .and_then(|d| d.get(name))
        .map(|range| clean_version(range))
        .filter(|v| !v.is_empty());

    match version {
        Some(version) => format!("{host}/{name}@{version}{sub_path}"),
        None => format!("{host}/{specifier}"),
    }
}

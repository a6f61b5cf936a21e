use std::collections::BTreeMap;

use serde::Deserialize;

/// Declared package versions, keyed by package name. Taken from the
/// `dependencies` field of a manifest.
pub type DependencyMap = BTreeMap<String, String>;

/// The subset of a `package.json`-style manifest the compiler cares about.
/// Unknown fields are ignored on deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,
}

impl PackageManifest {
    /// Parses a manifest from raw JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn dependencies(&self) -> Option<&DependencyMap> {
        self.dependencies.as_ref()
    }
}

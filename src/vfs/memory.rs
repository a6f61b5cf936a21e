use dashmap::DashMap;

use crate::vfs::traits::{FileError, FileResolver};

/// In-memory virtual file set backing a playground session.
#[derive(Debug, Default)]
pub struct InMemoryFiles {
    files: DashMap<String, String>,
}

impl InMemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let files = DashMap::new();
        for (path, contents) in entries {
            files.insert(path.into(), contents.into());
        }
        Self { files }
    }

    pub fn insert(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn remove(&self, path: &str) {
        self.files.remove(path);
    }

    /// Looks a path up by prefix: `/App` finds `/App.vue`. An exact entry
    /// wins over a prefix match.
    fn lookup(&self, path: &str) -> Option<String> {
        if let Some(exact) = self.files.get(path) {
            return Some(exact.clone());
        }
        self.files
            .iter()
            .find(|entry| entry.key().starts_with(path))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait::async_trait]
impl FileResolver for InMemoryFiles {
    async fn get_file_content(&self, path: &str) -> Result<String, FileError> {
        self.lookup(path).ok_or_else(|| FileError::NotFound {
            path: path.to_string(),
        })
    }
}

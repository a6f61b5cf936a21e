#[derive(Debug, Clone, thiserror::Error)]
pub enum FileError {
    #[error("file not found: {path}")]
    NotFound { path: String },
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Caller-supplied access to the virtual file set. The compiler never touches
/// real storage; every source read goes through this capability.
#[mockall::automock]
#[async_trait::async_trait]
pub trait FileResolver: std::fmt::Debug + Send + Sync {
    async fn get_file_content(&self, path: &str) -> Result<String, FileError>;
}

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a run. All variants are fatal: the binary
/// prints the message to stderr and exits with status 1.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required vault path (run with --help for usage)")]
    MissingVaultPath,
    #[error("minimum-tagged-notes must be an integer, got {0:?}")]
    InvalidThreshold(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("failed to read cache {}: {source}", .path.display())]
    CacheRead { path: PathBuf, source: io::Error },
    #[error("malformed cache {}: {source}", .path.display())]
    CacheParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to read vault registry {}: {source}", .path.display())]
    RegistryRead { path: PathBuf, source: io::Error },
    #[error("malformed vault registry {}: {source}", .path.display())]
    RegistryParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("vault {} is not registered in obsidian.json", .path.display())]
    VaultNotRegistered { path: PathBuf },
    #[error("failed to read note {}: {source}", .path.display())]
    NoteRead { path: PathBuf, source: io::Error },
    #[error("failed to create tag folder {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write tag file {}: {source}", .path.display())]
    WriteTag { path: PathBuf, source: io::Error },
    #[error("concurrency limiter closed")]
    Limiter(#[from] tokio::sync::AcquireError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

//! Mod-layer error types.

use std::path::PathBuf;

/// Errors raised while reading a `mod.json`.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} has an empty id", .path.display())]
    EmptyId { path: PathBuf },
}

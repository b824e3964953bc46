use std::path::PathBuf;
use thiserror::Error;

/// Every failure aborts the run; no partial index is written.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read plugins directory {path:?}: {source}")]
    PluginsDirRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open archive {path:?} for plugin {plugin}: {source}")]
    ArchiveRead {
        plugin: String,
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {path:?} has no manifest entry {entry} for plugin {plugin}")]
    ManifestNotFound {
        plugin: String,
        path: PathBuf,
        entry: String,
    },

    #[error("invalid manifest {entry} in {path:?} for plugin {plugin}: {reason}")]
    ManifestParse {
        plugin: String,
        path: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("manifest for plugin {plugin} has no string InternalName")]
    MissingInternalName { plugin: String },

    #[error("manifest for plugin {plugin} has InternalName {name:?}, which is not a plain directory name")]
    InvalidInternalName { plugin: String, name: String },

    #[error("failed to stat {path:?}: {source}")]
    FileStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;

//! Index configuration.
//!
//! The tables here are plain data handed to the shaping functions; nothing in
//! the crate reads process-wide state.

use crate::plugin::{ARCHIVE_NAME, DOWNLOAD_LINK_INSTALL, DOWNLOAD_LINK_TESTING, DOWNLOAD_LINK_UPDATE};
use serde_json::Value;
use std::path::PathBuf;

pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com/WINDOWCOLLAPSIBLE/someutils/raw/master";
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";
pub const DEFAULT_OUTPUT: &str = "pluginmaster.json";

/// Keys kept from the raw manifest, in output order.
pub const TRIMMED_KEYS: [&str; 11] = [
    "Author",
    "Name",
    "Description",
    "InternalName",
    "AssemblyVersion",
    "RepoUrl",
    "ApplicableVersion",
    "Tags",
    "DalamudApiLevel",
    "IsTestingExclusive",
    "IconUrl",
];

#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Directory holding one subdirectory per plugin.
    pub plugins_dir: PathBuf,
    pub output_path: PathBuf,
    /// Download links are `<download_base>/plugins/<InternalName>/latest.zip`.
    pub download_base: String,
    /// Applied only when the key is absent.
    pub defaults: Vec<(String, Value)>,
    /// Source key to the keys copied from it when absent.
    pub duplicates: Vec<(String, Vec<String>)>,
    pub trimmed_keys: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            defaults: vec![
                ("IsHide".to_string(), Value::Bool(false)),
                ("IsTestingExclusive".to_string(), Value::Bool(false)),
                ("ApplicableVersion".to_string(), Value::String("any".to_string())),
            ],
            duplicates: vec![(
                DOWNLOAD_LINK_INSTALL.to_string(),
                vec![DOWNLOAD_LINK_TESTING.to_string(), DOWNLOAD_LINK_UPDATE.to_string()],
            )],
            trimmed_keys: TRIMMED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl IndexConfig {
    /// Configuration rooted at `root`: plugins are read from `<root>/plugins`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: root.into().join(DEFAULT_PLUGINS_DIR),
            ..Self::default()
        }
    }

    pub fn download_link(&self, internal_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.download_base.trim_end_matches('/'),
            DEFAULT_PLUGINS_DIR,
            internal_name,
            ARCHIVE_NAME
        )
    }

    /// Archive whose modification time stamps `LastUpdated`.
    pub fn archive_path(&self, internal_name: &str) -> PathBuf {
        self.plugins_dir.join(internal_name).join(ARCHIVE_NAME)
    }
}

use crate::error::{IndexError, Result};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};

/// A plugin manifest, raw or shaped. Keys keep insertion order.
pub type Manifest = Map<String, Value>;

/// Archive file name expected in every plugin directory.
pub const ARCHIVE_NAME: &str = "latest.zip";

pub const INTERNAL_NAME: &str = "InternalName";
pub const DOWNLOAD_LINK_INSTALL: &str = "DownloadLinkInstall";
pub const DOWNLOAD_LINK_TESTING: &str = "DownloadLinkTesting";
pub const DOWNLOAD_LINK_UPDATE: &str = "DownloadLinkUpdate";
pub const DOWNLOAD_COUNT: &str = "DownloadCount";
pub const LAST_UPDATED: &str = "LastUpdated";

/// A plugin directory that carries a packaged archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    /// Directory name, expected to match the manifest's `InternalName`.
    pub name: String,
    pub archive_path: PathBuf,
}

impl DiscoveredPlugin {
    /// Name of the manifest entry inside the archive.
    pub fn manifest_entry(&self) -> String {
        format!("{}.json", self.name)
    }
}

/// Returns the manifest's `InternalName`.
///
/// It names the plugin's directory under `plugins/`, so it must be a string
/// holding a single plain path component.
pub fn internal_name<'a>(manifest: &'a Manifest, plugin: &str) -> Result<&'a str> {
    let name = manifest
        .get(INTERNAL_NAME)
        .and_then(Value::as_str)
        .ok_or_else(|| IndexError::MissingInternalName {
            plugin: plugin.to_string(),
        })?;

    let mut components = Path::new(name).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    );
    if !single_component {
        return Err(IndexError::InvalidInternalName {
            plugin: plugin.to_string(),
            name: name.to_string(),
        });
    }

    Ok(name)
}

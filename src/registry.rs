//! Plugin discovery and manifest extraction.
//!
//! The repository keeps one directory per plugin under `plugins/`:
//!
//! ```text
//! plugins/
//!   Foo/
//!     latest.zip      <- contains Foo.json
//!   Bar/
//!     latest.zip      <- contains Bar.json
//!   Drafts/           <- no latest.zip, skipped
//! ```
//!
//! Directories are visited in name order so the index comes out the same on
//! every filesystem.

use crate::error::{IndexError, Result};
use crate::plugin::{DiscoveredPlugin, Manifest, ARCHIVE_NAME};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Lists every immediate subdirectory of `plugins_dir` holding a `latest.zip`.
pub fn discover_plugins(plugins_dir: &Path) -> Result<Vec<DiscoveredPlugin>> {
    let dir_error = |source| IndexError::PluginsDirRead {
        path: plugins_dir.to_path_buf(),
        source,
    };

    let mut plugins = Vec::new();

    for entry in fs::read_dir(plugins_dir).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        let path = entry.path();

        if !path.is_dir() {
            continue;
        }

        let archive_path = path.join(ARCHIVE_NAME);
        if !archive_path.is_file() {
            debug!(dir = %path.display(), "no {ARCHIVE_NAME}, skipping");
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            warn!(dir = %path.display(), "plugin directory name is not valid UTF-8, skipping");
            continue;
        };

        plugins.push(DiscoveredPlugin { name, archive_path });
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(plugins)
}

/// Reads `<name>.json` out of the plugin's archive.
///
/// The archive is closed before this returns.
pub fn read_manifest(plugin: &DiscoveredPlugin) -> Result<Manifest> {
    let archive_error = |source| IndexError::ArchiveRead {
        plugin: plugin.name.clone(),
        path: plugin.archive_path.clone(),
        source,
    };
    let entry_name = plugin.manifest_entry();

    let file = fs::File::open(&plugin.archive_path).map_err(|e| archive_error(ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;

    let mut entry = match archive.by_name(&entry_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(IndexError::ManifestNotFound {
                plugin: plugin.name.clone(),
                path: plugin.archive_path.clone(),
                entry: entry_name,
            })
        }
        Err(e) => return Err(archive_error(e)),
    };

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| e.to_string())
        .and_then(|_| parse_manifest(&bytes))
        .map_err(|reason| IndexError::ManifestParse {
            plugin: plugin.name.clone(),
            path: plugin.archive_path.clone(),
            entry: entry_name,
            reason,
        })
}

fn parse_manifest(bytes: &[u8]) -> std::result::Result<Manifest, String> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(manifest)) => Ok(manifest),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn discovered(dir: &Path, name: &str) -> DiscoveredPlugin {
        DiscoveredPlugin {
            name: name.to_string(),
            archive_path: dir.join(name).join(ARCHIVE_NAME),
        }
    }

    #[test]
    fn discovers_only_directories_with_archive_in_name_order() {
        let tmp = tempdir().unwrap();
        let plugins = tmp.path();
        write_archive(&plugins.join("Zeta/latest.zip"), &[("Zeta.json", "{}")]);
        write_archive(&plugins.join("Alpha/latest.zip"), &[("Alpha.json", "{}")]);
        fs::create_dir_all(plugins.join("Drafts")).unwrap();
        fs::write(plugins.join("Drafts/notes.txt"), "wip").unwrap();
        fs::write(plugins.join("README.md"), "top-level file").unwrap();

        let found = discover_plugins(plugins).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Zeta"]);
        assert_eq!(found[0].archive_path, plugins.join("Alpha").join("latest.zip"));
    }

    #[test]
    fn missing_plugins_dir_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = discover_plugins(&tmp.path().join("plugins")).unwrap_err();
        assert!(matches!(err, IndexError::PluginsDirRead { .. }));
    }

    #[test]
    fn reads_manifest_entry() {
        let tmp = tempdir().unwrap();
        write_archive(
            &tmp.path().join("Foo/latest.zip"),
            &[
                ("Foo.dll", "binary"),
                ("Foo.json", r#"{"InternalName":"Foo","Name":"Foo Plugin"}"#),
            ],
        );

        let manifest = read_manifest(&discovered(tmp.path(), "Foo")).unwrap();
        assert_eq!(manifest["InternalName"], "Foo");
        assert_eq!(manifest["Name"], "Foo Plugin");
    }

    #[test]
    fn manifest_entry_absent() {
        let tmp = tempdir().unwrap();
        write_archive(&tmp.path().join("Foo/latest.zip"), &[("Other.json", "{}")]);

        let err = read_manifest(&discovered(tmp.path(), "Foo")).unwrap_err();
        match err {
            IndexError::ManifestNotFound { plugin, entry, .. } => {
                assert_eq!(plugin, "Foo");
                assert_eq!(entry, "Foo.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn manifest_not_json() {
        let tmp = tempdir().unwrap();
        write_archive(&tmp.path().join("Foo/latest.zip"), &[("Foo.json", "{ nope")]);

        let err = read_manifest(&discovered(tmp.path(), "Foo")).unwrap_err();
        assert!(matches!(err, IndexError::ManifestParse { .. }));
    }

    #[test]
    fn manifest_not_an_object() {
        let tmp = tempdir().unwrap();
        write_archive(&tmp.path().join("Foo/latest.zip"), &[("Foo.json", "[1, 2]")]);

        let err = read_manifest(&discovered(tmp.path(), "Foo")).unwrap_err();
        match err {
            IndexError::ManifestParse { reason, .. } => assert!(reason.contains("an array")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_archive() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("Foo")).unwrap();
        fs::write(tmp.path().join("Foo/latest.zip"), b"definitely not a zip").unwrap();

        let err = read_manifest(&discovered(tmp.path(), "Foo")).unwrap_err();
        assert!(matches!(err, IndexError::ArchiveRead { .. }));
    }

    #[test]
    fn damaged_manifest_entry() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("Foo/latest.zip");
        let contents = r#"{"InternalName":"Foo"}"#;
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(fs::File::create(&archive).unwrap());
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("Foo.json", stored).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
        writer.finish().unwrap();

        // flip one payload byte so the entry fails its checksum
        let mut bytes = fs::read(&archive).unwrap();
        let at = bytes
            .windows(contents.len())
            .position(|w| w == contents.as_bytes())
            .unwrap();
        bytes[at + 2] ^= 0x01;
        fs::write(&archive, &bytes).unwrap();

        let err = read_manifest(&discovered(tmp.path(), "Foo")).unwrap_err();
        match err {
            IndexError::ManifestParse { plugin, entry, .. } => {
                assert_eq!(plugin, "Foo");
                assert_eq!(entry, "Foo.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn skips_directory_with_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let odd = tmp.path().join(OsStr::from_bytes(b"Bad\xffName"));
        write_archive(&odd.join("latest.zip"), &[("x.json", "{}")]);
        write_archive(&tmp.path().join("Foo/latest.zip"), &[("Foo.json", "{}")]);

        let found = discover_plugins(tmp.path()).unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Foo"]);
    }
}

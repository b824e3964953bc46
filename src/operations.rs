//! Manifest shaping operations (trim, enrich, timestamp, write).
//!
//! Each step takes the configuration tables explicitly, so a single entry can
//! be shaped and checked in isolation.

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::plugin::{Manifest, DOWNLOAD_COUNT, DOWNLOAD_LINK_INSTALL, LAST_UPDATED};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Keep only the allow-listed keys that are present, in allow-list order.
pub fn trim_manifest(manifest: &Manifest, config: &IndexConfig) -> Manifest {
    config
        .trimmed_keys
        .iter()
        .filter_map(|key| manifest.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}

/// Add the fields the distribution client expects on top of the trimmed manifest.
///
/// The install link and the defaults are set before duplication runs, because
/// duplicated keys copy the current value of their source.
pub fn add_extra_fields(manifest: &mut Manifest, internal_name: &str, config: &IndexConfig) {
    manifest.insert(
        DOWNLOAD_LINK_INSTALL.to_string(),
        Value::String(config.download_link(internal_name)),
    );

    for (key, value) in &config.defaults {
        if !manifest.contains_key(key) {
            manifest.insert(key.clone(), value.clone());
        }
    }

    for (source, keys) in &config.duplicates {
        let Some(value) = manifest.get(source).cloned() else {
            continue;
        };
        for key in keys {
            if !manifest.contains_key(key) {
                manifest.insert(key.clone(), value.clone());
            }
        }
    }

    // Placeholder; no download telemetry reaches the generator.
    manifest.insert(DOWNLOAD_COUNT.to_string(), Value::from(0));
}

/// Archive modification time in whole seconds since the epoch.
pub fn archive_mtime(path: &Path) -> Result<i64> {
    let stat_error = |source| IndexError::FileStat {
        path: path.to_path_buf(),
        source,
    };
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(stat_error)?;

    Ok(epoch_seconds(modified))
}

/// Seconds since the epoch, truncated toward zero.
fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

/// Stamp `LastUpdated` with the archive's modification time.
///
/// An existing value is left as written when it denotes the same second, so
/// re-running over unchanged archives keeps the field stable.
pub fn update_last_updated(
    manifest: &mut Manifest,
    internal_name: &str,
    config: &IndexConfig,
) -> Result<()> {
    let modified = archive_mtime(&config.archive_path(internal_name))?;

    let current = manifest.get(LAST_UPDATED).and_then(stored_timestamp);
    if current == Some(modified) {
        debug!(plugin = %internal_name, last_updated = modified, "archive unchanged");
        return Ok(());
    }

    debug!(
        plugin = %internal_name,
        last_updated = modified,
        at = %DateTime::<Utc>::from_timestamp(modified, 0).unwrap_or_default().to_rfc3339(),
        "stamping LastUpdated"
    );
    manifest.insert(LAST_UPDATED.to_string(), Value::String(modified.to_string()));

    Ok(())
}

/// Integer reading of a stored `LastUpdated`; `None` when it has none.
fn stored_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Write the index as 4-space indented JSON, replacing `path` only once the
/// whole document is on disk.
pub fn write_master(master: &[Manifest], path: &Path) -> Result<()> {
    let write_error = |source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut content = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut content, PrettyFormatter::with_indent(b"    "));
    master
        .serialize(&mut serializer)
        .map_err(|e| write_error(io::Error::from(e)))?;
    content.push(b'\n');

    let tmp_path = temp_path(path);
    if let Err(e) = fs::write(&tmp_path, &content).and_then(|_| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(e));
    }

    debug!(path = %path.display(), entries = master.len(), "wrote master list");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

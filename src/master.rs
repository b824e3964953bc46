//! Master list assembly.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::operations::{add_extra_fields, trim_manifest, update_last_updated, write_master};
use crate::plugin::{internal_name, Manifest};
use crate::registry::{discover_plugins, read_manifest};
use tracing::{info, warn};

/// Builds every entry of the master list in memory.
///
/// Plugins are processed one at a time, in directory name order. The first
/// failure aborts the build.
pub fn build_master(config: &IndexConfig) -> Result<Vec<Manifest>> {
    let plugins = discover_plugins(&config.plugins_dir)?;
    let mut master = Vec::with_capacity(plugins.len());

    for plugin in &plugins {
        info!(plugin = %plugin.name, "indexing plugin");

        let raw = read_manifest(plugin)?;
        let mut entry = trim_manifest(&raw, config);

        let name = internal_name(&entry, &plugin.name)?.to_string();
        if name != plugin.name {
            warn!(
                plugin = %plugin.name,
                internal_name = %name,
                "InternalName does not match its directory"
            );
        }

        add_extra_fields(&mut entry, &name, config);
        update_last_updated(&mut entry, &name, config)?;

        master.push(entry);
    }

    Ok(master)
}

/// Builds the master list and writes it to `config.output_path`.
///
/// Returns the number of entries written. The output file is left untouched
/// when the build fails.
pub fn generate(config: &IndexConfig) -> Result<usize> {
    let master = build_master(config)?;
    write_master(&master, &config.output_path)?;

    info!(
        path = %config.output_path.display(),
        entries = master.len(),
        "master list written"
    );
    Ok(master.len())
}

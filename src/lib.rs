//! Plugin master list generator.
//!
//! Builds the plugin repository index (`pluginmaster.json`) consumed by the
//! plugin distribution client, from a tree of packaged plugins laid out as
//! `plugins/<InternalName>/latest.zip`.
//!
//! # Pipeline
//!
//! ## Discovery (`registry` module)
//! - `discover_plugins()` - Find every plugin directory holding a `latest.zip`
//! - `read_manifest()` - Read `<InternalName>.json` out of the archive
//!
//! ## Shaping (`operations` module)
//! - `trim_manifest()` - Keep only the allow-listed keys
//! - `add_extra_fields()` - Download links, defaults, duplicated keys, download count
//! - `update_last_updated()` - Stamp `LastUpdated` from the archive mtime
//! - `write_master()` - Write the index atomically as indented JSON
//!
//! ## Orchestration (`master` module)
//! - `build_master()` - Run every plugin through the pipeline in memory
//! - `generate()` - Build, then write once
//!
//! Every error is fatal: nothing is written unless the whole index was built.

pub mod config;
pub mod error;
pub mod master;
pub mod operations;
pub mod plugin;
pub mod registry;

pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use master::{build_master, generate};
pub use plugin::{DiscoveredPlugin, Manifest};

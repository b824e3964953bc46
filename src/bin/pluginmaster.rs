use anyhow::{Context, Result};
use clap::Parser;
use pluginmaster::config::DEFAULT_OUTPUT;
use pluginmaster::{generate, IndexConfig};
use std::path::PathBuf;

/// Generate pluginmaster.json from plugins/<InternalName>/latest.zip.
#[derive(Parser, Debug)]
#[command(name = "pluginmaster", version, about, long_about = None)]
struct Cli {
    /// Repository root containing the `plugins` directory.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Where to write the master list.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Base URL download links are built from.
    #[arg(long)]
    base_url: Option<String>,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = IndexConfig::with_root(&cli.root);
    config.output_path = cli.output;
    if let Some(base_url) = cli.base_url {
        config.download_base = base_url;
    }

    let count = generate(&config).with_context(|| {
        format!(
            "failed to generate master list from {:?}",
            config.plugins_dir
        )
    })?;

    println!("Indexed plugins: {count}");

    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pluginmaster={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

//! Headway - a terminal markdown outline navigator.
//!
//! # Usage
//!
//! ```bash
//! headway README.md
//! headway --watch README.md
//! headway --no-panel README.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use headway::app::App;
use headway::config::{
    ConfigFlags, PanelDimensions, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};

/// A terminal markdown outline navigator
#[derive(Parser, Debug)]
#[command(name = "headway", version, about, long_about = None)]
struct Cli {
    /// Markdown file to navigate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and re-extract the outline
    #[arg(short, long)]
    watch: bool,

    /// Start with the outline panel open
    #[arg(long)]
    panel: bool,

    /// Start with the outline panel closed
    #[arg(long, conflicts_with = "panel")]
    no_panel: bool,

    /// Outline panel width in columns
    #[arg(long, value_name = "COLS")]
    panel_width: Option<u16>,

    /// Outline panel height as a fraction of the window height
    #[arg(long, value_name = "FRACTION")]
    panel_height: Option<f32>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults in the config file
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn as_flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            panel: self.panel,
            no_panel: self.no_panel,
            panel_width: self.panel_width,
            panel_height: self.panel_height,
            log_file: self.log_file.clone(),
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let global_path = global_config_path();
    let local_path = local_override_path();
    if cli.clear {
        clear_config_flags(&global_path)?;
    }

    let saved = load_config_flags(&global_path)?
        .union(&load_config_flags(&local_path)?);
    let flags = saved.union(&cli.as_flags());

    if cli.save {
        save_config_flags(&global_path, &flags)?;
    }

    init_logging(flags.log_file.as_ref())?;

    let panel_dims = PanelDimensions::from_settings(flags.panel_width, flags.panel_height);
    let panel_visible = !flags.no_panel;

    App::new(cli.file)
        .with_watch(flags.watch)
        .with_panel_visible(panel_visible)
        .with_panel_dims(panel_dims)
        .run()
}

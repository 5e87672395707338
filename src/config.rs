use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Outline panel dimensions, each field independently clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelDimensions {
    /// Panel width in columns.
    pub width_cols: u16,
    /// Panel height as a fraction of the viewport height.
    pub max_height_fraction: f32,
}

pub const PANEL_WIDTH_DEFAULT: u16 = 42;
pub const PANEL_WIDTH_MIN: u16 = 20;
pub const PANEL_WIDTH_MAX: u16 = 120;
pub const PANEL_HEIGHT_DEFAULT: f32 = 0.6;
pub const PANEL_HEIGHT_MIN: f32 = 0.2;
pub const PANEL_HEIGHT_MAX: f32 = 0.9;

impl Default for PanelDimensions {
    fn default() -> Self {
        Self {
            width_cols: PANEL_WIDTH_DEFAULT,
            max_height_fraction: PANEL_HEIGHT_DEFAULT,
        }
    }
}

impl PanelDimensions {
    /// Build from possibly-missing, possibly-invalid settings. Each field
    /// falls back to its default independently; out-of-range values clamp.
    pub fn from_settings(width_cols: Option<u16>, max_height_fraction: Option<f32>) -> Self {
        let width_cols = width_cols
            .map_or(PANEL_WIDTH_DEFAULT, |w| {
                w.clamp(PANEL_WIDTH_MIN, PANEL_WIDTH_MAX)
            });
        let max_height_fraction = max_height_fraction
            .filter(|f| f.is_finite())
            .map_or(PANEL_HEIGHT_DEFAULT, |f| {
                f.clamp(PANEL_HEIGHT_MIN, PANEL_HEIGHT_MAX)
            });
        Self {
            width_cols,
            max_height_fraction,
        }
    }
}

/// Flag defaults persisted to an rc file and unioned with the CLI.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub panel: bool,
    pub no_panel: bool,
    pub panel_width: Option<u16>,
    pub panel_height: Option<f32>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            panel: self.panel || other.panel,
            no_panel: self.no_panel || other.no_panel,
            panel_width: other.panel_width.or(self.panel_width),
            panel_height: other.panel_height.or(self.panel_height),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("headway").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("headway")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("headway").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("headway")
                .join("config");
        }
    }

    PathBuf::from(".headwayrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".headwayrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# headway defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.panel {
        lines.push("--panel".to_string());
    }
    if flags.no_panel {
        lines.push("--no-panel".to_string());
    }
    if let Some(width) = flags.panel_width {
        lines.push(format!("--panel-width {width}"));
    }
    if let Some(height) = flags.panel_height {
        lines.push(format!("--panel-height {height}"));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--watch" {
            flags.watch = true;
        } else if token == "--panel" {
            flags.panel = true;
        } else if token == "--no-panel" {
            flags.no_panel = true;
        } else if token == "--panel-width" {
            if let Some(next) = tokens.get(i + 1) {
                flags.panel_width = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--panel-width=") {
            flags.panel_width = value.parse().ok();
        } else if token == "--panel-height" {
            if let Some(next) = tokens.get(i + 1) {
                flags.panel_height = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--panel-height=") {
            flags.panel_height = value.parse().ok();
        } else if token == "--log-file" {
            if let Some(next) = tokens.get(i + 1) {
                flags.log_file = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--log-file=") {
            flags.log_file = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

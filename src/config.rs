//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$CELLCHAT_CONFIG` (environment variable)
//! 2. `~/.config/cellchat/config.toml` (Linux/macOS)
//!    `%APPDATA%\cellchat\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::{ColorDepth, RenderPreferences};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Message rendering settings.
    pub display: DisplayConfig,
    /// Media store settings.
    pub media: MediaConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for media and logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Message rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Compact message view without inline media.
    pub bare_message_view: bool,
    /// Never render image previews inline.
    pub disable_images: bool,
    /// Color depth: "auto", "mono", "16", "256", "truecolor".
    pub color_depth: String,
}

/// Media store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Base URL used to build download links.
    pub homeserver_url: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bare_message_view: false,
            disable_images: false,
            color_depth: "auto".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            homeserver_url: "https://matrix.org".to_string(),
        }
    }
}

impl DisplayConfig {
    /// The configured color depth, detecting the terminal for `"auto"` or
    /// unrecognized values.
    pub fn color_depth(&self) -> ColorDepth {
        match ColorDepth::from_name(&self.color_depth) {
            Some(depth) => depth,
            None => {
                if !self.color_depth.eq_ignore_ascii_case("auto") {
                    tracing::warn!(
                        value = %self.color_depth,
                        "Unknown color depth, detecting from terminal"
                    );
                }
                ColorDepth::detect()
            }
        }
    }

    /// Render preferences described by this section.
    pub fn render_preferences(&self) -> RenderPreferences {
        RenderPreferences {
            bare_mode: self.bare_message_view,
            disable_images: self.disable_images,
            color_depth: self.color_depth(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("CELLCHAT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("cellchat").join("config.toml"))
}

/// Return the cache directory for media, logs, etc.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cellchat")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("cellchat.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(!cfg.display.bare_message_view);
        assert!(!cfg.display.disable_images);
        assert_eq!(cfg.display.color_depth, "auto");
        assert_eq!(cfg.media.homeserver_url, "https://matrix.org");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
        assert_eq!(parsed.display.color_depth, cfg.display.color_depth);
        assert_eq!(parsed.media.homeserver_url, cfg.media.homeserver_url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[display]
disable_images = true
color_depth = "256"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert!(cfg.display.disable_images);
        assert_eq!(cfg.display.color_depth(), ColorDepth::Ansi256);
        // Other fields use defaults
        assert!(!cfg.display.bare_message_view);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_render_preferences_from_display() {
        let display = DisplayConfig {
            bare_message_view: true,
            disable_images: false,
            color_depth: "mono".to_string(),
        };
        let prefs = display.render_preferences();
        assert!(prefs.bare_mode);
        assert!(!prefs.disable_images);
        assert_eq!(prefs.color_depth, ColorDepth::Mono);
        assert!(!prefs.allows_images());
    }

    #[test]
    fn test_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/cellchat-test"));
        assert_eq!(cache_dir(&cfg), PathBuf::from("/tmp/cellchat-test"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/cellchat-test/cellchat.log")
        );
    }
}

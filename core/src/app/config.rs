//! Configuration management (~/.config/controller-launch/config.toml)
//!
//! Handles loading, saving, and providing defaults for application settings.
//! Settings are stored in TOML format in the platform-specific config directory.
//! The play history (`games.recently_launched`) lives in the same file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app::input::ControllerConfig;
use crate::library::RecentEntry;

/// Application configuration.
///
/// Contains all user-configurable settings organized into sections.
/// Serialized to/from TOML format for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Startup behaviour
    #[serde(default)]
    pub general: GeneralConfig,
    /// Controller long-press timing, deadzone and button map
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Scan roots, display count and play history
    #[serde(default)]
    pub games: GamesConfig,
    /// Overlay presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Start the controller daemon with the session (default: true)
    #[serde(default = "default_true")]
    pub autostart: bool,
    /// Hide instead of quitting when the overlay closes (default: true)
    #[serde(default = "default_true")]
    pub minimize_to_tray: bool,
}

/// Game discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesConfig {
    /// Number of games shown in the overlay (default: 10)
    #[serde(default = "default_max_games_shown")]
    pub max_games_shown: usize,
    /// Executable names the custom scanner never reports
    #[serde(default = "default_custom_exclude")]
    pub custom_exclude: Vec<String>,
    /// Scan roots per source
    #[serde(default)]
    pub paths: GamePaths,
    /// Play history, most recent first
    #[serde(default)]
    pub recently_launched: Vec<RecentEntry>,
}

/// Scan roots per source. `~` expands to the home directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePaths {
    #[serde(default = "default_steam_paths")]
    pub steam: Vec<String>,
    #[serde(default = "default_flatpak_paths")]
    pub flatpak: Vec<String>,
    #[serde(default = "default_lutris_paths")]
    pub lutris: Vec<String>,
    #[serde(default)]
    pub custom: Vec<String>,
}

/// Overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Window opacity (default: 0.9, range: 0.0-1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Show icons/banners when available (default: true)
    #[serde(default = "default_true")]
    pub show_game_art: bool,
    /// Columns in the selection grid (default: 3)
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,
}

fn default_true() -> bool {
    true
}
fn default_max_games_shown() -> usize {
    10
}
fn default_opacity() -> f32 {
    0.9
}
fn default_grid_columns() -> usize {
    3
}

fn default_custom_exclude() -> Vec<String> {
    ["steam", "lutris", "flatpak", "python", "python3"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_steam_paths() -> Vec<String> {
    vec!["~/.steam".to_string(), "~/.local/share/Steam".to_string()]
}
fn default_flatpak_paths() -> Vec<String> {
    vec![
        "~/.local/share/flatpak".to_string(),
        "/var/lib/flatpak".to_string(),
    ]
}
fn default_lutris_paths() -> Vec<String> {
    vec!["~/.local/share/lutris".to_string()]
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            autostart: default_true(),
            minimize_to_tray: default_true(),
        }
    }
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            max_games_shown: default_max_games_shown(),
            custom_exclude: default_custom_exclude(),
            paths: GamePaths::default(),
            recently_launched: Vec::new(),
        }
    }
}

impl Default for GamePaths {
    fn default() -> Self {
        Self {
            steam: default_steam_paths(),
            flatpak: default_flatpak_paths(),
            lutris: default_lutris_paths(),
            custom: Vec::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            opacity: default_opacity(),
            show_game_art: default_true(),
            grid_columns: default_grid_columns(),
        }
    }
}

impl GamesConfig {
    /// Maximum length of the persisted play history.
    pub fn recent_cap(&self) -> usize {
        self.max_games_shown.saturating_mul(2)
    }
}

impl GamePaths {
    pub fn steam_roots(&self) -> Vec<PathBuf> {
        expand_or_default(&self.steam, default_steam_paths)
    }

    pub fn flatpak_roots(&self) -> Vec<PathBuf> {
        expand_or_default(&self.flatpak, default_flatpak_paths)
    }

    pub fn lutris_roots(&self) -> Vec<PathBuf> {
        expand_or_default(&self.lutris, default_lutris_paths)
    }

    /// Custom roots have no defaults.
    pub fn custom_roots(&self) -> Vec<PathBuf> {
        self.custom.iter().map(|p| expand_home(p)).collect()
    }
}

fn expand_or_default(paths: &[String], defaults: fn() -> Vec<String>) -> Vec<PathBuf> {
    if paths.is_empty() {
        defaults().iter().map(|p| expand_home(p)).collect()
    } else {
        paths.iter().map(|p| expand_home(p)).collect()
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without `~`, and all paths when the home directory is unknown, are
/// returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}

/// Errors from persisting the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/controller-launch`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "controller-launch")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of `config.toml` in the configuration directory.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from the default location.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_path().map(|path| load_from(&path)).unwrap_or_default()
}

/// Loads the configuration from `path`, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
            }
            return Config::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!("Configuration loaded from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("Invalid config {}, using defaults: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Writes `config` to `path`, creating parent directories.
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// The persisted-configuration collaborator used by the library engine.
///
/// Reads go through [`SettingsStore::settings`]; writes mutate
/// [`SettingsStore::settings_mut`] and are made durable by
/// [`SettingsStore::persist`].
pub trait SettingsStore: Send {
    fn settings(&self) -> &Config;
    fn settings_mut(&mut self) -> &mut Config;
    fn persist(&mut self) -> Result<(), ConfigError>;
}

/// Settings backed by a TOML file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    config: Config,
}

impl FileSettings {
    /// Loads `path` (defaults if missing or invalid).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = load_from(&path);
        Self { path, config }
    }

    /// Opens the platform default `config.toml`.
    pub fn open_default() -> Option<Self> {
        config_path().map(Self::open)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn settings(&self) -> &Config {
        &self.config
    }

    fn settings_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn persist(&mut self) -> Result<(), ConfigError> {
        save_to(&self.path, &self.config)?;
        tracing::debug!("Configuration saved to {}", self.path.display());
        Ok(())
    }
}

/// Settings that live only in memory. `persist` only counts calls.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    config: Config,
    persist_count: usize,
}

impl MemorySettings {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            persist_count: 0,
        }
    }

    /// Number of successful `persist` calls.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl SettingsStore for MemorySettings {
    fn settings(&self) -> &Config {
        &self.config
    }

    fn settings_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn persist(&mut self) -> Result<(), ConfigError> {
        self.persist_count += 1;
        Ok(())
    }
}

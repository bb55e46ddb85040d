//! Game records, sources and persisted play history entries

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Discovery provider a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSource {
    Steam,
    Flatpak,
    Lutris,
    Custom,
}

impl GameSource {
    /// All sources, in scan order.
    pub const ALL: [GameSource; 4] = [
        GameSource::Steam,
        GameSource::Flatpak,
        GameSource::Lutris,
        GameSource::Custom,
    ];

    /// Lowercase prefix used in record ids (`steam:440`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            GameSource::Steam => "steam",
            GameSource::Flatpak => "flatpak",
            GameSource::Lutris => "lutris",
            GameSource::Custom => "custom",
        }
    }

    /// Builds a catalog id from a source-local key.
    pub fn record_id(self, key: &str) -> String {
        format!("{}:{}", self.id_prefix(), key)
    }
}

impl fmt::Display for GameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameSource::Steam => "Steam",
            GameSource::Flatpak => "Flatpak",
            GameSource::Lutris => "Lutris",
            GameSource::Custom => "Custom",
        };
        f.write_str(label)
    }
}

/// One discovered game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    /// `"<source>:<source-local key>"`, unique within a catalog
    pub id: String,
    /// Display name, never empty
    pub name: String,
    pub source: GameSource,
    /// URI, provider command line, or absolute executable path
    pub launch_target: String,
    pub install_dir: Option<PathBuf>,
    pub icon_path: Option<PathBuf>,
    /// Unix timestamp of the last launch
    pub last_played: Option<i64>,
    /// Steam app id, Flatpak app id or Lutris slug
    pub source_meta: Option<String>,
}

impl GameRecord {
    /// Creates a record keyed by `key` within `source`.
    ///
    /// A blank name is replaced with a placeholder built from the source and key.
    pub fn new(
        source: GameSource,
        key: &str,
        name: impl Into<String>,
        launch_target: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            placeholder_name(source, key)
        } else {
            name.trim().to_string()
        };

        Self {
            id: source.record_id(key),
            name,
            source,
            launch_target: launch_target.into(),
            install_dir: None,
            icon_path: None,
            last_played: None,
            source_meta: None,
        }
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon_path = icon;
        self
    }

    pub fn with_source_meta(mut self, meta: impl Into<String>) -> Self {
        self.source_meta = Some(meta.into());
        self
    }
}

fn placeholder_name(source: GameSource, key: &str) -> String {
    match source {
        GameSource::Steam => format!("Steam App {}", key),
        _ if key.trim().is_empty() => "Unknown Game".to_string(),
        _ => format!("{} {}", source, key),
    }
}

/// In-memory catalog snapshot, keyed by record id.
pub type Catalog = HashMap<String, GameRecord>;

/// Durable trace of one launch, kept in `games.recently_launched`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub id: String,
    pub name: String,
    pub source: GameSource,
    pub launch_target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<PathBuf>,
}

impl RecentEntry {
    /// Snapshot of `record` played at `played_at`.
    pub fn from_record(record: &GameRecord, played_at: i64) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            source: record.source,
            launch_target: record.launch_target.clone(),
            last_played: Some(played_at),
            icon_path: record.icon_path.clone(),
        }
    }

    /// Rebuilds a record from the persisted subset. Install dir and source key are lost.
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            source: self.source,
            launch_target: self.launch_target.clone(),
            install_dir: None,
            icon_path: self.icon_path.clone(),
            last_played: self.last_played,
            source_meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_uses_source_prefix() {
        let record = GameRecord::new(GameSource::Lutris, "celeste", "Celeste", "lutris lutris:celeste");
        assert_eq!(record.id, "lutris:celeste");
        assert_eq!(record.name, "Celeste");
        assert!(record.last_played.is_none());
    }

    #[test]
    fn test_blank_name_gets_placeholder() {
        let steam = GameRecord::new(GameSource::Steam, "440", "   ", "steam://rungameid/440");
        assert_eq!(steam.name, "Steam App 440");

        let custom = GameRecord::new(GameSource::Custom, "", "", "/opt/game/run");
        assert_eq!(custom.name, "Unknown Game");
    }

    #[test]
    fn test_recent_entry_keeps_play_time() {
        let record = GameRecord::new(GameSource::Custom, "/opt/doom/doom", "doom", "/opt/doom/doom")
            .with_install_dir("/opt/doom");
        let entry = RecentEntry::from_record(&record, 1_700_000_000);
        assert_eq!(entry.last_played, Some(1_700_000_000));

        let back = entry.to_record();
        assert_eq!(back.id, record.id);
        assert_eq!(back.last_played, Some(1_700_000_000));
        assert!(back.install_dir.is_none());
    }

    #[test]
    fn test_recent_entry_toml_omits_missing_icon() {
        let entry = RecentEntry {
            id: "steam:10".to_string(),
            name: "Counter-Strike".to_string(),
            source: GameSource::Steam,
            launch_target: "steam://rungameid/10".to_string(),
            last_played: Some(5),
            icon_path: None,
        };
        let text = toml::to_string(&entry).unwrap();
        assert!(text.contains("source = \"Steam\""));
        assert!(!text.contains("icon_path"));
    }
}

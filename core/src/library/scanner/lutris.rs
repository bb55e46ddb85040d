//! Lutris game discovery

use std::fs;
use std::path::Path;

use crate::app::config::GamesConfig;
use crate::library::manifest::parse_lutris_game;
use crate::library::{GameRecord, GameSource, LibraryError};

use super::SourceScanner;

/// Reads the per-game configs under `<root>/games`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LutrisScanner;

impl SourceScanner for LutrisScanner {
    fn source(&self) -> GameSource {
        GameSource::Lutris
    }

    fn scan(&self, games: &GamesConfig) -> Vec<GameRecord> {
        let mut records = Vec::new();

        for root in games.paths.lutris_roots() {
            let games_dir = root.join("games");
            let entries = match fs::read_dir(&games_dir) {
                Ok(entries) => entries,
                Err(_) => {
                    tracing::debug!("No Lutris games directory at {}", games_dir.display());
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if !is_game_config(&path) {
                    continue;
                }
                match read_game(&root, &path) {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {
                        tracing::debug!("Lutris config {} has no name or slug", path.display())
                    }
                    Err(e) => tracing::warn!("Skipping Lutris config: {}", e),
                }
            }
        }

        tracing::info!("Found {} Lutris games", records.len());
        records
    }
}

fn is_game_config(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml")
}

fn read_game(root: &Path, path: &Path) -> Result<Option<GameRecord>, LibraryError> {
    let text = fs::read_to_string(path).map_err(|e| LibraryError::parse(path, e.to_string()))?;
    let Some(game) = parse_lutris_game(&text) else {
        return Ok(None);
    };

    let banner = root.join("banners").join(format!("{}.jpg", game.slug));
    let record = GameRecord::new(
        GameSource::Lutris,
        &game.slug,
        game.name,
        format!("lutris lutris:{}", game.slug),
    )
    .with_icon(banner.is_file().then_some(banner))
    .with_source_meta(game.slug);

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn games_for(root: &Path) -> GamesConfig {
        let mut games = GamesConfig::default();
        games.paths.lutris = vec![root.display().to_string()];
        games
    }

    #[test]
    fn test_scan_configs_and_banner() {
        let temp_dir = TempDir::new().unwrap();
        let games_dir = temp_dir.path().join("games");
        let banners = temp_dir.path().join("banners");
        fs::create_dir_all(&games_dir).unwrap();
        fs::create_dir_all(&banners).unwrap();

        fs::write(
            games_dir.join("celeste-1700000000.yml"),
            "game:\n  exe: /opt/celeste/Celeste\nname: Celeste\nslug: celeste\n",
        )
        .unwrap();
        fs::write(banners.join("celeste.jpg"), b"jpg").unwrap();
        fs::write(
            games_dir.join("quake.yaml"),
            "name: Quake\nslug: quake\n",
        )
        .unwrap();

        let mut records = LutrisScanner.scan(&games_for(temp_dir.path()));
        records.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "lutris:celeste");
        assert_eq!(records[0].launch_target, "lutris lutris:celeste");
        assert_eq!(records[0].icon_path, Some(banners.join("celeste.jpg")));
        assert_eq!(records[1].name, "Quake");
        assert!(records[1].icon_path.is_none());
    }

    #[test]
    fn test_scan_skips_incomplete_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let games_dir = temp_dir.path().join("games");
        fs::create_dir_all(&games_dir).unwrap();
        fs::write(games_dir.join("broken.yml"), "name: Broken\n").unwrap();
        fs::write(games_dir.join("notes.txt"), "name: Notes\nslug: notes\n").unwrap();

        assert!(LutrisScanner.scan(&games_for(temp_dir.path())).is_empty());
    }

    #[test]
    fn test_missing_games_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(LutrisScanner.scan(&games_for(temp_dir.path())).is_empty());
    }
}

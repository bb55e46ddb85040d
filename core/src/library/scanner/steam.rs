//! Steam library discovery

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::config::GamesConfig;
use crate::library::manifest::{parse_steam_app_manifest, parse_steam_library_folders};
use crate::library::{GameRecord, GameSource, LibraryError};

use super::{SourceScanner, first_existing};

/// Icon candidates inside an install directory, in lookup order.
const ICON_CANDIDATES: &[&str] = &["logo.png", "header.jpg", "icon.png", "steam_icon.png"];

/// Scans `steamapps` directories under every configured Steam root.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteamScanner;

impl SourceScanner for SteamScanner {
    fn source(&self) -> GameSource {
        GameSource::Steam
    }

    fn scan(&self, games: &GamesConfig) -> Vec<GameRecord> {
        let mut records = Vec::new();

        for root in games.paths.steam_roots() {
            if !root.is_dir() {
                tracing::debug!("Steam root {} does not exist", root.display());
                continue;
            }
            for steamapps in library_dirs(&root) {
                scan_library(&steamapps, &mut records);
            }
        }

        // The same library can be reachable from several roots.
        let mut seen = hashbrown::HashSet::new();
        records.retain(|record| seen.insert(record.id.clone()));

        tracing::info!("Found {} Steam games", records.len());
        records
    }
}

/// Every `steamapps` directory reachable from `root`, deduplicated.
fn library_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for vdf in [
        root.join("steamapps").join("libraryfolders.vdf"),
        root.join("steam").join("steamapps").join("libraryfolders.vdf"),
    ] {
        let Ok(text) = fs::read_to_string(&vdf) else {
            continue;
        };
        for path in parse_steam_library_folders(&text) {
            dirs.push(PathBuf::from(path).join("steamapps"));
        }
    }
    dirs.push(root.join("steamapps"));

    let mut unique = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if dir.is_dir() && !unique.contains(&dir) {
            unique.push(dir);
        }
    }
    unique
}

fn scan_library(steamapps: &Path, records: &mut Vec<GameRecord>) {
    let entries = match fs::read_dir(steamapps) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", steamapps.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(app_id) = manifest_app_id(&path) else {
            continue;
        };

        match read_app(steamapps, &path, app_id) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping Steam app {}: {}", app_id, e),
        }
    }
}

/// `appmanifest_<id>.acf` -> `<id>`.
fn manifest_app_id(path: &Path) -> Option<&str> {
    let file_name = path.file_name()?.to_str()?;
    let app_id = file_name
        .strip_prefix("appmanifest_")?
        .strip_suffix(".acf")?;
    (!app_id.is_empty()).then_some(app_id)
}

/// Builds the record for one manifest.
///
/// `Ok(None)` means the app is listed but not installed on disk.
fn read_app(
    steamapps: &Path,
    manifest_path: &Path,
    app_id: &str,
) -> Result<Option<GameRecord>, LibraryError> {
    let text = fs::read_to_string(manifest_path)
        .map_err(|e| LibraryError::parse(manifest_path, e.to_string()))?;
    let manifest = parse_steam_app_manifest(&text)
        .ok_or_else(|| LibraryError::parse(manifest_path, "missing name or installdir"))?;

    let install_dir = steamapps.join("common").join(&manifest.install_dir);
    if !install_dir.is_dir() {
        tracing::debug!(
            "Steam app {} has no install directory at {}",
            app_id,
            install_dir.display()
        );
        return Ok(None);
    }

    let icon = first_existing(&install_dir, ICON_CANDIDATES);
    let record = GameRecord::new(
        GameSource::Steam,
        app_id,
        manifest.name,
        format!("steam://rungameid/{}", app_id),
    )
    .with_icon(icon)
    .with_install_dir(install_dir)
    .with_source_meta(app_id);

    Ok(Some(record))
}

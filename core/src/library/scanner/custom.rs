//! Executable discovery under user-chosen directories

use std::path::Path;

use walkdir::WalkDir;

use crate::app::config::GamesConfig;
use crate::library::{GameRecord, GameSource};

use super::{SourceScanner, first_existing};

/// A single root stops walking once it holds more than this many candidates.
pub const CUSTOM_SCAN_CAP: usize = 100;

/// Icon candidates next to the executable, in lookup order.
const ICON_CANDIDATES: &[&str] = &["icon.png", "icon.jpg", "logo.png", "logo.jpg"];

/// Walks `games.paths.custom` for executable files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomScanner;

impl SourceScanner for CustomScanner {
    fn source(&self) -> GameSource {
        GameSource::Custom
    }

    fn scan(&self, games: &GamesConfig) -> Vec<GameRecord> {
        let mut records = Vec::new();

        for root in games.paths.custom_roots() {
            if !root.is_dir() {
                tracing::debug!("Custom root {} does not exist", root.display());
                continue;
            }
            records.extend(scan_root(&root, &games.custom_exclude));
        }

        tracing::info!("Found {} custom games", records.len());
        records
    }
}

fn scan_root(root: &Path, exclude: &[String]) -> Vec<GameRecord> {
    let mut records = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        // Symlinked launchers count; the walk itself does not follow links.
        if !entry.path().is_file() || !is_executable(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if exclude.iter().any(|name| name.as_str() == file_name.as_ref()) {
            continue;
        }

        records.push(record_for(entry.path()));
        if records.len() > CUSTOM_SCAN_CAP {
            tracing::warn!(
                "Stopped scanning {} after {} executables",
                root.display(),
                records.len()
            );
            break;
        }
    }

    records
}

fn record_for(path: &Path) -> GameRecord {
    let key = path.to_string_lossy();
    let dir = path.parent();
    let name = dir
        .and_then(|d| d.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut record = GameRecord::new(GameSource::Custom, &key, name, key.to_string());
    if let Some(dir) = dir {
        record = record
            .with_icon(first_existing(dir, ICON_CANDIDATES))
            .with_install_dir(dir);
    }
    record
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}

//! Flatpak application discovery
//!
//! Applications come from `flatpak list`. An app counts as a game when its id
//! matches one of the known patterns or its exported desktop entry carries a
//! game category.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::app::config::GamesConfig;
use crate::library::manifest::{FlatpakApp, is_game_desktop_entry, parse_flatpak_list};
use crate::library::{GameRecord, GameSource, LibraryError};

use super::SourceScanner;

/// Case-insensitive substrings that mark an app id as a game.
const GAME_ID_SUBSTRINGS: &[&str] = &["game", "play", "steam", "itch"];

/// Publisher prefixes of known game stores and launchers.
const GAME_ID_PREFIXES: &[&str] = &["com.valvesoftware", "io.itch", "net.lutris"];

const SYSTEM_ICON_THEME: &str = "/usr/share/icons/hicolor";

const FLATPAK_BINARY: &str = "flatpak";

/// Where the installed-app listing comes from.
#[derive(Debug, Clone)]
enum Listing {
    /// Run `<binary> list` if the binary is on `PATH`
    Binary(String),
    /// Fixed `flatpak list` output
    Fixed(String),
}

/// Scans installed Flatpak applications.
#[derive(Debug, Clone)]
pub struct FlatpakScanner {
    listing: Listing,
}

impl Default for FlatpakScanner {
    fn default() -> Self {
        Self::with_binary(FLATPAK_BINARY)
    }
}

impl FlatpakScanner {
    /// Lists apps with `binary` instead of `flatpak`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            listing: Listing::Binary(binary.into()),
        }
    }

    /// Uses `output` instead of invoking the `flatpak` binary.
    pub fn with_listing(output: impl Into<String>) -> Self {
        Self {
            listing: Listing::Fixed(output.into()),
        }
    }

    fn installed_apps(&self) -> Result<Vec<FlatpakApp>, LibraryError> {
        let output = match &self.listing {
            Listing::Fixed(output) => output.clone(),
            Listing::Binary(binary) => {
                let binary = which::which(binary)
                    .map_err(|_| LibraryError::ProviderUnavailable(GameSource::Flatpak))?;
                let output = Command::new(binary)
                    .args(["list", "--app", "--columns=application,name"])
                    .output()
                    .map_err(|_| LibraryError::ProviderUnavailable(GameSource::Flatpak))?;
                if !output.status.success() {
                    tracing::warn!("flatpak list exited with {}", output.status);
                    return Ok(Vec::new());
                }
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
        };
        Ok(parse_flatpak_list(&output))
    }
}

impl SourceScanner for FlatpakScanner {
    fn source(&self) -> GameSource {
        GameSource::Flatpak
    }

    fn scan(&self, games: &GamesConfig) -> Vec<GameRecord> {
        let apps = match self.installed_apps() {
            Ok(apps) => apps,
            Err(e) => {
                tracing::debug!("Skipping Flatpak scan: {}", e);
                return Vec::new();
            }
        };

        let export_roots = export_roots(&games.paths.flatpak_roots());
        let records: Vec<GameRecord> = apps
            .into_iter()
            .filter(|app| is_game(&app.app_id, &export_roots))
            .map(|app| {
                let icon = find_icon(&app.app_id, &export_roots);
                GameRecord::new(
                    GameSource::Flatpak,
                    &app.app_id,
                    app.name,
                    format!("flatpak run {}", app.app_id),
                )
                .with_icon(icon)
                .with_source_meta(app.app_id)
            })
            .collect();

        tracing::info!("Found {} Flatpak games", records.len());
        records
    }
}

/// `<installation>/exports/share` for every configured Flatpak path.
///
/// A path pointing at the `app` directory of an installation is accepted too.
fn export_roots(flatpak_roots: &[PathBuf]) -> Vec<PathBuf> {
    flatpak_roots
        .iter()
        .map(|root| {
            let installation = if root.ends_with("app") {
                root.parent().unwrap_or(root.as_path())
            } else {
                root.as_path()
            };
            installation.join("exports").join("share")
        })
        .collect()
}

fn is_game(app_id: &str, export_roots: &[PathBuf]) -> bool {
    id_looks_like_game(app_id) || has_game_desktop_entry(app_id, export_roots)
}

fn id_looks_like_game(app_id: &str) -> bool {
    let id = app_id.to_ascii_lowercase();
    GAME_ID_SUBSTRINGS.iter().any(|s| id.contains(s))
        || id.ends_with(".game")
        || GAME_ID_PREFIXES.iter().any(|p| id.starts_with(p))
}

fn has_game_desktop_entry(app_id: &str, export_roots: &[PathBuf]) -> bool {
    export_roots.iter().any(|share| {
        let entry = share
            .join("applications")
            .join(format!("{}.desktop", app_id));
        fs::read_to_string(entry)
            .map(|text| is_game_desktop_entry(&text))
            .unwrap_or(false)
    })
}

/// Exported icons first, then the system hicolor theme keyed by the last id segment.
fn find_icon(app_id: &str, export_roots: &[PathBuf]) -> Option<PathBuf> {
    let exported = export_roots.iter().flat_map(|share| {
        let theme = share.join("icons").join("hicolor");
        [
            theme.join("128x128/apps").join(format!("{}.png", app_id)),
            theme.join("scalable/apps").join(format!("{}.svg", app_id)),
        ]
    });

    let system = app_id
        .rsplit_once('.')
        .map(|(_, short)| {
            let theme = Path::new(SYSTEM_ICON_THEME);
            vec![
                theme.join("128x128/apps").join(format!("{}.png", short)),
                theme.join("scalable/apps").join(format!("{}.svg", short)),
            ]
        })
        .unwrap_or_default();

    exported
        .chain(system)
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn games_for(installation: &Path) -> GamesConfig {
        let mut games = GamesConfig::default();
        games.paths.flatpak = vec![installation.display().to_string()];
        games
    }

    #[test]
    fn test_id_patterns() {
        assert!(id_looks_like_game("com.valvesoftware.Steam"));
        assert!(id_looks_like_game("io.itch.itch"));
        assert!(id_looks_like_game("net.lutris.Lutris"));
        assert!(id_looks_like_game("org.supertuxproject.SuperTux.Game"));
        assert!(id_looks_like_game("com.example.PlayBox"));
        assert!(!id_looks_like_game("org.gnome.Calculator"));
    }

    #[test]
    fn test_scan_classifies_by_id_and_desktop_entry() {
        let temp_dir = TempDir::new().unwrap();
        let share = temp_dir.path().join("exports").join("share");
        let applications = share.join("applications");
        fs::create_dir_all(&applications).unwrap();
        fs::write(
            applications.join("net.veloren.airshipper.desktop"),
            "[Desktop Entry]\nName=Airshipper\nCategories=Game;RolePlaying;\n",
        )
        .unwrap();
        fs::write(
            applications.join("org.gnome.Calculator.desktop"),
            "[Desktop Entry]\nName=Calculator\nCategories=Utility;\n",
        )
        .unwrap();

        let listing = "com.valvesoftware.Steam\tSteam\nnet.veloren.airshipper\tAirshipper\norg.gnome.Calculator\tCalculator\n";
        let scanner = FlatpakScanner::with_listing(listing);
        let mut records = scanner.scan(&games_for(temp_dir.path()));
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["flatpak:com.valvesoftware.Steam", "flatpak:net.veloren.airshipper"]);
        assert_eq!(records[0].launch_target, "flatpak run com.valvesoftware.Steam");
        assert_eq!(records[1].source_meta.as_deref(), Some("net.veloren.airshipper"));
    }

    #[test]
    fn test_exported_icon_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let apps = temp_dir
            .path()
            .join("exports/share/icons/hicolor/scalable/apps");
        fs::create_dir_all(&apps).unwrap();
        fs::write(apps.join("io.itch.itch.svg"), b"<svg/>").unwrap();

        let scanner = FlatpakScanner::with_listing("io.itch.itch\titch\n");
        let records = scanner.scan(&games_for(temp_dir.path()));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].icon_path, Some(apps.join("io.itch.itch.svg")));
    }

    #[test]
    fn test_export_roots_accepts_app_dir() {
        let roots = export_roots(&[PathBuf::from("/var/lib/flatpak/app")]);
        assert_eq!(roots, vec![PathBuf::from("/var/lib/flatpak/exports/share")]);
    }

    #[test]
    fn test_missing_binary_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FlatpakScanner::with_binary("controller-launch-no-such-flatpak");
        assert!(matches!(
            scanner.installed_apps(),
            Err(LibraryError::ProviderUnavailable(GameSource::Flatpak))
        ));
        assert!(scanner.scan(&games_for(temp_dir.path())).is_empty());
    }

    #[test]
    fn test_empty_listing() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FlatpakScanner::with_listing("");
        assert!(scanner.scan(&games_for(temp_dir.path())).is_empty());
    }
}

//! Per-source game discovery
//!
//! Each scanner turns one provider's on-disk (or CLI) state into a list of
//! candidate [`GameRecord`]s. Scanners never fail as a whole: a broken item is
//! logged and skipped, and a missing provider simply contributes nothing.

mod custom;
mod flatpak;
mod lutris;
mod steam;

use std::path::{Path, PathBuf};

use crate::app::config::GamesConfig;

use super::{GameRecord, GameSource};

pub use custom::{CUSTOM_SCAN_CAP, CustomScanner};
pub use flatpak::FlatpakScanner;
pub use lutris::LutrisScanner;
pub use steam::SteamScanner;

/// A discovery provider.
pub trait SourceScanner: Send {
    /// The source every returned record belongs to.
    fn source(&self) -> GameSource;

    /// Discovers games using the configured paths. Never panics on bad input.
    fn scan(&self, games: &GamesConfig) -> Vec<GameRecord>;
}

/// The four built-in scanners in scan order.
pub fn default_scanners() -> Vec<Box<dyn SourceScanner>> {
    vec![
        Box::new(SteamScanner),
        Box::new(FlatpakScanner::default()),
        Box::new(LutrisScanner),
        Box::new(CustomScanner),
    ]
}

/// Returns the first `dir/<name>` that exists, in candidate order.
pub(crate) fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

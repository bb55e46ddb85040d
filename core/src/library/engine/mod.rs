//! Library engine
//!
//! Owns the catalog, runs the scanners, tracks play history through the
//! settings store and dispatches launches. Mutating calls take `&mut self`;
//! callers that share an engine across threads put it behind a mutex.


use std::path::Path;

use hashbrown::HashSet;

use crate::app::config::SettingsStore;

use super::scanner::{SourceScanner, default_scanners};
use super::{
    Catalog, Clock, GameRecord, LaunchCommand, LibraryError, ProcessLauncher, RecentEntry,
    SystemClock, SystemLauncher,
};

/// Minimum seconds between two unforced rescans.
pub const RESCAN_INTERVAL_SECS: i64 = 300;

pub struct LibraryEngine {
    settings: Box<dyn SettingsStore>,
    scanners: Vec<Box<dyn SourceScanner>>,
    launcher: Box<dyn ProcessLauncher>,
    clock: Box<dyn Clock>,
    catalog: Catalog,
    last_rescan: Option<i64>,
    rescan_interval: i64,
}

impl LibraryEngine {
    /// Creates an engine with the built-in scanners, the OS launcher and the
    /// system clock. No scan happens until the first query or [`Self::rescan`].
    pub fn new(settings: Box<dyn SettingsStore>) -> Self {
        Self {
            settings,
            scanners: default_scanners(),
            launcher: Box::new(SystemLauncher),
            clock: Box::new(SystemClock),
            catalog: Catalog::new(),
            last_rescan: None,
            rescan_interval: RESCAN_INTERVAL_SECS,
        }
    }

    pub fn with_scanners(mut self, scanners: Vec<Box<dyn SourceScanner>>) -> Self {
        self.scanners = scanners;
        self
    }

    pub fn with_launcher(mut self, launcher: Box<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rescan_interval(mut self, seconds: i64) -> Self {
        self.rescan_interval = seconds;
        self
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.settings.as_mut()
    }

    /// Current catalog snapshot, without rescanning.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rebuilds the catalog from every scanner.
    ///
    /// Unless `force` is set, does nothing if the last rescan finished less
    /// than the rescan interval ago. `last_played` carries over for ids present
    /// in both the old and new catalog. Returns whether a scan ran.
    pub fn rescan(&mut self, force: bool) -> bool {
        let now = self.clock.now();
        if !force
            && let Some(last) = self.last_rescan
            && now.saturating_sub(last) < self.rescan_interval
        {
            tracing::trace!("Skipping rescan, last one {}s ago", now - last);
            return false;
        }

        let games = &self.settings.settings().games;
        let mut catalog = Catalog::new();
        for scanner in &self.scanners {
            for mut record in scanner.scan(games) {
                if let Some(previous) = self.catalog.get(&record.id) {
                    record.last_played = previous.last_played;
                }
                if catalog.insert(record.id.clone(), record).is_some() {
                    tracing::debug!("Duplicate {} record replaced", scanner.source());
                }
            }
        }

        tracing::info!("Library rescan complete: {} games", catalog.len());
        self.catalog = catalog;
        self.last_rescan = Some(now);
        true
    }

    /// All catalog records after a (possibly skipped) rescan. Order is unspecified.
    pub fn get_all(&mut self) -> Vec<GameRecord> {
        self.rescan(false);
        self.catalog.values().cloned().collect()
    }

    /// Presentation list: play history first, then the rest of the catalog by name.
    ///
    /// History entries still in the catalog yield the current record with the
    /// persisted play time. Entries gone from the catalog are kept only while
    /// their launch target is an existing path. At most `max_count` records are
    /// returned and no id appears twice.
    pub fn get_recent(&self, max_count: usize) -> Vec<GameRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut result = Vec::with_capacity(max_count);

        for entry in &self.settings.settings().games.recently_launched {
            if result.len() >= max_count {
                break;
            }
            if !seen.insert(entry.id.as_str()) {
                continue;
            }
            if let Some(record) = self.catalog.get(&entry.id) {
                let mut record = record.clone();
                record.last_played = entry.last_played;
                result.push(record);
            } else if Path::new(&entry.launch_target).exists() {
                result.push(entry.to_record());
            } else {
                tracing::trace!("Dropping stale history entry {}", entry.id);
            }
        }

        if result.len() < max_count {
            let mut rest: Vec<&GameRecord> = self
                .catalog
                .values()
                .filter(|record| !seen.contains(record.id.as_str()))
                .collect();
            rest.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
            result.extend(
                rest.into_iter()
                    .take(max_count - result.len())
                    .cloned(),
            );
        }

        result.truncate(max_count);
        result
    }

    /// Launches `id`, using `record` when given and the catalog otherwise.
    ///
    /// On success the play time is stamped on the catalog record and the id
    /// moves to the front of the persisted history.
    pub fn launch(&mut self, id: &str, record: Option<&GameRecord>) -> Result<(), LibraryError> {
        let record = match record {
            Some(record) => record.clone(),
            None => self
                .catalog
                .get(id)
                .cloned()
                .ok_or_else(|| LibraryError::NotFound(id.to_string()))?,
        };

        let command = LaunchCommand::for_record(&record)?;
        self.launcher
            .launch(&command)
            .map_err(|cause| LibraryError::LaunchFailure {
                id: id.to_string(),
                cause,
            })?;
        tracing::info!("Launched {} ({})", record.name, id);

        let now = self.clock.now();
        if let Some(entry) = self.catalog.get_mut(id) {
            entry.last_played = Some(now);
        }

        let mut entry = RecentEntry::from_record(&record, now);
        entry.id = id.to_string();

        let games = &mut self.settings.settings_mut().games;
        let cap = games.recent_cap();
        games.recently_launched.retain(|e| e.id != id);
        games.recently_launched.insert(0, entry);
        games.recently_launched.truncate(cap);

        self.persist();
        Ok(())
    }

    /// Removes `id` from the catalog and the play history.
    ///
    /// Returns whether anything was removed. Nothing is persisted when the
    /// history did not change.
    pub fn remove(&mut self, id: &str) -> bool {
        let catalog_removed = self.catalog.remove(id).is_some();

        let recent = &mut self.settings.settings_mut().games.recently_launched;
        let before = recent.len();
        recent.retain(|e| e.id != id);
        let recent_removed = recent.len() != before;

        if recent_removed {
            self.persist();
        }
        if catalog_removed || recent_removed {
            tracing::info!("Removed {} from library", id);
        }
        catalog_removed || recent_removed
    }

    fn persist(&mut self) {
        if let Err(e) = self.settings.persist() {
            tracing::warn!("Failed to save play history: {}", e);
        }
    }
}

//! Shared test utilities for unit tests and downstream crates
//!
//! In-memory stand-ins for the engine's collaborators. Each one is cheaply
//! cloneable and shares its state, so a test keeps a handle after boxing a
//! clone into the engine.

use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::app::config::GamesConfig;
use crate::library::{Clock, GameRecord, GameSource, LaunchCommand, ProcessLauncher, SourceScanner};

// ============================================================================
// Scanner
// ============================================================================

/// Scanner returning whatever records were last stored in it.
#[derive(Debug, Clone)]
pub struct StubScanner {
    source: GameSource,
    records: Arc<Mutex<Vec<GameRecord>>>,
    scans: Arc<AtomicI64>,
}

impl StubScanner {
    pub fn new(source: GameSource, records: Vec<GameRecord>) -> Self {
        Self {
            source,
            records: Arc::new(Mutex::new(records)),
            scans: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Replaces the records returned by the next scan.
    pub fn set_records(&self, records: Vec<GameRecord>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }

    /// Number of times `scan` ran.
    pub fn scan_count(&self) -> i64 {
        self.scans.load(Ordering::SeqCst)
    }
}

impl SourceScanner for StubScanner {
    fn source(&self) -> GameSource {
        self.source
    }

    fn scan(&self, _games: &GamesConfig) -> Vec<GameRecord> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Launcher
// ============================================================================

/// Launcher that records commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    launched: Arc<Mutex<Vec<LaunchCommand>>>,
    fail_with: Arc<Mutex<Option<io::ErrorKind>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later launch fail with `kind` (`None` to succeed again).
    pub fn fail_with(&self, kind: Option<io::ErrorKind>) {
        *self.fail_with.lock().unwrap_or_else(PoisonError::into_inner) = kind;
    }

    /// Commands launched so far, oldest first.
    pub fn launched(&self) -> Vec<LaunchCommand> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&mut self, command: &LaunchCommand) -> io::Result<()> {
        if let Some(kind) = *self.fail_with.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(io::Error::new(kind, "launch refused by test launcher"));
        }
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        Ok(())
    }
}

// ============================================================================
// Records
// ============================================================================

/// A Steam record for app `app_id`.
pub fn steam_game(app_id: &str, name: &str) -> GameRecord {
    GameRecord::new(
        GameSource::Steam,
        app_id,
        name,
        format!("steam://rungameid/{}", app_id),
    )
    .with_source_meta(app_id)
}

/// A custom record launching `path`.
pub fn custom_game(path: &str, name: &str) -> GameRecord {
    GameRecord::new(GameSource::Custom, path, name, path)
}

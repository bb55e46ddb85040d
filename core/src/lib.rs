//! Controller Launch Core - game library and controller input
//!
//! This crate discovers installed games, keeps a recency-ranked catalog and
//! turns raw controller events into overlay navigation.
//!
//! # Architecture
//!
//! - [`LibraryEngine`] - Scanners, catalog merge, play history and launching
//! - [`SourceScanner`] - One discovery provider (Steam, Flatpak, Lutris, custom)
//! - [`InputInterpreter`] - Button edges, long presses and stick/d-pad moves
//! - [`SelectionGrid`] - Wrap-around cursor over the displayed games

pub mod app;
pub mod library;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use app::config::{Config, ConfigError, FileSettings, MemorySettings, SettingsStore};
pub use app::grid::{Direction, SelectionGrid};
pub use app::input::{Action, InputInterpreter, InterpreterConfig, RawEvent};
pub use library::{
    GameRecord, GameSource, LibraryEngine, LibraryError, RecentEntry, SourceScanner,
};

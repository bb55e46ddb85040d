//! Game library management
//!
//! Discovery across Steam, Flatpak, Lutris and custom directories, the
//! merged catalog with play history, and source-aware launching.

mod clock;
mod engine;
mod error;
mod launch;
pub mod manifest;
mod record;
mod resolver;
pub mod scanner;

pub use clock::{Clock, SystemClock};
pub use engine::{LibraryEngine, RESCAN_INTERVAL_SECS};
pub use error::LibraryError;
pub use launch::{LaunchCommand, ProcessLauncher, SystemLauncher};
pub use record::{Catalog, GameRecord, GameSource, RecentEntry};
pub use resolver::{ResolutionError, resolve_game};
pub use scanner::{SourceScanner, default_scanners};

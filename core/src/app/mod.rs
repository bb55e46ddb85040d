//! Application-level types shared by every front end
//!
//! Settings persistence, controller input and the selection grid the
//! overlay navigates.

pub mod config;
pub mod grid;
pub mod input;

pub use config::{Config, ConfigError, FileSettings, MemorySettings, SettingsStore};
pub use grid::{Direction, SelectionGrid};
pub use input::{Action, ControllerConfig, InputInterpreter, InterpreterConfig, RawEvent};

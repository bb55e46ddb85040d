//! Overlay session state
//!
//! The overlay shows the recent/available games in a grid and reacts to
//! controller actions:
//! - Guide long press shows or hides it (reloading the list on show)
//! - Moves drive the selection cursor
//! - Confirm launches the selected game, Cancel hides
//!
//! Rendering is left to the caller. Every handled action returns an
//! [`OverlayEvent`] describing what changed.


use controller_launch_core::app::grid::SelectionGrid;
use controller_launch_core::app::input::Action;
use controller_launch_core::library::{GameRecord, LibraryEngine, LibraryError};

/// What the presentation layer should reflect after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Shown,
    Hidden,
    /// Cursor moved to this game index
    SelectionChanged(usize),
    Launched { id: String, name: String },
    /// The launch failed; offering removal of `id` is appropriate
    LaunchFailed {
        id: String,
        name: String,
        message: String,
    },
    ControllersChanged,
}

/// Overlay application state
pub struct Overlay {
    engine: LibraryEngine,
    grid: SelectionGrid,
    games: Vec<GameRecord>,
    visible: bool,
    /// Last launch error (for displaying in UI)
    last_error: Option<String>,
}

impl Overlay {
    /// Creates a hidden overlay. Columns come from `ui.grid_columns`.
    pub fn new(engine: LibraryEngine) -> Self {
        let columns = engine.settings().settings().ui.grid_columns;
        Self {
            engine,
            grid: SelectionGrid::new(columns, 0),
            games: Vec::new(),
            visible: false,
            last_error: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn grid(&self) -> &SelectionGrid {
        &self.grid
    }

    pub fn engine(&self) -> &LibraryEngine {
        &self.engine
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The highlighted game, if any.
    pub fn selected(&mut self) -> Option<&GameRecord> {
        let index = self.grid.index()?;
        self.games.get(index)
    }

    /// Refreshes the displayed list from the engine.
    pub fn reload(&mut self) {
        self.engine.rescan(false);
        let max = self.engine.settings().settings().games.max_games_shown;
        self.games = self.engine.get_recent(max);
        self.grid.set_item_count(self.games.len());
        tracing::debug!("Overlay showing {} games", self.games.len());
    }

    pub fn show(&mut self) {
        self.reload();
        self.grid.reset();
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Applies one controller action.
    ///
    /// Navigation and activation are ignored while hidden.
    pub fn handle_action(&mut self, action: Action) -> Option<OverlayEvent> {
        match action {
            Action::OverlayToggle => {
                if self.visible {
                    self.hide();
                    Some(OverlayEvent::Hidden)
                } else {
                    self.show();
                    Some(OverlayEvent::Shown)
                }
            }
            Action::ControllerListChanged => Some(OverlayEvent::ControllersChanged),
            _ if !self.visible => None,
            Action::Move(direction) => {
                self.grid.navigate(direction);
                self.grid.index().map(OverlayEvent::SelectionChanged)
            }
            Action::Cancel => {
                self.hide();
                Some(OverlayEvent::Hidden)
            }
            Action::Confirm => self.launch_selected(),
        }
    }

    fn launch_selected(&mut self) -> Option<OverlayEvent> {
        let record = self.selected()?.clone();

        match self.engine.launch(&record.id, Some(&record)) {
            Ok(()) => {
                self.last_error = None;
                self.hide();
                Some(OverlayEvent::Launched {
                    id: record.id,
                    name: record.name,
                })
            }
            Err(e) => {
                tracing::error!("Failed to launch {}: {}", record.id, e);
                let message = match &e {
                    LibraryError::LaunchFailure { cause, .. } => cause.to_string(),
                    other => other.to_string(),
                };
                self.last_error = Some(format!("Failed to launch {}: {}", record.name, message));
                Some(OverlayEvent::LaunchFailed {
                    id: record.id,
                    name: record.name,
                    message,
                })
            }
        }
    }

    /// Removes a game (e.g. after a failed launch) and refreshes the list.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.engine.remove(id);
        if removed {
            self.reload();
        }
        removed
    }
}

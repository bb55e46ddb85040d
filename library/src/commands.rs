//! Command line subcommands
//!
//! Each function runs one subcommand against an engine and writes
//! its output to stdout (errors and hints go to stderr).

use anyhow::{Context, Result, bail};
use clap::Args;

use controller_launch_core::library::{
    GameRecord, GameSource, LibraryEngine, LibraryError, resolve_game,
};

#[cfg(feature = "gamepad")]
use crate::app::{Overlay, OverlayEvent};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Number of games (default: games.max_games_shown)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Game id, name, or unique prefix of either
    pub query: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Exact game id (e.g. `steam:620`)
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One table row: `id  name  [source]`.
pub fn format_game_line(game: &GameRecord) -> String {
    format!("{:<40} {} [{}]", game.id, game.name, game.source)
}

fn print_games(games: &[GameRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(games)?);
    } else if games.is_empty() {
        eprintln!("No games found. Configure scan paths in config.toml under [games.paths].");
    } else {
        for game in games {
            println!("{}", format_game_line(game));
        }
    }
    Ok(())
}

/// `list`: every catalog game, by name.
pub fn list(engine: &mut LibraryEngine, args: ListArgs) -> Result<()> {
    let mut games = engine.get_all();
    games.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    print_games(&games, args.json)
}

/// `recent`: the overlay's list.
pub fn recent(engine: &mut LibraryEngine, args: RecentArgs) -> Result<()> {
    engine.rescan(false);
    let count = args
        .count
        .unwrap_or(engine.settings().settings().games.max_games_shown);
    let games = engine.get_recent(count);
    print_games(&games, args.json)
}

/// Catalog plus history entries that are still launchable.
fn launchable_games(engine: &mut LibraryEngine) -> Vec<GameRecord> {
    let mut games = engine.get_all();
    let cap = engine.settings().settings().games.recent_cap();
    for record in engine.get_recent(cap) {
        if !games.iter().any(|g| g.id == record.id) {
            games.push(record);
        }
    }
    games.sort_by(|a, b| a.id.cmp(&b.id));
    games
}

/// `launch <query>`
pub fn launch(engine: &mut LibraryEngine, args: LaunchArgs) -> Result<()> {
    let games = launchable_games(engine);
    if games.is_empty() {
        bail!("No games found. Configure scan paths in config.toml under [games.paths].");
    }

    let game = match resolve_game(&args.query, &games) {
        Ok(game) => game.clone(),
        Err(e) => {
            let mut message = e.message;
            if let Some(suggestions) = e.suggestion {
                message.push_str("\n\nDid you mean:");
                for suggestion in suggestions {
                    message.push_str(&format!("\n  - {}", suggestion));
                }
            }
            bail!(message);
        }
    };

    match engine.launch(&game.id, Some(&game)) {
        Ok(()) => {
            println!("Launched {}", game.name);
            Ok(())
        }
        Err(e @ LibraryError::LaunchFailure { .. }) => Err(anyhow::Error::new(e).context(format!(
            "Failed to launch {}\n\nIf the game was uninstalled, remove it with:\n  controller-launch remove {}",
            game.name, game.id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// `remove <id>`
pub fn remove(engine: &mut LibraryEngine, args: RemoveArgs) -> Result<()> {
    engine.rescan(false);
    if engine.remove(&args.id) {
        println!("Removed {}", args.id);
    } else {
        println!("Nothing to remove for {}", args.id);
    }
    Ok(())
}

/// `rescan`: forced rescan with per-source counts.
pub fn rescan(engine: &mut LibraryEngine) -> Result<()> {
    engine.rescan(true);
    let catalog = engine.catalog();
    for source in GameSource::ALL {
        let count = catalog.values().filter(|g| g.source == source).count();
        println!("{:<8} {}", source, count);
    }
    println!("{:<8} {}", "Total", catalog.len());
    Ok(())
}

/// `devices`: connected controllers.
#[cfg(feature = "gamepad")]
pub fn devices(args: DevicesArgs) -> Result<()> {
    use controller_launch_core::app::input::{ControllerFamily, detect_devices};

    let devices = detect_devices();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else if devices.is_empty() {
        eprintln!("No controllers connected.");
    } else {
        for device in devices {
            println!(
                "#{} {} ({:?}) - {} buttons, {} axes",
                device.id,
                device.name,
                ControllerFamily::from_device_name(&device.name),
                device.buttons,
                device.axes
            );
        }
    }
    Ok(())
}

#[cfg(not(feature = "gamepad"))]
pub fn devices(_args: DevicesArgs) -> Result<()> {
    bail!("controller-launch was built without gamepad support")
}

/// `overlay`: controller-driven session until the input source goes away.
#[cfg(feature = "gamepad")]
pub fn overlay(engine: LibraryEngine) -> Result<()> {
    use controller_launch_core::app::input::{ControllerDaemon, InterpreterConfig};

    let (config, warnings) = InterpreterConfig::from_config(&engine.settings().settings().controller);
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
    let minimize_to_tray = engine.settings().settings().general.minimize_to_tray;

    let (mut daemon, actions) =
        ControllerDaemon::start(config).context("Failed to start controller polling")?;
    let mut overlay = Overlay::new(engine);
    tracing::info!("Overlay ready. Hold the guide button to open it.");

    for action in actions.iter() {
        let Some(event) = overlay.handle_action(action) else {
            continue;
        };
        print_event(&mut overlay, &event);

        if event == OverlayEvent::Hidden && !minimize_to_tray {
            break;
        }
    }

    daemon.stop();
    Ok(())
}

#[cfg(not(feature = "gamepad"))]
pub fn overlay(_engine: LibraryEngine) -> Result<()> {
    bail!("controller-launch was built without gamepad support")
}

#[cfg(feature = "gamepad")]
fn print_event(overlay: &mut Overlay, event: &OverlayEvent) {
    match event {
        OverlayEvent::Shown => {
            let columns = overlay.grid().columns();
            for (i, game) in overlay.games().iter().enumerate() {
                println!("[{},{}] {}", i / columns, i % columns, game.name);
            }
            if let Some(game) = overlay.selected() {
                println!("> {}", game.name);
            }
        }
        OverlayEvent::Hidden => println!("(overlay hidden)"),
        OverlayEvent::SelectionChanged(_) => {
            if let Some(game) = overlay.selected() {
                println!("> {}", game.name);
            }
        }
        OverlayEvent::Launched { name, .. } => println!("Launched {}", name),
        OverlayEvent::LaunchFailed { id, name, message } => {
            eprintln!("Failed to launch {}: {}", name, message);
            eprintln!("Remove it with: controller-launch remove {}", id);
        }
        OverlayEvent::ControllersChanged => tracing::debug!("Controller list changed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use controller_launch_core::app::config::{Config, MemorySettings};
    use controller_launch_core::test_utils::{RecordingLauncher, StubScanner, steam_game};

    fn engine_with(launcher: &RecordingLauncher) -> LibraryEngine {
        let games = vec![steam_game("620", "Portal 2"), steam_game("400", "Portal")];
        LibraryEngine::new(Box::new(MemorySettings::new(Config::default())))
            .with_scanners(vec![Box::new(StubScanner::new(GameSource::Steam, games))])
            .with_launcher(Box::new(launcher.clone()))
    }

    fn launch_args(query: &str) -> LaunchArgs {
        LaunchArgs {
            query: query.to_string(),
        }
    }

    #[test]
    fn test_format_game_line() {
        let line = format_game_line(&steam_game("620", "Portal 2"));
        assert!(line.starts_with("steam:620 "));
        assert!(line.ends_with("Portal 2 [Steam]"));
    }

    #[test]
    fn test_launch_unknown_query_returns_error_with_suggestions() {
        let launcher = RecordingLauncher::new();
        let mut engine = engine_with(&launcher);

        let err = launch(&mut engine, launch_args("steam:621")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Did you mean"));
        assert!(message.contains("steam:620"));
        assert!(launcher.launched().is_empty());
    }

    #[test]
    fn test_launch_failure_returns_error_with_remove_hint() {
        let launcher = RecordingLauncher::new();
        launcher.fail_with(Some(io::ErrorKind::NotFound));
        let mut engine = engine_with(&launcher);

        let err = launch(&mut engine, launch_args("steam:620")).unwrap_err();
        assert!(format!("{:#}", err).contains("controller-launch remove steam:620"));
        assert!(matches!(
            err.downcast_ref::<LibraryError>(),
            Some(LibraryError::LaunchFailure { .. })
        ));
    }

    #[test]
    fn test_launch_success() {
        let launcher = RecordingLauncher::new();
        let mut engine = engine_with(&launcher);

        launch(&mut engine, launch_args("Portal 2")).unwrap();
        assert_eq!(launcher.launched().len(), 1);
    }
}

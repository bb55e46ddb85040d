//! controller-launch - game launcher driven by a controller
//!
//! # Commands
//!
//! - `controller-launch overlay` - Run the controller overlay (default)
//! - `controller-launch list` - List every discovered game
//! - `controller-launch recent` - Show the overlay's game list
//! - `controller-launch launch <query>` - Launch by id, name or prefix
//! - `controller-launch remove <id>` - Forget a game
//! - `controller-launch rescan` - Force a rescan and print counts
//! - `controller-launch devices` - List connected controllers

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use controller_launch::commands::{self, DevicesArgs, LaunchArgs, ListArgs, RecentArgs, RemoveArgs};
use controller_launch_core::app::config::{FileSettings, MemorySettings, SettingsStore};
use controller_launch_core::library::LibraryEngine;

/// Discover installed games and launch them from a controller
#[derive(Parser)]
#[command(name = "controller-launch")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/controller-launch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller overlay until input stops
    Overlay,

    /// List every discovered game
    List(ListArgs),

    /// Show recently played games, then the rest by name
    Recent(RecentArgs),

    /// Launch a game
    Launch(LaunchArgs),

    /// Remove a game from the library and play history
    Remove(RemoveArgs),

    /// Rescan every source now
    Rescan,

    /// List connected controllers
    Devices(DevicesArgs),
}

fn open_settings(path: Option<PathBuf>) -> Box<dyn SettingsStore> {
    match path.map(FileSettings::open).or_else(FileSettings::open_default) {
        Some(settings) => {
            tracing::debug!("Using config {}", settings.path().display());
            Box::new(settings)
        }
        None => {
            tracing::warn!("No config directory available, settings will not be saved");
            Box::new(MemorySettings::default())
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut engine = LibraryEngine::new(open_settings(cli.config));

    match cli.command.unwrap_or(Commands::Overlay) {
        Commands::Overlay => commands::overlay(engine),
        Commands::List(args) => commands::list(&mut engine, args),
        Commands::Recent(args) => commands::recent(&mut engine, args),
        Commands::Launch(args) => commands::launch(&mut engine, args),
        Commands::Remove(args) => commands::remove(&mut engine, args),
        Commands::Rescan => commands::rescan(&mut engine),
        Commands::Devices(args) => commands::devices(args),
    }
}

//! Launch dispatch
//!
//! Maps a record's source to how the OS should start it. Launches are
//! fire-and-forget: only spawn-time failures are reported. Spawned children
//! are reaped on a detached thread so finished games do not linger as zombies.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use super::{GameRecord, GameSource, LibraryError};

/// An OS-level invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    /// Hand a URI to the desktop's default handler
    OpenUri(String),
    /// Spawn a program with arguments
    Spawn { program: String, args: Vec<String> },
}

impl LaunchCommand {
    /// Builds the invocation for `record`.
    ///
    /// Steam targets are URIs, Flatpak and Lutris targets are whitespace
    /// tokenized command lines, custom targets are a bare executable path.
    pub fn for_record(record: &GameRecord) -> Result<Self, LibraryError> {
        let command = match record.source {
            GameSource::Steam => LaunchCommand::OpenUri(record.launch_target.clone()),
            GameSource::Flatpak | GameSource::Lutris => {
                let mut tokens = record.launch_target.split_whitespace().map(str::to_string);
                let program = tokens.next().ok_or_else(|| LibraryError::LaunchFailure {
                    id: record.id.clone(),
                    cause: io::Error::new(io::ErrorKind::InvalidInput, "empty launch command"),
                })?;
                LaunchCommand::Spawn {
                    program,
                    args: tokens.collect(),
                }
            }
            GameSource::Custom => LaunchCommand::Spawn {
                program: record.launch_target.clone(),
                args: Vec::new(),
            },
        };
        Ok(command)
    }
}

/// Starts processes without waiting for them.
pub trait ProcessLauncher: Send {
    fn launch(&mut self, command: &LaunchCommand) -> io::Result<()>;
}

/// Launches through the real OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&mut self, command: &LaunchCommand) -> io::Result<()> {
        match command {
            LaunchCommand::OpenUri(uri) => open::that_detached(uri),
            LaunchCommand::Spawn { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
                tracing::debug!("Spawning {:?}", cmd);
                let child = cmd.spawn()?;
                if let Err(e) = reap_detached(child) {
                    tracing::warn!("Could not start reaper thread: {}", e);
                }
                Ok(())
            }
        }
    }
}

/// Waits for `child` on a background thread and logs how it exited.
fn reap_detached(mut child: Child) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let pid = child.id();
    thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => {
                tracing::debug!("Launched process {} exited with {}", pid, status);
                Some(status)
            }
            Err(e) => {
                tracing::warn!("Failed to wait for launched process {}: {}", pid, e);
                None
            }
        })
}

// src/services/launcher.rs
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

/// Result of trying to start the backend.
///
/// `SpawnRequested` only means the OS accepted the process. Whether the
/// backend actually came up is unknown until the caller probes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    SpawnRequested { pid: Option<u32> },
    SpawnFailed { reason: String },
}

impl LaunchOutcome {
    pub fn spawn_requested(&self) -> bool {
        matches!(self, LaunchOutcome::SpawnRequested { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Launcher {
    command: Vec<String>,
}

impl Launcher {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Fire-and-forget spawn. The child is neither awaited nor killed on drop.
    pub fn attempt_start(&self) -> LaunchOutcome {
        let Some((program, args)) = self.command.split_first() else {
            return LaunchOutcome::SpawnFailed {
                reason: "launch command is empty".to_string(),
            };
        };

        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match spawned {
            Ok(child) => {
                let pid = child.id();
                info!(program = %program, ?pid, "spawned backend process");
                LaunchOutcome::SpawnRequested { pid }
            }
            Err(e) => {
                warn!(program = %program, error = %e, "failed to spawn backend process");
                LaunchOutcome::SpawnFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

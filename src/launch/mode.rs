use std::{env, ffi::OsString};

use super::{CommandSpec, HandoffEnv};
use crate::constants::DEFAULT_SHELL;

/// Kind of process the credentials are handed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// The user's `$SHELL`
    Shell,
    /// A new tmux session on a dedicated server socket
    Tmux,
    /// An interactive, auto-removed Docker container
    Docker {
        image: String,
        /// `None` keeps the image's own entrypoint
        entrypoint: Option<String>,
    },
}

impl LaunchMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Tmux => "tmux",
            Self::Docker { .. } => "docker",
        }
    }

    /// Build the command line for this mode
    pub fn command(&self, profile: &str, expires_at: i64, handoff: &HandoffEnv) -> CommandSpec {
        match self {
            Self::Shell => shell_command(env::var_os("SHELL")),
            Self::Tmux => tmux_command(profile, expires_at),
            Self::Docker { image, entrypoint } => {
                docker_command(image, entrypoint.as_deref(), handoff)
            }
        }
    }
}

/// Socket name for a credential context.
///
/// A shared tmux server would leak these variables into unrelated sessions
/// through its global environment, so every context gets its own server.
pub fn tmux_socket_name(profile: &str, expires_at: i64) -> String {
    format!("{profile}-{expires_at}")
}

pub fn resolve_shell(shell: Option<OsString>) -> String {
    shell
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

fn shell_command(shell: Option<OsString>) -> CommandSpec {
    CommandSpec::new(resolve_shell(shell), Vec::new())
}

fn tmux_command(profile: &str, expires_at: i64) -> CommandSpec {
    let socket = tmux_socket_name(profile, expires_at);
    let args = vec![
        "-L".to_string(),
        socket.clone(),
        "new-session".to_string(),
        "-s".to_string(),
        socket,
    ];
    CommandSpec::new("tmux", args)
}

fn docker_command(image: &str, entrypoint: Option<&str>, handoff: &HandoffEnv) -> CommandSpec {
    let mut args: Vec<String> = ["run", "--interactive", "--tty", "--rm"]
        .into_iter()
        .map(str::to_string)
        .collect();

    // Name only: docker copies the value from its own environment, so secrets
    // never appear on the command line.
    for name in handoff.names() {
        args.push("--env".to_string());
        args.push(name.to_string());
    }

    if let Some(entrypoint) = entrypoint.filter(|e| !e.is_empty()) {
        args.push("--entrypoint".to_string());
        args.push(entrypoint.to_string());
    }

    args.push(image.to_string());
    CommandSpec::new("docker", args)
}

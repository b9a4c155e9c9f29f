use std::{future::Future, process::ExitStatus};

use tokio::process::Command;
use tracing::{debug, info};

use crate::{aws::Credentials, config::LaunchConfig, error::LaunchError};

pub mod env;
pub mod mode;

pub use env::HandoffEnv;
pub use mode::LaunchMode;

/// Program and arguments of the process to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// Runs a command to completion with the handoff variables applied.
pub trait Spawner {
    fn run(
        &self,
        spec: &CommandSpec,
        env: &HandoffEnv,
    ) -> impl Future<Output = Result<ExitStatus, LaunchError>> + Send;
}

/// Starts a real child process attached to this process's stdio
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    async fn run(&self, spec: &CommandSpec, env: &HandoffEnv) -> Result<ExitStatus, LaunchError> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        for (name, value) in env.iter() {
            command.env(name, value);
        }

        // stdin, stdout and stderr are inherited by `status()`
        command
            .status()
            .await
            .map_err(|source| LaunchError::from_io(&spec.program, source))
    }
}

/// Hand `credentials` to the process selected by `config` and wait for it
pub async fn launch<S: Spawner>(
    spawner: &S,
    credentials: &Credentials,
    config: &LaunchConfig,
) -> Result<ExitStatus, LaunchError> {
    let env = HandoffEnv::new(&config.profile, credentials);
    let spec = config
        .mode
        .command(&config.profile, credentials.expires_at_epoch(), &env);

    info!("Launching {}: {}", config.mode.name(), spec.program);
    debug!("Arguments: {:?}", spec.args);
    debug!("Environment: {:?}", env);

    let status = spawner.run(&spec, &env).await?;

    info!("{} exited with {}", spec.program, status);
    Ok(status)
}

/// Exit code to report for a finished child.
///
/// A child killed by a signal maps to `128 + signal`, as shells do.
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128u8.wrapping_add((signal & 0x7f) as u8);
        }
    }

    1
}

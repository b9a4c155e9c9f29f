use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use aws_smithy_types::date_time::Format;
use clap::Args;
use tracing::{debug, info};

use crate::{
    aws::CredentialProvider,
    config::LaunchConfig,
    constants::{DEFAULT_DOCKER_ENTRYPOINT, DEFAULT_DOCKER_IMAGE},
    launch::{self, HandoffEnv, LaunchMode, Spawner},
};

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    #[arg(
        short = 'd',
        long,
        value_parser = humantime::parse_duration,
        help = "Requested credential lifetime (e.g. 1h, 90m) [default: profile duration_seconds, else 1h]; STS may grant less"
    )]
    pub duration: Option<Duration>,

    #[arg(short = 't', long, help = "Start a tmux session on a dedicated socket instead of $SHELL")]
    pub tmux: bool,

    #[arg(long, conflicts_with = "tmux", help = "Pass the credentials to a new Docker container")]
    pub docker: bool,

    #[arg(long, default_value = DEFAULT_DOCKER_IMAGE, help = "Docker image to use with --docker")]
    pub image: String,

    #[arg(
        long,
        default_value = DEFAULT_DOCKER_ENTRYPOINT,
        help = "Docker entrypoint to use with --docker (empty string keeps the image default)"
    )]
    pub entrypoint: String,

    #[arg(long, help = "Print export statements for the credentials instead of launching")]
    pub print_env: bool,
}

impl LaunchArgs {
    pub fn mode(&self) -> LaunchMode {
        match (self.tmux, self.docker) {
            (_, true) => LaunchMode::Docker {
                image: self.image.clone(),
                entrypoint: (!self.entrypoint.is_empty()).then(|| self.entrypoint.clone()),
            },
            (true, false) => LaunchMode::Tmux,
            (false, false) => LaunchMode::Shell,
        }
    }

    pub fn to_config(&self, profile: &str) -> LaunchConfig {
        LaunchConfig {
            profile: profile.to_string(),
            lifetime: self.duration,
            mode: self.mode(),
        }
    }

    /// Acquire credentials for `profile` and hand them to the selected process.
    ///
    /// Returns the exit code this process should report.
    pub async fn execute<P, S>(self, profile: &str, provider: &P, spawner: &S) -> Result<u8>
    where
        P: CredentialProvider,
        S: Spawner,
    {
        let config = self.to_config(profile);
        info!(
            "Requesting credentials for profile {} ({} mode)",
            profile,
            config.mode.name()
        );

        let credentials = provider
            .acquire(&config.profile, config.lifetime)
            .await
            .with_context(|| format!("Failed to acquire credentials for profile '{profile}'"))?;

        debug!("Access key id: {}", credentials.access_key_id);
        info!(
            "Credentials expire at {}",
            credentials
                .expiration
                .fmt(Format::DateTime)
                .unwrap_or_else(|_| "unknown".to_string())
        );

        if self.print_env {
            let exports = HandoffEnv::new(&config.profile, &credentials).to_exports();
            io::stdout()
                .write_all(exports.as_bytes())
                .context("Failed to write credentials to stdout")?;
            return Ok(0);
        }

        let status = launch::launch(spawner, &credentials, &config)
            .await
            .with_context(|| {
                format!(
                    "Failed to launch {} for profile '{profile}'",
                    config.mode.name()
                )
            })?;

        Ok(launch::exit_code(status))
    }
}

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::{
    aws::StsProvider,
    commands::{CompletionsCommand, LaunchArgs},
    launch::ProcessSpawner,
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "arg",
    version,
    about = "Assume an AWS role and hand the temporary credentials to a new shell, tmux session or Docker container",
    long_about = None
)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "AWS_PROFILE",
        default_value = "default",
        help = "AWS profile name (from ~/.aws/config or ~/.aws/credentials)"
    )]
    pub profile: String,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(flatten)]
    pub launch: LaunchArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Generate shell completion scripts for arg")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<ExitCode> {
        match self.command {
            Some(Commands::Completions(cmd)) => {
                cmd.execute();
                Ok(ExitCode::SUCCESS)
            }
            None => {
                let code = self
                    .launch
                    .execute(&self.profile, &StsProvider::new(), &ProcessSpawner)
                    .await?;
                Ok(ExitCode::from(code))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::LaunchMode;
    use clap::{CommandFactory, error::ErrorKind};
    use serial_test::serial;
    use std::{env, time::Duration};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    #[serial]
    fn test_profile_default_value() {
        let original = env::var("AWS_PROFILE").ok();

        unsafe {
            env::remove_var("AWS_PROFILE");
        }
        let cli = parse(&["arg"]);
        assert_eq!(cli.profile, "default");

        unsafe {
            if let Some(val) = original {
                env::set_var("AWS_PROFILE", val);
            }
        }
    }

    #[test]
    #[serial]
    fn test_profile_from_env() {
        let original = env::var("AWS_PROFILE").ok();

        unsafe {
            env::set_var("AWS_PROFILE", "staging");
        }
        let cli = parse(&["arg"]);
        assert_eq!(cli.profile, "staging");

        unsafe {
            match original {
                Some(val) => env::set_var("AWS_PROFILE", val),
                None => env::remove_var("AWS_PROFILE"),
            }
        }
    }

    #[test]
    fn test_profile_custom_value() {
        let cli = parse(&["arg", "--profile", "production"]);
        assert_eq!(cli.profile, "production");
    }

    #[test]
    fn test_profile_short_flag() {
        let cli = parse(&["arg", "-p", "dev"]);
        assert_eq!(cli.profile, "dev");
    }

    #[test]
    fn test_duration_defaults_to_profile() {
        let cli = parse(&["arg"]);
        assert_eq!(cli.launch.duration, None);
    }

    #[test]
    fn test_duration_parsing() {
        let cli = parse(&["arg", "--duration", "1h30m"]);
        assert_eq!(cli.launch.duration, Some(Duration::from_secs(5400)));

        let cli = parse(&["arg", "-d", "15m"]);
        assert_eq!(cli.launch.duration, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_invalid_duration_fails() {
        let result = Cli::try_parse_from(["arg", "--duration", "soon"]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_default_mode_is_shell() {
        let cli = parse(&["arg"]);
        assert_eq!(cli.launch.mode(), LaunchMode::Shell);
    }

    #[test]
    fn test_tmux_mode() {
        let cli = parse(&["arg", "--tmux"]);
        assert_eq!(cli.launch.mode(), LaunchMode::Tmux);

        let cli = parse(&["arg", "-t"]);
        assert_eq!(cli.launch.mode(), LaunchMode::Tmux);
    }

    #[test]
    fn test_docker_mode_defaults() {
        let cli = parse(&["arg", "--docker"]);
        assert_eq!(
            cli.launch.mode(),
            LaunchMode::Docker {
                image: "alpine".to_string(),
                entrypoint: Some("/bin/sh".to_string()),
            }
        );
    }

    #[test]
    fn test_docker_mode_with_image_and_empty_entrypoint() {
        let cli = parse(&["arg", "--docker", "--image", "amazon/aws-cli", "--entrypoint", ""]);
        assert_eq!(
            cli.launch.mode(),
            LaunchMode::Docker {
                image: "amazon/aws-cli".to_string(),
                entrypoint: None,
            }
        );
    }

    #[test]
    fn test_tmux_and_docker_conflict() {
        let result = Cli::try_parse_from(["arg", "--tmux", "--docker"]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = parse(&["arg", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_no_command_launches() {
        let cli = parse(&["arg"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["arg", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["arg", "--help"]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["arg", "--version"]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = parse(&["arg", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = parse(&["arg"]);
        assert_eq!(cli.verbose, 0);
    }
}

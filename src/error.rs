use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures while obtaining temporary credentials for a profile.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Profile '{0}' not found in AWS config or credentials files")]
    ProfileNotFound(String),
    #[error("Failed to read AWS configuration file {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
    #[error("Profile '{profile}' is not usable: {reason}")]
    InvalidProfile { profile: String, reason: String },
    /// The MFA prompt was aborted or stdin is not a terminal.
    #[error("Failed to read MFA token for {serial}")]
    TokenPrompt {
        serial: String,
        #[source]
        source: dialoguer::Error,
    },
    #[error("AWS STS {operation} failed: {message}")]
    Sts {
        operation: &'static str,
        message: String,
    },
    #[error("AWS STS {0} returned no credentials")]
    MissingCredentials(&'static str),
}

/// Failures while starting the subprocess that receives the credentials.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Executable `{program}` not found")]
    NotFound { program: String },
    #[error("Failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub fn from_io(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                program: program.to_string(),
            },
            _ => Self::Spawn {
                program: program.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_io_error_maps_to_not_found() {
        let err = LaunchError::from_io("tmux", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, LaunchError::NotFound { ref program } if program == "tmux"));
        assert_eq!(err.to_string(), "Executable `tmux` not found");
    }

    #[test]
    fn test_other_io_error_maps_to_spawn() {
        let err = LaunchError::from_io(
            "docker",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[test]
    fn test_credential_error_messages_name_the_profile() {
        let err = CredentialError::ProfileNotFound("dev".to_string());
        assert!(err.to_string().contains("'dev'"));

        let err = CredentialError::InvalidProfile {
            profile: "prod".to_string(),
            reason: "role_arn requires source_profile".to_string(),
        };
        assert!(err.to_string().contains("'prod'"));
        assert!(err.to_string().contains("source_profile"));
    }
}

use std::{env, path::PathBuf, time::Duration};

/// Environment variable carrying the temporary access key id
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable carrying the temporary secret access key
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Environment variable carrying the STS session token
pub const ENV_AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Environment variable carrying the resolved region
pub const ENV_AWS_REGION: &str = "AWS_REGION";

/// Environment variable carrying the profile name
pub const ENV_AWS_PROFILE: &str = "AWS_PROFILE";

/// Expiry of the injected credentials, in epoch seconds
pub const ENV_ARG_EXPIRE_AT: &str = "ARG_ROLE_CREDS_EXPIRE_AT";

/// Profile the injected credentials were issued for
pub const ENV_ARG_PROFILE: &str = "ARG_PROFILE";

/// Shell used when `$SHELL` is unset or empty
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Default Docker image for `--docker`
pub const DEFAULT_DOCKER_IMAGE: &str = "alpine";

/// Default Docker entrypoint for `--docker`
pub const DEFAULT_DOCKER_ENTRYPOINT: &str = "/bin/sh";

/// Lifetime requested when neither `--duration` nor `duration_seconds` is set
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// Shortest session STS will issue, in seconds
pub const MIN_SESSION_DURATION_SECS: u64 = 900;

/// Longest session AssumeRole will issue, in seconds
pub const MAX_ASSUME_ROLE_DURATION_SECS: u64 = 43_200;

/// Longest session GetSessionToken will issue, in seconds
pub const MAX_SESSION_TOKEN_DURATION_SECS: u64 = 129_600;

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Prefix of generated role session names
pub const ROLE_SESSION_NAME_PREFIX: &str = "arg";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS shared credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_get_aws_config_path_with_env() {
        let original = env::var("AWS_CONFIG_FILE").ok();

        unsafe {
            env::set_var("AWS_CONFIG_FILE", "/custom/aws/config");
        }
        let path = get_aws_config_path();
        assert_eq!(path, Some(PathBuf::from("/custom/aws/config")));

        unsafe {
            match original {
                Some(val) => env::set_var("AWS_CONFIG_FILE", val),
                None => env::remove_var("AWS_CONFIG_FILE"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_config_path_default() {
        let original = env::var("AWS_CONFIG_FILE").ok();

        unsafe {
            env::remove_var("AWS_CONFIG_FILE");
        }
        let path = get_aws_config_path();

        if let Some(p) = path {
            let path_str = p.to_string_lossy();
            assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
            assert!(path_str.ends_with(AWS_CONFIG_FILE_NAME));
        }

        unsafe {
            if let Some(val) = original {
                env::set_var("AWS_CONFIG_FILE", val);
            }
        }
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_with_env() {
        let original = env::var("AWS_SHARED_CREDENTIALS_FILE").ok();

        unsafe {
            env::set_var("AWS_SHARED_CREDENTIALS_FILE", "/custom/path/credentials");
        }
        let path = get_aws_credentials_path();
        assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));

        unsafe {
            match original {
                Some(val) => env::set_var("AWS_SHARED_CREDENTIALS_FILE", val),
                None => env::remove_var("AWS_SHARED_CREDENTIALS_FILE"),
            }
        }
    }
}

use crate::{
    constants::{self, DEFAULT_LIFETIME},
    error::CredentialError,
    launch::LaunchMode,
};
use ini::{Ini, Properties};
use std::{path::PathBuf, time::Duration};

/// Everything one invocation needs to know, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub profile: String,
    /// `None` when `--duration` was not given
    pub lifetime: Option<Duration>,
    pub mode: LaunchMode,
}

/// Assume-role settings of a profile, merged from the shared config and
/// credentials files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub role_arn: Option<String>,
    pub source_profile: Option<String>,
    pub credential_source: Option<String>,
    pub mfa_serial: Option<String>,
    pub region: Option<String>,
    pub external_id: Option<String>,
    pub role_session_name: Option<String>,
    pub duration_seconds: Option<u64>,
}

/// Where the long-lived credentials for an AssumeRole call come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseCredentials {
    SourceProfile(String),
    Environment,
    Ec2InstanceMetadata,
    EcsContainer,
}

impl ProfileConfig {
    fn from_ini_section(section: &Properties) -> Self {
        let get = |key: &str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            role_arn: get("role_arn"),
            source_profile: get("source_profile"),
            credential_source: get("credential_source"),
            mfa_serial: get("mfa_serial"),
            region: get("region"),
            external_id: get("external_id"),
            role_session_name: get("role_session_name"),
            duration_seconds: get("duration_seconds").and_then(|s| s.parse().ok()),
        }
    }

    /// Fill fields missing from `self` with those of `fallback`
    fn or(self, fallback: Self) -> Self {
        Self {
            role_arn: self.role_arn.or(fallback.role_arn),
            source_profile: self.source_profile.or(fallback.source_profile),
            credential_source: self.credential_source.or(fallback.credential_source),
            mfa_serial: self.mfa_serial.or(fallback.mfa_serial),
            region: self.region.or(fallback.region),
            external_id: self.external_id.or(fallback.external_id),
            role_session_name: self.role_session_name.or(fallback.role_session_name),
            duration_seconds: self.duration_seconds.or(fallback.duration_seconds),
        }
    }

    /// Lifetime to request: `--duration`, else the profile's
    /// `duration_seconds`, else one hour
    pub fn lifetime(&self, requested: Option<Duration>) -> Duration {
        requested
            .or(self.duration_seconds.map(Duration::from_secs))
            .unwrap_or(DEFAULT_LIFETIME)
    }

    /// Resolve `source_profile` / `credential_source` for an AssumeRole call
    pub fn base_credentials(&self, profile: &str) -> Result<BaseCredentials, CredentialError> {
        let invalid = |reason: &str| CredentialError::InvalidProfile {
            profile: profile.to_string(),
            reason: reason.to_string(),
        };

        match (&self.source_profile, self.credential_source.as_deref()) {
            (Some(_), Some(_)) => Err(invalid(
                "only one of source_profile and credential_source may be set",
            )),
            (Some(source), None) => Ok(BaseCredentials::SourceProfile(source.clone())),
            (None, Some("Environment")) => Ok(BaseCredentials::Environment),
            (None, Some("Ec2InstanceMetadata")) => Ok(BaseCredentials::Ec2InstanceMetadata),
            (None, Some("EcsContainer")) => Ok(BaseCredentials::EcsContainer),
            (None, Some(other)) => Err(invalid(&format!(
                "unsupported credential_source '{other}'"
            ))),
            (None, None) => Err(invalid(
                "role_arn requires source_profile or credential_source",
            )),
        }
    }
}

/// Resolve `profile` from the shared config and credentials files.
///
/// Keys may appear in either file; the config file wins when both set one.
/// A profile present in neither file is an error.
pub fn load_profile(profile: &str) -> Result<ProfileConfig, CredentialError> {
    let config_ini = load_ini(constants::get_aws_config_path())?;
    let credentials_ini = load_ini(constants::get_aws_credentials_path())?;

    let from_config = config_ini.as_ref().and_then(|ini| {
        config_section_names(profile)
            .iter()
            .find_map(|name| ini.section(Some(name.as_str())))
            .map(ProfileConfig::from_ini_section)
    });

    let from_credentials = credentials_ini
        .as_ref()
        .and_then(|ini| ini.section(Some(profile)))
        .map(ProfileConfig::from_ini_section);

    match (from_config, from_credentials) {
        (None, None) => Err(CredentialError::ProfileNotFound(profile.to_string())),
        (config, credentials) => Ok(config
            .unwrap_or_default()
            .or(credentials.unwrap_or_default())),
    }
}

fn config_section_names(profile: &str) -> Vec<String> {
    if profile == "default" {
        vec![profile.to_string(), format!("profile {profile}")]
    } else {
        vec![format!("profile {profile}")]
    }
}

fn load_ini(path: Option<PathBuf>) -> Result<Option<Ini>, CredentialError> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(None);
    };

    Ini::load_from_file(&path)
        .map(Some)
        .map_err(|source| CredentialError::ConfigFile { path, source })
}

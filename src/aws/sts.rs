use std::time::{Duration, SystemTime};

use aws_config::{
    BehaviorVersion, Region, SdkConfig, ecs::EcsCredentialsProvider,
    environment::EnvironmentVariableCredentialsProvider,
    imds::credentials::ImdsCredentialsProvider, profile::ProfileFileCredentialsProvider,
};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_sts::{Client as StsClient, error::DisplayErrorContext};
use aws_smithy_types::DateTime;
use tracing::{debug, info, warn};

use super::{CredentialProvider, Credentials, mfa};
use crate::{
    config::{self, BaseCredentials, ProfileConfig},
    constants::{
        DEFAULT_AWS_REGION, MAX_ASSUME_ROLE_DURATION_SECS, MAX_SESSION_TOKEN_DURATION_SECS,
        MIN_SESSION_DURATION_SECS, ROLE_SESSION_NAME_PREFIX,
    },
    error::CredentialError,
};

/// Obtains credentials from AWS STS.
///
/// Profiles with a `role_arn` go through `AssumeRole` using the
/// `source_profile` or `credential_source` credentials; anything else goes
/// through `GetSessionToken` so the bundle always carries a real expiry.
///
/// Long-lived credentials are always read from the named profile, never from
/// `AWS_ACCESS_KEY_ID` and friends, which a parent `arg` shell already set.
#[derive(Debug, Clone, Default)]
pub struct StsProvider;

impl StsProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for StsProvider {
    async fn acquire(
        &self,
        profile: &str,
        lifetime: Option<Duration>,
    ) -> Result<Credentials, CredentialError> {
        let profile_config = config::load_profile(profile)?;
        let lifetime = profile_config.lifetime(lifetime);

        match profile_config.role_arn.as_deref() {
            Some(role_arn) => assume_role(profile, &profile_config, role_arn, lifetime).await,
            None => get_session_token(profile, &profile_config, lifetime).await,
        }
    }
}

async fn assume_role(
    profile: &str,
    profile_config: &ProfileConfig,
    role_arn: &str,
    lifetime: Duration,
) -> Result<Credentials, CredentialError> {
    let base = profile_config.base_credentials(profile)?;

    let duration_seconds = clamp_duration(lifetime, MAX_ASSUME_ROLE_DURATION_SECS);
    let session_name = profile_config
        .role_session_name
        .clone()
        .unwrap_or_else(default_session_name);

    info!("Calling AWS STS AssumeRole");
    debug!("Profile: {}", profile);
    debug!("Base credentials: {:?}", base);
    debug!("Role ARN: {}", role_arn);
    debug!("Session name: {}", session_name);
    debug!("Duration: {} seconds", duration_seconds);

    let (sdk_config, region) = load_sdk_config(
        profile,
        profile_config.region.as_deref(),
        base_provider(&base),
    )
    .await;
    let client = StsClient::new(&sdk_config);

    let mut request = client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name)
        .duration_seconds(duration_seconds);

    if let Some(external_id) = &profile_config.external_id {
        request = request.external_id(external_id);
    }

    if let Some(serial) = &profile_config.mfa_serial {
        let code = mfa::prompt_token(serial)?;
        request = request.serial_number(serial).token_code(code);
    }

    let response = request.send().await.map_err(|e| CredentialError::Sts {
        operation: "AssumeRole",
        message: DisplayErrorContext(&e).to_string(),
    })?;

    let sts_creds = response
        .credentials()
        .ok_or(CredentialError::MissingCredentials("AssumeRole"))?;

    info!("Successfully assumed role {}", role_arn);
    Ok(Credentials::from_sts(sts_creds, region))
}

async fn get_session_token(
    profile: &str,
    profile_config: &ProfileConfig,
    lifetime: Duration,
) -> Result<Credentials, CredentialError> {
    let duration_seconds = clamp_duration(lifetime, MAX_SESSION_TOKEN_DURATION_SECS);

    info!("Calling AWS STS GetSessionToken");
    debug!("Profile: {}", profile);
    debug!("Duration: {} seconds", duration_seconds);

    let (sdk_config, region) = load_sdk_config(
        profile,
        profile_config.region.as_deref(),
        SharedCredentialsProvider::new(profile_credentials(profile)),
    )
    .await;
    let client = StsClient::new(&sdk_config);

    let mut request = client.get_session_token().duration_seconds(duration_seconds);

    if let Some(serial) = &profile_config.mfa_serial {
        let code = mfa::prompt_token(serial)?;
        request = request.serial_number(serial).token_code(code);
    }

    let response = request.send().await.map_err(|e| CredentialError::Sts {
        operation: "GetSessionToken",
        message: DisplayErrorContext(&e).to_string(),
    })?;

    let sts_creds = response
        .credentials()
        .ok_or(CredentialError::MissingCredentials("GetSessionToken"))?;

    info!("Successfully obtained session token");
    Ok(Credentials::from_sts(sts_creds, region))
}

fn profile_credentials(profile_name: &str) -> ProfileFileCredentialsProvider {
    ProfileFileCredentialsProvider::builder()
        .profile_name(profile_name)
        .build()
}

fn base_provider(base: &BaseCredentials) -> SharedCredentialsProvider {
    match base {
        BaseCredentials::SourceProfile(name) => {
            SharedCredentialsProvider::new(profile_credentials(name))
        }
        BaseCredentials::Environment => {
            SharedCredentialsProvider::new(EnvironmentVariableCredentialsProvider::new())
        }
        BaseCredentials::Ec2InstanceMetadata => {
            SharedCredentialsProvider::new(ImdsCredentialsProvider::builder().build())
        }
        BaseCredentials::EcsContainer => {
            SharedCredentialsProvider::new(EcsCredentialsProvider::builder().build())
        }
    }
}

/// Load SDK config for `profile_name` with explicit `credentials`.
///
/// Returns the config to call STS with and the region to export, which is
/// `None` when nothing was configured and STS falls back to
/// `DEFAULT_AWS_REGION`.
async fn load_sdk_config(
    profile_name: &str,
    region: Option<&str>,
    credentials: SharedCredentialsProvider,
) -> (SdkConfig, Option<String>) {
    // Priority: profile region -> ENV vars -> config file -> DEFAULT_AWS_REGION
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile_name)
        .credentials_provider(credentials.clone());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let loaded = loader.load().await;

    match loaded.region() {
        Some(resolved) => {
            info!("Using region: {}", resolved);
            let resolved = resolved.to_string();
            (loaded, Some(resolved))
        }
        None => {
            info!(
                "No region configured, using default {} for STS",
                DEFAULT_AWS_REGION
            );
            let config = aws_config::defaults(BehaviorVersion::latest())
                .profile_name(profile_name)
                .credentials_provider(credentials)
                .region(Region::new(DEFAULT_AWS_REGION))
                .load()
                .await;
            (config, None)
        }
    }
}

/// Clamp the requested lifetime into the range STS accepts
fn clamp_duration(lifetime: Duration, max_secs: u64) -> i32 {
    let requested = lifetime.as_secs();
    let clamped = requested.clamp(MIN_SESSION_DURATION_SECS, max_secs);
    if clamped != requested {
        warn!(
            "Requested lifetime of {} seconds adjusted to {} seconds",
            requested, clamped
        );
    }
    i32::try_from(clamped).unwrap_or(i32::MAX)
}

fn default_session_name() -> String {
    let now = DateTime::from(SystemTime::now());
    format!("{}-{}", ROLE_SESSION_NAME_PREFIX, now.secs())
}

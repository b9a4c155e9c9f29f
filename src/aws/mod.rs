use std::{fmt, future::Future, time::Duration};

use aws_smithy_types::DateTime;

use crate::error::CredentialError;

pub mod mfa;
pub mod sts;

pub use sts::StsProvider;

/// AWS temporary credentials handed to the subprocess
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: Option<String>,
    pub expiration: DateTime,
}

impl Credentials {
    /// Build from an STS response, keeping the expiration STS actually granted
    pub fn from_sts(creds: &aws_sdk_sts::types::Credentials, region: Option<String>) -> Self {
        Self {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            region,
            expiration: *creds.expiration(),
        }
    }

    pub fn expires_at_epoch(&self) -> i64 {
        self.expiration.secs()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("region", &self.region)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Source of temporary credentials for a named profile.
///
/// `lifetime` is a request only (`None` leaves it to the profile);
/// implementations report the expiry the provider granted.
pub trait CredentialProvider {
    fn acquire(
        &self,
        profile: &str,
        lifetime: Option<Duration>,
    ) -> impl Future<Output = Result<Credentials, CredentialError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sts_credentials() -> aws_sdk_sts::types::Credentials {
        aws_sdk_sts::types::Credentials::builder()
            .access_key_id("ASIAEXAMPLE")
            .secret_access_key("secret")
            .session_token("token")
            .expiration(DateTime::from_secs(1_700_003_600))
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_sts_keeps_granted_expiration() {
        let creds = Credentials::from_sts(&sts_credentials(), Some("eu-west-1".to_string()));

        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token, "token");
        assert_eq!(creds.region.as_deref(), Some("eu-west-1"));
        assert_eq!(creds.expires_at_epoch(), 1_700_003_600);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::from_sts(&sts_credentials(), None);
        let debug = format!("{creds:?}");

        assert!(debug.contains("ASIAEXAMPLE"));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("token\""));
        assert!(debug.contains("redacted"));
    }
}

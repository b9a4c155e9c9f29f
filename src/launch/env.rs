use std::fmt;

use crate::{
    aws::Credentials,
    constants::{
        ENV_ARG_EXPIRE_AT, ENV_ARG_PROFILE, ENV_AWS_ACCESS_KEY_ID, ENV_AWS_PROFILE,
        ENV_AWS_REGION, ENV_AWS_SECRET_ACCESS_KEY, ENV_AWS_SESSION_TOKEN,
    },
};

/// Variables set on the spawned process.
///
/// This is the whole contract with whatever runs inside: scripts read
/// `ARG_ROLE_CREDS_EXPIRE_AT` to notice impending expiry and `ARG_PROFILE`
/// to tell which context they are in.
#[derive(Clone, PartialEq, Eq)]
pub struct HandoffEnv {
    vars: Vec<(&'static str, String)>,
}

impl HandoffEnv {
    pub fn new(profile: &str, creds: &Credentials) -> Self {
        let mut vars = vec![
            (ENV_AWS_ACCESS_KEY_ID, creds.access_key_id.clone()),
            (ENV_AWS_SECRET_ACCESS_KEY, creds.secret_access_key.clone()),
            (ENV_AWS_SESSION_TOKEN, creds.session_token.clone()),
        ];
        if let Some(region) = &creds.region {
            vars.push((ENV_AWS_REGION, region.clone()));
        }
        vars.push((ENV_AWS_PROFILE, profile.to_string()));
        vars.push((ENV_ARG_EXPIRE_AT, creds.expires_at_epoch().to_string()));
        vars.push((ENV_ARG_PROFILE, profile.to_string()));

        Self { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.vars.iter().map(|(name, _)| *name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Render as POSIX `export` lines, suitable for `eval "$(arg --print-env)"`
    pub fn to_exports(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("export {name}={}\n", shell_quote(value)))
            .collect()
    }
}

impl fmt::Debug for HandoffEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

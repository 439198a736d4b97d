//! Configuration for lbtopo.
//!
//! Two pieces of configuration exist:
//! - [`Credentials`]: the service-principal identity used against the
//!   management API, read once from the environment at startup.
//! - [`Settings`]: knobs for a run (region, name prefix, keep-on-success),
//!   defaulted and overridable from the command line.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding the service-principal client id.
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the service-principal client secret.
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
/// Environment variable holding the directory (tenant) id.
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
/// Environment variable holding the target subscription id.
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";

/// Service-principal credentials for the management API.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Subscription to provision into
    pub subscription_id: String,
}

impl Credentials {
    /// Reads credentials from the standard environment variables.
    ///
    /// All four variables must be present and non-empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: require_env(ENV_CLIENT_ID)?,
            client_secret: require_env(ENV_CLIENT_SECRET)?,
            tenant_id: require_env(ENV_TENANT_ID)?,
            subscription_id: require_env(ENV_SUBSCRIPTION_ID)?,
        })
    }
}

// The secret never goes to logs, even at trace level.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingEnv(name.to_string())),
    }
}

/// Per-run settings for the provisioning workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Region every resource is created in
    pub location: String,

    /// Prefix for generated resource names
    pub prefix: String,

    /// Skip cleanup after a successful run, leaving the topology up for
    /// inspection. Cleanup still runs when provisioning fails.
    pub keep: bool,

    /// Admin username baked into the sample VMs
    pub admin_username: String,

    /// Admin password baked into the sample VMs
    pub admin_password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: "westus".to_string(),
            prefix: "lbtopo".to_string(),
            keep: false,
            admin_username: "lbadmin".to_string(),
            admin_password: "S4mple-Passw0rd".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_all() {
        std::env::set_var(ENV_CLIENT_ID, "client");
        std::env::set_var(ENV_CLIENT_SECRET, "secret");
        std::env::set_var(ENV_TENANT_ID, "tenant");
        std::env::set_var(ENV_SUBSCRIPTION_ID, "subscription");
    }

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        set_all();
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.client_id, "client");
        assert_eq!(creds.subscription_id, "subscription");
    }

    #[test]
    #[serial]
    fn test_credentials_missing_variable() {
        set_all();
        std::env::remove_var(ENV_TENANT_ID);
        let err = Credentials::from_env().unwrap_err();
        assert!(matches!(err, Error::MissingEnv(ref v) if v == ENV_TENANT_ID));
    }

    #[test]
    #[serial]
    fn test_credentials_empty_variable_is_missing() {
        set_all();
        std::env::set_var(ENV_CLIENT_SECRET, "   ");
        assert!(Credentials::from_env().is_err());
    }

    #[test]
    fn test_debug_masks_secret() {
        let creds = Credentials {
            client_id: "id".into(),
            client_secret: "super-secret".into(),
            tenant_id: "t".into(),
            subscription_id: "s".into(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.location, "westus");
        assert_eq!(settings.prefix, "lbtopo");
        assert!(!settings.keep);
    }
}

//! Layered application configuration.

use serde::Deserialize;
use teflu_auth::{AuthConfig, AuthzConfig};
use teflu_db::DbConfig;

/// Optional file read from the working directory.
const CONFIG_FILE: &str = "teflu";
const ENV_PREFIX: &str = "TEFLU";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub authz: AuthzConfig,
}

impl AppConfig {
    /// `teflu.toml` (if present), overridden by `TEFLU__SECTION__KEY`
    /// environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.database.namespace, "teflu");
        assert_eq!(config.auth.session_lifetime_secs, 28_800);
        assert_eq!(config.authz.admin_role_name, "Administrator");
    }

    #[test]
    fn nested_keys_override_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("auth.min_password_length", 10)
            .unwrap()
            .set_override("authz.admin_role_name", "Admin")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.auth.min_password_length, 10);
        assert_eq!(config.authz.admin_role_name, "Admin");
        assert_eq!(config.auth.issuer, "teflu");
    }
}

//! Process configuration — one immutable value built at startup.
//!
//! Everything the authorization layer reads from the environment lands here
//! once, at process start. Guards never touch `std::env` themselves.

use crate::credentials::parse_credentials;
use crate::role::Role;
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable holding the `secret[:role],...` credential list.
pub const ENV_API_KEYS: &str = "STEERCO_API_KEYS";
/// Textual boolean switching authentication off entirely (development only).
pub const ENV_AUTH_ENABLED: &str = "STEERCO_AUTH_ENABLED";
/// Process-wide tenant override, between the header and the default.
pub const ENV_TENANT: &str = "STEERCO_TENANT";
/// Site-wide HTTP Basic pair for scripted tools without per-integration keys.
pub const ENV_SITE_USER: &str = "STEERCO_SITE_USER";
pub const ENV_SITE_PASS: &str = "STEERCO_SITE_PASS";
/// Base connection string for a networked relational store.
pub const ENV_DATABASE_URI: &str = "STEERCO_DATABASE_URI";
/// Directory for local file-backed tenant stores.
pub const ENV_INSTANCE_DIR: &str = "STEERCO_INSTANCE_DIR";
/// Path of the tenant registry file.
pub const ENV_TENANT_REGISTRY: &str = "STEERCO_TENANT_REGISTRY";

/// Immutable process configuration for the authorization layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Parsed secret→role credential map.
    pub credentials: HashMap<String, Role>,
    /// The kill-switch, default on: absent or unparseable means enabled.
    pub auth_enabled: bool,
    /// Process-wide tenant override (normalized lowercase).
    pub tenant_override: Option<String>,
    /// Site-wide Basic pair; the bypass only applies when both are set.
    pub site_user: Option<String>,
    pub site_pass: Option<String>,
    /// Shared base connection string; absent means local file-backed stores.
    pub base_store_uri: Option<String>,
    pub instance_dir: PathBuf,
    pub registry_path: PathBuf,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. `from_env` goes through here;
    /// tests supply a map instead of mutating the process environment.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let credentials = var(ENV_API_KEYS)
            .map(|raw| parse_credentials(&raw))
            .unwrap_or_default();

        let auth_enabled = var(ENV_AUTH_ENABLED)
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(true);

        let tenant_override = var(ENV_TENANT)
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty());

        let instance_dir = var(ENV_INSTANCE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("instance"));

        let registry_path = var(ENV_TENANT_REGISTRY)
            .map(PathBuf::from)
            .unwrap_or_else(|| instance_dir.join("tenants.json"));

        Self {
            credentials,
            auth_enabled,
            tenant_override,
            site_user: var(ENV_SITE_USER).filter(|s| !s.is_empty()),
            site_pass: var(ENV_SITE_PASS).filter(|s| !s.is_empty()),
            base_store_uri: var(ENV_DATABASE_URI).filter(|s| !s.is_empty()),
            instance_dir,
            registry_path,
        }
    }

    /// Both halves of the site-wide Basic pair, when configured.
    pub fn site_basic_pair(&self) -> Option<(&str, &str)> {
        match (self.site_user.as_deref(), self.site_pass.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

/// Parse a textual boolean: true/false, 1/0, yes/no, on/off, case-insensitive.
/// Anything else is `None` so the caller's default applies.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_parse_bool_accepted_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["false", "0", "No", "OFF"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_auth_defaults_to_enabled() {
        let cfg = AppConfig::from_vars(|_| None);
        assert!(cfg.auth_enabled);
        assert!(cfg.credentials.is_empty());

        // Garbage must not silently disable authentication.
        let cfg = AppConfig::from_vars(vars(&[(ENV_AUTH_ENABLED, "whatever")]));
        assert!(cfg.auth_enabled);

        let cfg = AppConfig::from_vars(vars(&[(ENV_AUTH_ENABLED, "off")]));
        assert!(!cfg.auth_enabled);
    }

    #[test]
    fn test_credentials_parsed_from_list() {
        let cfg = AppConfig::from_vars(vars(&[(ENV_API_KEYS, "k1:admin,k2")]));
        assert_eq!(cfg.credentials["k1"], Role::Admin);
        assert_eq!(cfg.credentials["k2"], Role::Viewer);
    }

    #[test]
    fn test_tenant_override_normalized() {
        let cfg = AppConfig::from_vars(vars(&[(ENV_TENANT, "  AcMe ")]));
        assert_eq!(cfg.tenant_override.as_deref(), Some("acme"));

        let cfg = AppConfig::from_vars(vars(&[(ENV_TENANT, "   ")]));
        assert_eq!(cfg.tenant_override, None);
    }

    #[test]
    fn test_site_pair_requires_both_halves() {
        let cfg = AppConfig::from_vars(vars(&[(ENV_SITE_USER, "ops")]));
        assert_eq!(cfg.site_basic_pair(), None);

        let cfg = AppConfig::from_vars(vars(&[(ENV_SITE_USER, "ops"), (ENV_SITE_PASS, "pw")]));
        assert_eq!(cfg.site_basic_pair(), Some(("ops", "pw")));
    }

    #[test]
    fn test_registry_path_follows_instance_dir() {
        let cfg = AppConfig::from_vars(|_| None);
        assert_eq!(cfg.registry_path, PathBuf::from("instance/tenants.json"));

        let cfg = AppConfig::from_vars(vars(&[(ENV_INSTANCE_DIR, "/var/lib/steerco")]));
        assert_eq!(cfg.registry_path, PathBuf::from("/var/lib/steerco/tenants.json"));
    }
}

//! Process configuration, read from `TOPOAUTH_*` environment variables.
//!
//! Invalid values never abort startup: they are logged and replaced by the
//! default.

use core::str::FromStr;
use std::net::SocketAddr;
use std::path::PathBuf;

use topoauth_auth::LATEST_API_PREFIX;

pub const BIND_ADDR_ENV: &str = "TOPOAUTH_BIND_ADDR";
pub const UNMATCHED_POLICY_ENV: &str = "TOPOAUTH_UNMATCHED_POLICY";
pub const BODY_LIMIT_ENV: &str = "TOPOAUTH_BODY_LIMIT";
pub const API_PREFIX_ENV: &str = "TOPOAUTH_API_PREFIX";
pub const SEED_FILE_ENV: &str = "TOPOAUTH_SEED_FILE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// What to do with a request no route recognises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    #[default]
    Deny,
    Allow,
}

impl FromStr for UnmatchedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(Self::Deny),
            "allow" => Ok(Self::Allow),
            other => Err(format!("expected deny or allow, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub unmatched_policy: UnmatchedPolicy,
    /// Largest request body buffered for resolution, in bytes.
    pub body_limit: usize,
    pub api_prefix: String,
    /// Optional JSON seed for the in-memory model store.
    pub seed_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            unmatched_policy: UnmatchedPolicy::Deny,
            body_limit: DEFAULT_BODY_LIMIT,
            api_prefix: LATEST_API_PREFIX.to_string(),
            seed_file: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: parse_or(&var, BIND_ADDR_ENV, defaults.bind_addr, DEFAULT_BIND_ADDR),
            unmatched_policy: parse_or(&var, UNMATCHED_POLICY_ENV, defaults.unmatched_policy, "deny"),
            body_limit: parse_or(&var, BODY_LIMIT_ENV, defaults.body_limit, "4194304"),
            api_prefix: var(API_PREFIX_ENV)
                .map(|p| p.trim().to_string())
                .filter(|p| p.starts_with('/'))
                .unwrap_or(defaults.api_prefix),
            seed_file: var(SEED_FILE_ENV).filter(|p| !p.trim().is_empty()).map(PathBuf::from),
        }
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T, shown: &str) -> T
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let Some(raw) = var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, default = shown, "invalid config value; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_deny_unmatched() {
        let cfg = config(&[]);
        assert_eq!(cfg, ApiConfig::default());
        assert_eq!(cfg.unmatched_policy, UnmatchedPolicy::Deny);
        assert_eq!(cfg.api_prefix, "/api/v3");
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (UNMATCHED_POLICY_ENV, "Allow"),
            (BODY_LIMIT_ENV, "1024"),
            (API_PREFIX_ENV, "/cmdb/v3"),
            (SEED_FILE_ENV, "/etc/topoauth/seed.json"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.unmatched_policy, UnmatchedPolicy::Allow);
        assert_eq!(cfg.body_limit, 1024);
        assert_eq!(cfg.api_prefix, "/cmdb/v3");
        assert_eq!(cfg.seed_file, Some(PathBuf::from("/etc/topoauth/seed.json")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = config(&[
            (BIND_ADDR_ENV, "nowhere"),
            (UNMATCHED_POLICY_ENV, "maybe"),
            (BODY_LIMIT_ENV, "-1"),
            (API_PREFIX_ENV, "api"),
        ]);
        assert_eq!(cfg, ApiConfig::default());
    }
}

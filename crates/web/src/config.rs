use std::env;

use public_transport::placement::{AnchorScope, UnknownAnchorScope};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Postgres,
    /// Nothing survives a restart.
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ANCHOR_SCOPE: {0}")]
    AnchorScope(#[from] UnknownAnchorScope),
}

/// Settings of the web server, read from the environment.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind_address: String,
    pub anchor_scope: AnchorScope,
    pub backend: Backend,
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        let anchor_scope = match lookup("ANCHOR_SCOPE") {
            Some(scope) => scope.parse()?,
            None => AnchorScope::default(),
        };
        let backend = match lookup("DATABASE_BACKEND").as_deref() {
            Some("memory") => Backend::Memory,
            _ => Backend::Postgres,
        };
        Ok(Self {
            bind_address,
            anchor_scope,
            backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        WebConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.anchor_scope, AnchorScope::Route);
        assert_eq!(config.backend, Backend::Postgres);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BIND_ADDRESS", "127.0.0.1:3000"),
            ("ANCHOR_SCOPE", "global"),
            ("DATABASE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.anchor_scope, AnchorScope::Global);
        assert_eq!(config.backend, Backend::Memory);
    }

    #[test]
    fn test_unknown_scope() {
        assert!(config(&[("ANCHOR_SCOPE", "sideways")]).is_err());
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Server configuration from `DOCDESK_*` environment variables.
//!
//! The binary loads `.env` first and lets command-line flags override what is read here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::dispatch::{
    Dispatcher, OperationEnv, OperationLimits, PathPolicy, DEFAULT_MAX_INPUTS,
    DEFAULT_MAX_TEXT_BYTES,
};
use crate::engine::{Engines, WriteDurability, DEFAULT_MAX_EXPORT_BYTES};
use crate::model::{IdentityAccessor, SessionIdentity, StaticIdentity};
use crate::registry::Registries;
use crate::session::{SessionConfig, SessionManager, DEFAULT_EVICTION_INTERVAL, DEFAULT_IDLE_TIMEOUT};

pub const ENV_HTTP_PORT: &str = "DOCDESK_HTTP_PORT";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "DOCDESK_IDLE_TIMEOUT_SECS";
pub const ENV_EVICTION_INTERVAL_SECS: &str = "DOCDESK_EVICTION_INTERVAL_SECS";
pub const ENV_SAVE_ON_EVICT: &str = "DOCDESK_SAVE_ON_EVICT";
pub const ENV_MAX_SESSIONS: &str = "DOCDESK_MAX_SESSIONS";
pub const ENV_WORKSPACE: &str = "DOCDESK_WORKSPACE";
pub const ENV_IDENTITY: &str = "DOCDESK_IDENTITY";
pub const ENV_IDENTITY_HEADER: &str = "DOCDESK_IDENTITY_HEADER";
pub const ENV_DURABLE_WRITES: &str = "DOCDESK_DURABLE_WRITES";
pub const ENV_MAX_INPUTS: &str = "DOCDESK_MAX_INPUTS";
pub const ENV_MAX_TEXT_BYTES: &str = "DOCDESK_MAX_TEXT_BYTES";
pub const ENV_MAX_EXPORT_BYTES: &str = "DOCDESK_MAX_EXPORT_BYTES";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Serve streamable HTTP on this port instead of stdio.
    pub http_port: Option<u16>,
    pub idle_timeout: Duration,
    pub eviction_interval: Duration,
    pub save_on_evict: bool,
    pub max_sessions: Option<usize>,
    pub workspace: Option<PathBuf>,
    /// Principal for calls whose transport names no caller (stdio); unset means anonymous.
    pub identity: Option<String>,
    /// HTTP header a trusted proxy sets to the caller's principal.
    pub identity_header: Option<String>,
    pub durable_writes: bool,
    pub max_inputs: usize,
    pub max_text_bytes: usize,
    /// Largest txt/md/csv file a save or convert may write.
    pub max_export_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
            save_on_evict: false,
            max_sessions: None,
            workspace: None,
            identity: None,
            identity_header: None,
            durable_writes: false,
            max_inputs: DEFAULT_MAX_INPUTS,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            max_export_bytes: DEFAULT_MAX_EXPORT_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads every setting through `lookup`; unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            http_port: get(ENV_HTTP_PORT).map(|v| parse_number(ENV_HTTP_PORT, &v)).transpose()?,
            idle_timeout: get(ENV_IDLE_TIMEOUT_SECS)
                .map(|v| parse_number(ENV_IDLE_TIMEOUT_SECS, &v).map(Duration::from_secs))
                .transpose()?
                .unwrap_or(defaults.idle_timeout),
            eviction_interval: get(ENV_EVICTION_INTERVAL_SECS)
                .map(|v| parse_positive_secs(ENV_EVICTION_INTERVAL_SECS, &v))
                .transpose()?
                .unwrap_or(defaults.eviction_interval),
            save_on_evict: get(ENV_SAVE_ON_EVICT)
                .map(|v| parse_flag(ENV_SAVE_ON_EVICT, &v))
                .transpose()?
                .unwrap_or(defaults.save_on_evict),
            max_sessions: get(ENV_MAX_SESSIONS)
                .map(|v| parse_number::<usize>(ENV_MAX_SESSIONS, &v))
                .transpose()?
                .filter(|limit| *limit > 0),
            workspace: get(ENV_WORKSPACE).map(|v| PathBuf::from(v.trim())),
            identity: get(ENV_IDENTITY).map(|v| v.trim().to_owned()),
            identity_header: get(ENV_IDENTITY_HEADER).map(|v| v.trim().to_ascii_lowercase()),
            durable_writes: get(ENV_DURABLE_WRITES)
                .map(|v| parse_flag(ENV_DURABLE_WRITES, &v))
                .transpose()?
                .unwrap_or(defaults.durable_writes),
            max_inputs: get(ENV_MAX_INPUTS)
                .map(|v| parse_number(ENV_MAX_INPUTS, &v))
                .transpose()?
                .unwrap_or(defaults.max_inputs),
            max_text_bytes: get(ENV_MAX_TEXT_BYTES)
                .map(|v| parse_number(ENV_MAX_TEXT_BYTES, &v))
                .transpose()?
                .unwrap_or(defaults.max_text_bytes),
            max_export_bytes: get(ENV_MAX_EXPORT_BYTES)
                .map(|v| parse_number(ENV_MAX_EXPORT_BYTES, &v))
                .transpose()?
                .unwrap_or(defaults.max_export_bytes),
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            idle_timeout: self.idle_timeout,
            eviction_interval: self.eviction_interval,
            save_on_evict: self.save_on_evict,
            max_sessions: self.max_sessions,
        }
    }

    pub fn operation_env(&self) -> OperationEnv {
        OperationEnv {
            limits: OperationLimits {
                max_inputs: self.max_inputs,
                max_text_bytes: self.max_text_bytes,
            },
            paths: self
                .workspace
                .clone()
                .map(PathPolicy::rooted)
                .unwrap_or_default(),
        }
    }

    pub fn engines(&self) -> Engines {
        let durability = if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        Engines::reference(durability, self.max_export_bytes)
    }

    pub fn identity_accessor(&self) -> Option<Arc<dyn IdentityAccessor>> {
        let identity = SessionIdentity::principal(self.identity.clone()?);
        if identity.is_anonymous() {
            return None;
        }
        Some(Arc::new(StaticIdentity::new(identity)))
    }

    /// Wires registries, sessions and the operation environment together.
    pub fn dispatcher(&self) -> Dispatcher {
        let sessions = SessionManager::new(self.engines(), self.session_config());
        Dispatcher::with_env(
            Arc::new(Registries::builtin()),
            Arc::new(sessions),
            self.operation_env(),
        )
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_owned(),
        reason: "expected a non-negative integer",
    })
}

fn parse_positive_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match parse_number::<u64>(var, value)? {
        0 => Err(ConfigError::Invalid {
            var,
            value: value.to_owned(),
            reason: "must be at least 1 second",
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_owned(),
            reason: "expected true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use rstest::rstest;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(config_from(&[]).expect("config"), Config::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            (ENV_HTTP_PORT, "8080"),
            (ENV_IDLE_TIMEOUT_SECS, "0"),
            (ENV_EVICTION_INTERVAL_SECS, "5"),
            (ENV_SAVE_ON_EVICT, "yes"),
            (ENV_MAX_SESSIONS, "10"),
            (ENV_WORKSPACE, " /srv/docs "),
            (ENV_IDENTITY, "alice"),
            (ENV_IDENTITY_HEADER, "X-Forwarded-User"),
            (ENV_DURABLE_WRITES, "TRUE"),
            (ENV_MAX_INPUTS, "4"),
            (ENV_MAX_TEXT_BYTES, "2048"),
            (ENV_MAX_EXPORT_BYTES, "4096"),
        ])
        .expect("config");

        assert_eq!(config.http_port, Some(8080));
        assert_eq!(config.idle_timeout, Duration::ZERO);
        assert_eq!(config.eviction_interval, Duration::from_secs(5));
        assert!(config.save_on_evict && config.durable_writes);
        assert_eq!(config.max_sessions, Some(10));
        assert_eq!(config.workspace, Some(PathBuf::from("/srv/docs")));
        assert_eq!(config.operation_env().limits.max_inputs, 4);
        assert_eq!(config.max_export_bytes, 4096);
        assert_eq!(config.identity_header.as_deref(), Some("x-forwarded-user"));
        assert_eq!(config.operation_env().paths.root(), Some(std::path::Path::new("/srv/docs")));
        assert_eq!(
            config.identity_accessor().map(|accessor| accessor.current_identity()),
            Some(SessionIdentity::principal("alice"))
        );
    }

    #[rstest]
    #[case(ENV_HTTP_PORT, "99999")]
    #[case(ENV_IDLE_TIMEOUT_SECS, "-1")]
    #[case(ENV_EVICTION_INTERVAL_SECS, "0")]
    #[case(ENV_SAVE_ON_EVICT, "maybe")]
    #[case(ENV_MAX_TEXT_BYTES, "lots")]
    fn rejects_malformed_values(#[case] var: &'static str, #[case] value: &str) {
        let err = config_from(&[(var, value)]).unwrap_err();
        let ConfigError::Invalid { var: reported, .. } = err;
        assert_eq!(reported, var);
    }

    #[test]
    fn zero_session_limit_means_unlimited_and_blank_identity_is_anonymous() {
        let config = config_from(&[(ENV_MAX_SESSIONS, "0"), (ENV_IDENTITY, "   ")]).expect("config");
        assert_eq!(config.max_sessions, None);
        assert!(config.identity_accessor().is_none());
    }
}

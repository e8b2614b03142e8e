use std::time::Duration;
use thiserror::Error;

use crate::enrollment::ReenrollmentPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// How bearer tokens are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Jwks { url: String, api_key: Option<String> },
    SharedSecret(String),
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay_url: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub reenrollment: ReenrollmentPolicy,
    pub course_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let auth = match (var("JWKS_URL"), var("JWT_SECRET")) {
            (Some(url), _) => AuthConfig::Jwks {
                url,
                api_key: var("JWKS_API_KEY"),
            },
            (None, Some(secret)) => AuthConfig::SharedSecret(secret),
            (None, None) => return Err(ConfigError::Missing("JWKS_URL or JWT_SECRET")),
        };

        let reenrollment = match var("REENROLLMENT_POLICY") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "REENROLLMENT_POLICY",
                value: raw,
            })?,
            None => ReenrollmentPolicy::default(),
        };

        let course_cache_ttl = parse_duration_secs(var("CACHE_TTL_COURSES"), 300);

        Ok(Self {
            database_url,
            port,
            redis_url: var("REDIS_URL"),
            auth,
            mail: MailConfig {
                relay_url: var("MAIL_RELAY_URL"),
                from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@lingua.school".to_string()),
            },
            reenrollment,
            course_cache_ttl,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_duration_secs(raw: Option<String>, default: u64) -> Duration {
    raw.and_then(|v| v.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = config(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.auth, AuthConfig::SharedSecret("s".to_string()));
        assert_eq!(cfg.reenrollment, ReenrollmentPolicy::OncePerCourse);
        assert_eq!(cfg.course_cache_ttl, Duration::from_secs(300));
        assert!(cfg.redis_url.is_none());
        assert!(cfg.mail.relay_url.is_none());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn jwks_wins_over_shared_secret() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWKS_URL", "https://id.example.com/jwks.json"),
            ("JWKS_API_KEY", "k"),
            ("JWT_SECRET", "s"),
        ])
        .unwrap();
        assert_eq!(
            cfg.auth,
            AuthConfig::Jwks {
                url: "https://id.example.com/jwks.json".to_string(),
                api_key: Some("k".to_string()),
            }
        );
    }

    #[test]
    fn missing_database_url() {
        let err = config(&[("JWT_SECRET", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn missing_token_validator() {
        let err = config(&[("DATABASE_URL", "postgres://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn invalid_port_and_policy() {
        let err = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("REENROLLMENT_POLICY", "sometimes"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REENROLLMENT_POLICY", .. }));
    }

    #[test]
    fn reenrollment_policy_and_ttl_are_read() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("REENROLLMENT_POLICY", "allow_after_terminal"),
            ("CACHE_TTL_COURSES", "60"),
        ])
        .unwrap();
        assert_eq!(cfg.reenrollment, ReenrollmentPolicy::AllowAfterTerminal);
        assert_eq!(cfg.course_cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn unparsable_ttl_falls_back() {
        assert_eq!(
            parse_duration_secs(Some("soon".to_string()), 42),
            Duration::from_secs(42)
        );
    }
}

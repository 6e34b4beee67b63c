use crate::error::{ClaimError, ClaimResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> ClaimResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Reads settings through `get` so tests can supply values without
    /// touching the process environment.
    pub fn from_env_with<F>(mut get: F) -> ClaimResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                ClaimError::Config("DATABASE_URL must be set to a Postgres instance".into())
            })?;

        let max_connections = match get("CLAIM_COMPASS_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ClaimError::Config(format!(
                    "CLAIM_COMPASS_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let log_filter = get("CLAIM_COMPASS_LOG")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            database_url,
            max_connections,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_an_error() {
        let res = Config::from_env_with(|_| None);
        assert!(matches!(res, Err(ClaimError::Config(_))));
    }

    #[test]
    fn defaults_apply_when_optional_values_absent() {
        let cfg = Config::from_env_with(|k| match k {
            "DATABASE_URL" => Some("postgres://localhost/claims".into()),
            _ => None,
        })
        .expect("cfg");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn log_filter_prefers_crate_variable_over_rust_log() {
        let cfg = Config::from_env_with(|k| match k {
            "DATABASE_URL" => Some("postgres://localhost/claims".into()),
            "CLAIM_COMPASS_LOG" => Some("debug".into()),
            "RUST_LOG" => Some("warn".into()),
            "CLAIM_COMPASS_MAX_CONNECTIONS" => Some("12".into()),
            _ => None,
        })
        .expect("cfg");
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.max_connections, 12);
    }

    #[test]
    fn rejects_zero_connections() {
        let res = Config::from_env_with(|k| match k {
            "DATABASE_URL" => Some("postgres://localhost/claims".into()),
            "CLAIM_COMPASS_MAX_CONNECTIONS" => Some("0".into()),
            _ => None,
        });
        assert!(res.is_err());
    }
}

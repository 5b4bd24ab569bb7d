use crate::models::kaizen::AwardPolicy;

/// Application configuration loaded from environment variables
/// (after `dotenvy` has merged any `.env` file).
///
/// | Env Var               | Default            |
/// |-----------------------|--------------------|
/// | `DATABASE_URL`        | required           |
/// | `BIND_ADDR`           | `127.0.0.1:8080`   |
/// | `SESSION_KEY`         | random per process |
/// | `APP_NAME`            | `Kaizen Tracker`   |
/// | `KAIZEN_AWARD_POLICY` | `unrestricted`     |
/// | `ADMIN_PASSWORD`      | `admin123`         |
/// | `DB_MAX_CONNECTIONS`  | `8`                |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub app_name: String,
    pub award_policy: AwardPolicy,
    pub admin_password: String,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let session_key = lookup("SESSION_KEY").filter(|v| !v.is_empty());
        let app_name = lookup("APP_NAME").unwrap_or_else(|| "Kaizen Tracker".to_string());

        let award_policy = match lookup("KAIZEN_AWARD_POLICY") {
            Some(raw) => raw.parse::<AwardPolicy>()?,
            None => AwardPolicy::default(),
        };

        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_else(|| "admin123".to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"))?,
            None => 8,
        };

        Ok(Self {
            database_url,
            bind_addr,
            session_key,
            app_name,
            award_policy,
            admin_password,
            db_max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/kaizen")]))
            .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.app_name, "Kaizen Tracker");
        assert_eq!(cfg.award_policy, AwardPolicy::Unrestricted);
        assert_eq!(cfg.db_max_connections, 8);
        assert!(cfg.session_key.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn award_policy_is_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kaizen"),
            ("KAIZEN_AWARD_POLICY", "require-approval"),
        ]))
        .unwrap();
        assert_eq!(cfg.award_policy, AwardPolicy::RequireApproval);
    }

    #[test]
    fn bad_values_fail_fast() {
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kaizen"),
            ("KAIZEN_AWARD_POLICY", "whenever"),
        ]))
        .is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kaizen"),
            ("DB_MAX_CONNECTIONS", "0"),
        ]))
        .is_err());
    }
}

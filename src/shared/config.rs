use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_start: bool,
    pub resubscribe_delay_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_start: true,
                resubscribe_delay_secs: 5,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TRIPMATE_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("TRIPMATE_DB_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("TRIPMATE_DB_CONNECTION_TIMEOUT") {
            if let Some(value) = parse_u64(&v) {
                cfg.database.connection_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("TRIPMATE_SYNC_AUTO_START") {
            cfg.sync.auto_start = parse_bool(&v, cfg.sync.auto_start);
        }
        if let Ok(v) = std::env::var("TRIPMATE_SYNC_RESUBSCRIBE_DELAY") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.resubscribe_delay_secs = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.resubscribe_delay_secs == 0 {
            return Err("Sync resubscribe_delay_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    match dirs::data_dir() {
        Some(dir) => {
            let path = dir.join("tripmate").join("tripmate.db");
            format!("sqlite://{}?mode=rwc", path.display())
        }
        None => "sqlite://data/tripmate.db?mode=rwc".to_string(),
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_connections() {
        let mut cfg = AppConfig::default();
        cfg.database.max_connections = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_bool_accepts_common_forms() {
        assert!(parse_bool("1", false));
        assert!(parse_bool("Yes", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("garbage", true));
    }
}

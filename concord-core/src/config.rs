use std::env;

/// Load .env file if it exists (called automatically when using `from_env`)
pub fn load_dotenv() {
    // Silently ignore errors (file might not exist)
    let _ = dotenvy::dotenv();
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_bot_token: String,
    /// Optional override for the SQLite database file path
    pub db_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function automatically loads a .env file from the project root if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from env without loading .env
    fn from_env_inner() -> Result<Self, ConfigError> {
        let discord_bot_token = env::var("DISCORD_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DISCORD_BOT_TOKEN".to_string()))?;

        Ok(Self {
            discord_bot_token,
            db_path: env::var("CONCORD_DB_PATH").ok().filter(|p| !p.is_empty()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::remove_var("DISCORD_BOT_TOKEN");
            env::remove_var("CONCORD_DB_PATH");

            env::set_var("DISCORD_BOT_TOKEN", "test-token");
        }

        let config = Config::from_env_inner().unwrap();

        assert_eq!(config.discord_bot_token, "test-token");
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_config_custom_db_path() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::set_var("DISCORD_BOT_TOKEN", "test-token");
            env::set_var("CONCORD_DB_PATH", "/tmp/concord-test.sqlite3");
        }

        let config = Config::from_env_inner().unwrap();

        assert_eq!(config.db_path.as_deref(), Some("/tmp/concord-test.sqlite3"));

        unsafe {
            env::remove_var("CONCORD_DB_PATH");
        }
    }

    #[test]
    fn test_config_missing_token() {
        let _guard = ENV_MUTEX.lock().unwrap();
        unsafe {
            env::remove_var("DISCORD_BOT_TOKEN");
        }

        let result = Config::from_env_inner();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("DISCORD_BOT_TOKEN"));
    }
}

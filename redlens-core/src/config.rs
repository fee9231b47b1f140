use std::env;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Credentials for Reddit's application-only OAuth flow.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Process-wide configuration, resolved once at startup and immutable after.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub openai_api_key: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            reddit: RedditCredentials {
                client_id: require_env("REDDIT_CLIENT_ID")?,
                client_secret: require_env("REDDIT_CLIENT_SECRET")?,
                user_agent: require_env("REDDIT_USER_AGENT")?,
            },
            openai_api_key: require_env("OPENAI_API_KEY")?,
            host: env::var("REDLENS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: match env::var("REDLENS_PORT") {
                Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "REDLENS_PORT".to_string(),
                    value,
                })?,
                Err(_) => DEFAULT_PORT,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// An unset or blank variable is treated as missing.
fn require_env(var_name: &str) -> Result<String, ConfigError> {
    match env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = AppConfig {
            reddit: RedditCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                user_agent: "redlens-test/0.1".to_string(),
            },
            openai_api_key: "sk-test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }
}

use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Reddit(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Reddit(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Serialization(_) => {
                "Failed to process response data. Please try again later.".to_string()
            }
            CoreError::InvalidInput { message } => message.clone(),
            CoreError::Internal { .. } => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Reddit(e) => e.error_code(),
            CoreError::Llm(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditError {
    fn log_error(&self) -> &Self {
        error!("RedditError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditError::AuthenticationFailed { .. } | RedditError::InvalidToken => {
                "Error fetching data from Reddit: authentication failed. Please check the Reddit API credentials."
                    .to_string()
            }
            RedditError::RateLimitExceeded { retry_after } => format!(
                "Error fetching data from Reddit: too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditError::RequestTimeout => {
                "Error fetching data from Reddit: the request timed out. Please try again."
                    .to_string()
            }
            _ => format!("Error fetching data from Reddit: {}", self),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditError::UserUnavailable { .. } => "REDDIT_USER_UNAVAILABLE".to_string(),
            RedditError::EmptyHistory { .. } => "REDDIT_EMPTY_HISTORY".to_string(),
            RedditError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditError::Network { .. } => "REDDIT_NETWORK_ERROR".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            // The raw status and body are what callers need to diagnose upstream failures.
            LlmError::ApiError { .. } => self.to_string(),
            LlmError::AuthenticationFailed { provider } => format!(
                "Error generating summary: authentication failed for {}. Please check the API key.",
                provider
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            } => format!(
                "Error generating summary: rate limit exceeded for {}. Please wait {} seconds.",
                provider, retry_after
            ),
            _ => format!("Error generating summary: {}", self),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { .. } => "LLM_AUTH_FAILED".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ApiError { .. } => "LLM_API_ERROR".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
            LlmError::Network { .. } => "LLM_NETWORK_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
        }
    }
}

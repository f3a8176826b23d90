use std::{env, time::Duration};

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 30;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub min_questions: usize,
    pub max_questions: usize,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    /// Idle sessions older than this are dropped; `0` keeps them forever.
    pub session_ttl_secs: u64,
}

impl Config {
    /// Reads configuration from the environment. The API key is the only
    /// required value; `GOOGLE_API_KEY` wins over `QUIZ_API_KEY`.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var("GOOGLE_API_KEY")
            .or_else(|_| env::var("QUIZ_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(
                    "GOOGLE_API_KEY (or QUIZ_API_KEY) must be set".to_string(),
                )
            })?;

        let config = Self {
            api_key: SecretString::from(api_key),
            api_base: env::var("QUIZ_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            model: env::var("QUIZ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: parse_env("QUIZ_TEMPERATURE", 0.7),
            max_tokens: parse_env("QUIZ_MAX_TOKENS", 8192),
            request_timeout_secs: parse_env("QUIZ_REQUEST_TIMEOUT_SECS", 60),
            max_attempts: parse_env("QUIZ_MAX_ATTEMPTS", 2),
            min_questions: parse_env("QUIZ_MIN_QUESTIONS", MIN_QUESTIONS),
            max_questions: parse_env("QUIZ_MAX_QUESTIONS", MAX_QUESTIONS),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: parse_env("WEB_SERVER_PORT", 8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            session_ttl_secs: parse_env("QUIZ_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.min_questions == 0 || self.min_questions > self.max_questions {
            return Err(AppError::Configuration(format!(
                "question bounds are inconsistent: min {} max {}",
                self.min_questions, self.max_questions
            )));
        }
        if self.max_attempts == 0 {
            return Err(AppError::Configuration(
                "QUIZ_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Configuration(format!(
                "QUIZ_TEMPERATURE must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_key: SecretString::from("test_api_key".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            request_timeout_secs: 1,
            max_attempts: 2,
            min_questions: MIN_QUESTIONS,
            max_questions: MAX_QUESTIONS,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Upper bound for `LLM_MAX_RETRIES`.
pub const MAX_LLM_RETRIES: u32 = 10;

/// Which outline generator the orchestrator is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineStrategy {
    Llm,
    Fixture,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub openai_api_key: String,
    pub openai_model: String,
    pub llm_timeout: Duration,
    /// Whole-call retries after the first attempt.
    pub llm_max_retries: u32,
    pub outline_strategy: OutlineStrategy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            llm_max_retries: parse_llm_max_retries(parse_env("LLM_MAX_RETRIES", 2)?)?,
            outline_strategy: parse_outline_strategy(
                &std::env::var("OUTLINE_STRATEGY").unwrap_or_else(|_| "llm".to_string()),
            )?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_llm_max_retries(retries: u32) -> Result<u32> {
    if retries > MAX_LLM_RETRIES {
        bail!("LLM_MAX_RETRIES must be at most {MAX_LLM_RETRIES}, got {retries}");
    }
    Ok(retries)
}

fn parse_outline_strategy(raw: &str) -> Result<OutlineStrategy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "llm" => Ok(OutlineStrategy::Llm),
        "fixture" => Ok(OutlineStrategy::Fixture),
        other => bail!("OUTLINE_STRATEGY must be 'llm' or 'fixture', got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_strategy_is_case_insensitive() {
        assert_eq!(parse_outline_strategy("LLM").unwrap(), OutlineStrategy::Llm);
        assert_eq!(
            parse_outline_strategy(" fixture ").unwrap(),
            OutlineStrategy::Fixture
        );
    }

    #[test]
    fn test_unknown_outline_strategy_is_rejected() {
        assert!(parse_outline_strategy("markov").is_err());
    }

    #[test]
    fn test_llm_max_retries_is_capped() {
        assert_eq!(parse_llm_max_retries(0).unwrap(), 0);
        assert_eq!(parse_llm_max_retries(MAX_LLM_RETRIES).unwrap(), MAX_LLM_RETRIES);
        assert!(parse_llm_max_retries(33).is_err());
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u32 = parse_env("GROUCHO_TEST_SURELY_UNSET_VAR", 2).unwrap();
        assert_eq!(value, 2);
    }
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Absent → narratives come from the template generator only.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub narrative_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            narrative_timeout_secs: parse_env("NARRATIVE_TIMEOUT_SECS", 60)
                .context("NARRATIVE_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keys are unique to each test so parallel tests do not race on the environment.

    #[test]
    fn test_parse_env_default_when_unset() {
        let v: u64 = parse_env("TEAMFIT_TEST_UNSET_KEY", 60).unwrap();
        assert_eq!(v, 60);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("TEAMFIT_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("TEAMFIT_TEST_BAD_PORT", 8080).is_err());
    }

    #[test]
    fn test_optional_env_treats_blank_as_missing() {
        std::env::set_var("TEAMFIT_TEST_BLANK_KEY", "  ");
        assert!(optional_env("TEAMFIT_TEST_BLANK_KEY").is_none());
    }
}

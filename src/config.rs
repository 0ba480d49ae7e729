use crate::middleware::auth::{TokenRegistry, UserRole};
use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Stats backend (owns aggregation and storage)
    pub stats_backend_url: String,
    pub stats_backend_timeout: Duration,

    // Bearer tokens accepted by the API
    pub tokens: TokenRegistry,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            stats_backend_url: std::env::var("STATS_BACKEND_URL")
                .context("STATS_BACKEND_URL required")?,
            stats_backend_timeout: Duration::from_secs(
                std::env::var("STATS_BACKEND_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid STATS_BACKEND_TIMEOUT_SECS")?,
            ),

            tokens: Self::parse_tokens(&std::env::var("API_TOKENS").unwrap_or_default())?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    /// Parses `token=userId:username:role` entries separated by commas.
    pub fn parse_tokens(raw: &str) -> Result<TokenRegistry> {
        let mut registry = TokenRegistry::default();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, identity) = entry
                .split_once('=')
                .with_context(|| format!("API_TOKENS entry missing '=': {}", entry))?;

            let mut parts = identity.splitn(3, ':');
            let (Some(user_id), Some(username), Some(role)) =
                (parts.next(), parts.next(), parts.next())
            else {
                bail!("API_TOKENS entry must be token=userId:username:role");
            };

            let user_id: i64 = user_id
                .parse()
                .with_context(|| format!("Invalid user id in API_TOKENS: {}", user_id))?;
            let role: UserRole = role.parse().map_err(anyhow::Error::msg)?;

            if token.is_empty() || username.is_empty() {
                bail!("API_TOKENS entry has an empty token or username");
            }

            registry.insert(token, user_id, username, role);
        }

        Ok(registry)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if !self.stats_backend_url.starts_with("http") {
            bail!("STATS_BACKEND_URL must be HTTP(S) URL");
        }

        if self.stats_backend_timeout.is_zero() {
            bail!("STATS_BACKEND_TIMEOUT_SECS must be positive");
        }

        if self.tokens.is_empty() {
            tracing::warn!("API_TOKENS is empty, every stats request will be rejected");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_entries() {
        let registry =
            Config::parse_tokens("abc=7:alice:user, def=1:root:administrator").unwrap();

        let alice = registry.lookup("abc").unwrap();
        assert_eq!(alice.id, 7);
        assert_eq!(alice.username, "alice");
        assert_eq!(alice.role, UserRole::User);

        assert_eq!(registry.lookup("def").unwrap().role, UserRole::Administrator);
        assert!(registry.lookup("ghi").is_none());
    }

    #[test]
    fn empty_token_list_is_allowed() {
        assert!(Config::parse_tokens("").unwrap().is_empty());
        assert!(Config::parse_tokens(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_token_entries() {
        assert!(Config::parse_tokens("abc").is_err());
        assert!(Config::parse_tokens("abc=7:alice").is_err());
        assert!(Config::parse_tokens("abc=x:alice:user").is_err());
        assert!(Config::parse_tokens("abc=7:alice:superuser").is_err());
        assert!(Config::parse_tokens("=7:alice:user").is_err());
    }
}

//! Bearer token authentication.

use crate::{error::StatsError, AppState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Administrator,
    Moderator,
    User,
}

impl UserRole {
    /// Whether the role may read stats of videos it does not own.
    pub fn can_see_all_videos(&self) -> bool {
        matches!(self, UserRole::Administrator | UserRole::Moderator)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" | "admin" => Ok(UserRole::Administrator),
            "moderator" => Ok(UserRole::Moderator),
            "user" => Ok(UserRole::User),
            _ => Err(format!("Unknown user role: {}", s)),
        }
    }
}

/// Identity attached to a request once its bearer token checks out.
///
/// Use as an extractor in handlers that require authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

/// Static table of accepted bearer tokens.
#[derive(Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl TokenRegistry {
    pub fn insert(&mut self, token: &str, id: i64, username: &str, role: UserRole) {
        self.tokens.insert(
            token.to_string(),
            AuthenticatedUser {
                id,
                username: username.to_string(),
                role,
            },
        );
    }

    pub fn lookup(&self, token: &str) -> Option<&AuthenticatedUser> {
        self.tokens.get(token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// Tokens stay out of logs.
impl fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = StatsError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(StatsError::Unauthorized)?;

        let user = state
            .tokens
            .lookup(token)
            .cloned()
            .ok_or(StatsError::Unauthorized)?;

        tracing::debug!("Authenticated user {} ({})", user.username, user.id);

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_staff_roles_see_all_videos() {
        assert!(UserRole::Administrator.can_see_all_videos());
        assert!(UserRole::Moderator.can_see_all_videos());
        assert!(!UserRole::User.can_see_all_videos());
    }

    #[test]
    fn debug_output_hides_tokens() {
        let mut registry = TokenRegistry::default();
        registry.insert("s3cret", 1, "root", UserRole::Administrator);

        let printed = format!("{:?}", registry);
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains('1'));
    }
}

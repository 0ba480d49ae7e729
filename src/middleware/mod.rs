pub mod auth;
pub mod validation;

pub use auth::{AuthenticatedUser, TokenRegistry, UserRole};

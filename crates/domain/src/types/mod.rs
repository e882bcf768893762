//! Domain types and models

pub mod identity;
pub mod token;

pub use identity::{LinkOutcome, OAuthProvider, OAuthUserInfo, ProviderTokens};
pub use token::{TokenClaims, TokenPair, TokenType};

//! Domain constants
//!
//! Default lifetimes and the well-known endpoints of the supported identity
//! providers.

// Token lifetimes
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_TOKEN_ISSUER: &str = "keygate";
pub const DEFAULT_TOKEN_AUDIENCE: &str = "keygate-api";
/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
pub const DEFAULT_SIGNING_KEY_ID: &str = "keygate-rs256";
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// OAuth flow
pub const DEFAULT_STATE_TTL_SECS: u64 = 10 * 60;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

// Google
pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const GOOGLE_DEFAULT_SCOPES: &[&str] = &["openid", "email", "profile"];

// Apple
pub const APPLE_AUTHORIZE_URL: &str = "https://appleid.apple.com/auth/authorize";
pub const APPLE_TOKEN_URL: &str = "https://appleid.apple.com/auth/token";
pub const APPLE_JWKS_URL: &str = "https://appleid.apple.com/auth/keys";
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";
pub const APPLE_DEFAULT_SCOPES: &[&str] = &["name", "email"];

use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use keygate_domain::{AuthError, OAuthProvider};
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Transport-level failure talking to a remote endpoint.
///
/// Carries no provider, so callers attach one with
/// [`HttpError::for_provider`] once they know who they were talking to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unreadable response body: {0}")]
    Body(String),

    #[error("request could not be built: {0}")]
    Builder(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl HttpError {
    /// Provider outage for `provider`.
    pub fn for_provider(self, provider: OAuthProvider) -> AuthError {
        AuthError::provider_unavailable(provider, self)
    }
}

impl From<ReqwestError> for HttpError {
    fn from(err: ReqwestError) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::Connect(err.to_string());
        }

        if err.is_decode() || err.is_body() {
            return Self::Body(err.to_string());
        }

        if err.is_builder() {
            return Self::Builder(err.to_string());
        }

        Self::Request(err.to_string())
    }
}

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AuthError);

impl From<InfraError> for AuthError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AuthError> for InfraError {
    fn from(value: AuthError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAuthError {
    fn into_auth_error(self) -> AuthError;
}

/* -------------------------------------------------------------------------- */
/* jsonwebtoken::Error → AuthError (provider ID tokens) */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for JwtError {
    fn into_auth_error(self) -> AuthError {
        let reason = match self.kind() {
            JwtErrorKind::InvalidSignature => "signature does not verify".to_string(),
            JwtErrorKind::ExpiredSignature => "id_token expired".to_string(),
            JwtErrorKind::ImmatureSignature => "id_token not yet valid".to_string(),
            JwtErrorKind::InvalidIssuer => "unexpected issuer".to_string(),
            JwtErrorKind::InvalidAudience => "unexpected audience".to_string(),
            JwtErrorKind::MissingRequiredClaim(claim) => format!("missing claim `{claim}`"),
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                "unsupported algorithm".to_string()
            }
            JwtErrorKind::InvalidRsaKey(_) | JwtErrorKind::InvalidKeyFormat => {
                "unusable verification key".to_string()
            }
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => "malformed id_token".to_string(),
            other => format!("id_token rejected: {other:?}"),
        };
        AuthError::InvalidProviderToken(reason)
    }
}

impl From<JwtError> for InfraError {
    fn from(value: JwtError) -> Self {
        InfraError(value.into_auth_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Configuration parsing → AuthError::Config */
/* -------------------------------------------------------------------------- */

impl IntoAuthError for toml::de::Error {
    fn into_auth_error(self) -> AuthError {
        AuthError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_auth_error())
    }
}

impl IntoAuthError for url::ParseError {
    fn into_auth_error(self) -> AuthError {
        AuthError::Config(format!("Invalid URL: {self}"))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(value.into_auth_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

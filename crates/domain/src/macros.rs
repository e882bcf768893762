//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Tokens and OAuth requests carry small enums as lowercase strings
//! (`"google"`, `"refresh"`). This macro provides both conversions from one
//! mapping, with case-insensitive parsing and a caller-chosen error
//! constructor.
//!
//! # Example
//!
//! ```rust
//! use keygate_domain::{impl_wire_name_conversions, AuthError};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Grant {
//!     Code,
//!     Refresh,
//! }
//!
//! impl_wire_name_conversions!(Grant, AuthError::InvalidToken {
//!     Code => "code",
//!     Refresh => "refresh",
//! });
//!
//! assert_eq!("REFRESH".parse::<Grant>().ok(), Some(Grant::Refresh));
//! ```

/// Implements Display and FromStr for enums with a fixed wire name per
/// variant.
///
/// The `FromStr::Err` type is `$crate::AuthError`; an unknown name yields
/// `$err(input)`.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident, $err:path { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Wire name of this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::AuthError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($err(s.to_string())),
                }
            }
        }
    };
}

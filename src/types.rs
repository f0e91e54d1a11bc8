//! NewType wrappers for strong typing throughout the service.
//!
//! These keep token subjects and granted authorities from being mixed up with
//! arbitrary strings (e.g. passing a raw header value where a verified
//! subject is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_string!(
    /// Subject claim carried by a verified bearer token.
    ///
    /// Sign-in issues tokens whose subject is the student number rendered as
    /// a decimal string, but the gate treats it as opaque.
    Subject
);

newtype_string!(
    /// A granted authority (role) attached to an authenticated request.
    ///
    /// The service has no role model yet, so authenticated contexts always
    /// carry an empty authority set.
    Authority
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_roundtrip_accessors() {
        let subject = Subject::new("42");
        assert_eq!(subject.as_str(), "42");
        assert_eq!(subject.to_string(), "42");
        assert_eq!(subject.clone().into_inner(), "42".to_string());
        assert_eq!(Subject::from("42"), subject);
    }

    #[test]
    fn test_subject_serializes_transparently() {
        let json = serde_json::to_string(&Subject::new("kim")).unwrap();
        assert_eq!(json, "\"kim\"");
    }
}

//! Identifiers for conversations, sessions and stored resources.
//!
//! Session ids are ULIDs, giving uniqueness and temporal ordering.
//! Chat and resource ids are strings that name files on disk, so they are
//! validated never to escape the directory they live in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Returns the reason a string cannot be used as a single path component.
pub(crate) fn path_component_violation(s: &str) -> Option<&'static str> {
    if s.is_empty() {
        Some("must not be empty")
    } else if s.contains(['/', '\\', '\0']) {
        Some("must not contain path separators")
    } else if s.starts_with('.') {
        Some("must not start with a dot")
    } else {
        None
    }
}

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Creates a new ID with a randomly generated ULID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string().to_lowercase())
    }
}

impl FromStr for SessionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_str(s).map(Self).map_err(|e| ParseIdError {
            id_type: "SessionId",
            reason: e.to_string(),
        })
    }
}

/// Macro to generate a validated string ID usable as a file name.
macro_rules! define_path_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a string without validation.
            ///
            /// Use [`FromStr`] for untrusted input.
            #[must_use]
            pub fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the id is safe to use as a single file name.
            #[must_use]
            pub fn is_valid(&self) -> bool {
                path_component_violation(&self.0).is_none()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match path_component_violation(s) {
                    Some(reason) => Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: reason.to_string(),
                    }),
                    None => Ok(Self(s.to_string())),
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_path_id!(
    /// Identifier of a persisted conversation transcript.
    ///
    /// Derived deterministically from the conversation context.
    ChatId
);

define_path_id!(
    /// Opaque identifier of a stored file blob.
    ResourceId
);

impl ResourceId {
    /// Returns the lower-cased extension of the resource, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.0.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_roundtrips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn session_id_display_is_lowercase() {
        let id = SessionId::new();
        let display = id.to_string();
        assert_eq!(display, display.to_lowercase());
    }

    #[test]
    fn chat_id_rejects_path_traversal() {
        assert!("../etc/passwd".parse::<ChatId>().is_err());
        assert!("a/b".parse::<ChatId>().is_err());
        assert!("a\\b".parse::<ChatId>().is_err());
        assert!(".hidden".parse::<ChatId>().is_err());
        assert!("".parse::<ChatId>().is_err());
    }

    #[test]
    fn chat_id_accepts_plain_names() {
        let id: ChatId = "client_web_user_u1_session_s1".parse().expect("should parse");
        assert_eq!(id.as_str(), "client_web_user_u1_session_s1");
    }

    #[test]
    fn parse_error_names_the_type() {
        let err = "a/b".parse::<ResourceId>().unwrap_err();
        assert_eq!(err.id_type, "ResourceId");
    }

    #[test]
    fn resource_extension_is_lowercased() {
        assert_eq!(
            ResourceId::new_unchecked("01abc.PNG").extension(),
            Some("png".to_string())
        );
        assert_eq!(ResourceId::new_unchecked("01abc").extension(), None);
        assert_eq!(ResourceId::new_unchecked("01abc.").extension(), None);
    }

    #[test]
    fn chat_id_serde_is_transparent() {
        let id = ChatId::new_unchecked("client_a_user_b_session_c");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"client_a_user_b_session_c\"");
    }
}

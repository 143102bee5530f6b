//! ULID-backed identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh identifier
            pub fn new() -> Self {
                Self(Ulid::new().to_string().to_lowercase())
            }

            /// Wrap an existing identifier string
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// The identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_type!(
    /// Identifier of an ordered item (a card or a list)
    ItemId
);
id_type!(
    /// Identifier of a board
    BoardId
);
id_type!(
    /// Identifier of a user (owner of a personal inbox)
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_string_round_trips() {
        let id = ItemId::from_string("card-42");
        assert_eq!(id.as_str(), "card-42");
        assert_eq!(id.to_string(), "card-42");
    }

    #[test]
    fn test_serde_transparent() {
        let id = BoardId::from_string("b1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"b1\"");
        let back: BoardId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

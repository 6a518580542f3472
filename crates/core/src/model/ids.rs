//! Numeric ids for words and lists.
//!
//! Stored JSON uses string ids (`"1700000000000"`), the form the browser build
//! writes. Reading also accepts plain numbers.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a string is not a valid id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[error("invalid {kind}: expected a non-negative integer")]
pub struct ParseIdError {
    kind: &'static str,
}

fn parse_id(raw: &str, kind: &'static str) -> Result<u64, ParseIdError> {
    raw.trim().parse().map_err(|_| ParseIdError { kind })
}

struct IdVisitor(&'static str);

impl Visitor<'_> for IdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} as a number or numeric string", self.0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_id(v, self.0).map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s, stringify!($name)).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer
                    .deserialize_any(IdVisitor(stringify!($name)))
                    .map(Self)
            }
        }
    };
}

define_id!(
    /// Identifies a word within its list.
    WordId
);

define_id!(
    /// Identifies a user word list.
    ListId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_id_from_str_trims() {
        let id: ListId = " 17 ".parse().unwrap();
        assert_eq!(id, ListId::new(17));
        assert_eq!(id.to_string(), "17");
    }

    #[test]
    fn list_id_from_str_invalid() {
        let err = "abc".parse::<ListId>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid ListId: expected a non-negative integer"
        );
    }

    #[test]
    fn ids_read_strings_and_numbers() {
        let from_string: WordId = serde_json::from_str(r#""1700000000000""#).unwrap();
        let from_number: WordId = serde_json::from_str("1700000000000").unwrap();
        assert_eq!(from_string, WordId::new(1_700_000_000_000));
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn ids_are_written_as_strings() {
        assert_eq!(serde_json::to_string(&ListId::new(3)).unwrap(), r#""3""#);
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        assert!(serde_json::from_str::<ListId>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<ListId>("-4").is_err());
        assert!(serde_json::from_str::<ListId>("null").is_err());
    }
}

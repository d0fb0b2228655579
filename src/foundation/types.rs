use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! define_id_type {
    (string $name:ident) => {
        #[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };

    (u64 $name:ident) => {
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

// Wallet/ledger identity (an address rendered as an opaque string).
define_id_type!(string AccountId);

// Canonical 1-based campaign identifier assigned by the ledger at creation.
define_id_type!(u64 CampaignId);

// Monotonically increasing ledger checkpoint (block number).
define_id_type!(u64 Position);

impl CampaignId {
    /// The ledger contract addresses campaigns by 0-based array index while
    /// the canonical identifier is 1-based. This is the single mapping point;
    /// nothing else may mix the two conventions.
    pub fn contract_index(&self) -> Option<u64> {
        self.0.checked_sub(1)
    }
}

impl Position {
    pub const ZERO: Position = Position(0);

    pub fn next(&self) -> Position {
        Position(self.0.saturating_add(1))
    }
}

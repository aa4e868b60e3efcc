//! # Domain Model
//!
//! Pure data structures shared by every layer: the produced good
//! ([`Unicorn`]) and the opaque order identifier ([`OrderId`]).

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A unicorn is a horse with a beautiful horn.
///
/// Unicorns have funny names and can do a lot of stuff. A unicorn is an
/// immutable value owned by exactly one container at a time (an order's
/// ready-queue or the overflow storage); ownership transfers by move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unicorn {
    /// Display name, e.g. `"courageous-spirit"`.
    pub name: String,
    /// Capability tags attributed at production time.
    pub capabilities: Vec<String>,
}

/// Type-safe identifier for pending unicorn orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Generates a random alphanumeric identifier `len` characters long.
    pub fn random(len: usize) -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! # Unicorn Factory
//!
//! Synthesizes the cosmetic payload of a produced unicorn: a random
//! `adjective-name` pair and a set of distinct capability tags.
//!
//! The production line only depends on the [`UnicornFactory`] trait, so
//! tests can swap in a deterministic factory.

use crate::model::Unicorn;
use rand::seq::SliceRandom;
use thiserror::Error;

const ADJECTIVES: &str = include_str!("fixtures/adjectives.txt");
const PET_NAMES: &str = include_str!("fixtures/petnames.txt");

/// Everything a unicorn could possibly learn to do.
const CAPABILITIES: &[&str] = &[
    "flying",
    "glitter-trail",
    "rainbow-mane",
    "teleportation",
    "invisibility",
    "telepathy",
    "cloud-surfing",
    "moonlight-healing",
    "star-jumping",
    "dream-weaving",
];

const DEFAULT_NAME: &str = "spirit";
const DEFAULT_ADJECTIVE: &str = "courageous";
const DEFAULT_CAPABILITIES: usize = 3;

/// Errors raised while configuring a factory.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FactoryError {
    /// More capabilities per unicorn were requested than the catalogue holds.
    #[error("not enough capabilities for producing unicorns: requested {requested}, have {available}")]
    NotEnoughCapabilities { requested: usize, available: usize },
}

/// Anything that can manufacture a unicorn on demand.
pub trait UnicornFactory: Send + Sync {
    /// Produces a new unicorn.
    fn new_unicorn(&self) -> Unicorn;
}

/// Factory that draws names and capabilities at random from embedded
/// word lists.
#[derive(Debug)]
pub struct RandomFactory {
    names: Vec<String>,
    adjectives: Vec<String>,
    capabilities: Vec<String>,
    capabilities_per_unicorn: usize,
}

impl RandomFactory {
    /// Creates a factory attributing the default number of capabilities.
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPABILITIES)
    }

    /// Creates a factory attributing `n` distinct capabilities per unicorn.
    pub fn with_capabilities(n: usize) -> Result<Self, FactoryError> {
        if n > CAPABILITIES.len() {
            return Err(FactoryError::NotEnoughCapabilities {
                requested: n,
                available: CAPABILITIES.len(),
            });
        }
        Ok(Self::build(n))
    }

    fn build(capabilities_per_unicorn: usize) -> Self {
        Self {
            names: load(PET_NAMES),
            adjectives: load(ADJECTIVES),
            capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
            capabilities_per_unicorn,
        }
    }
}

impl Default for RandomFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl UnicornFactory for RandomFactory {
    fn new_unicorn(&self) -> Unicorn {
        let mut rng = rand::thread_rng();

        let adjective = self
            .adjectives
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ADJECTIVE);
        let name = self
            .names
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_NAME);

        let capabilities = self
            .capabilities
            .choose_multiple(&mut rng, self.capabilities_per_unicorn)
            .cloned()
            .collect();

        Unicorn {
            name: format!("{adjective}-{name}"),
            capabilities,
        }
    }
}

/// Parses a line-separated embedded word list.
fn load(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn produces_named_unicorns() {
        let factory = RandomFactory::new();
        let unicorn = factory.new_unicorn();

        let (adjective, name) = unicorn
            .name
            .split_once('-')
            .expect("name should be adjective-name");
        assert!(ADJECTIVES.contains(adjective));
        assert!(PET_NAMES.contains(name));
    }

    #[test]
    fn capabilities_are_distinct() {
        let factory = RandomFactory::with_capabilities(5).unwrap();
        let unicorn = factory.new_unicorn();

        assert_eq!(unicorn.capabilities.len(), 5);
        let unique: HashSet<_> = unicorn.capabilities.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn rejects_oversized_capability_request() {
        let err = RandomFactory::with_capabilities(CAPABILITIES.len() + 1).unwrap_err();
        assert_eq!(
            err,
            FactoryError::NotEnoughCapabilities {
                requested: CAPABILITIES.len() + 1,
                available: CAPABILITIES.len(),
            }
        );
    }
}

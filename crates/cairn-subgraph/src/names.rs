//! Seeded generation of node names, property names and property values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{SubgraphError, SubgraphResult};

/// Lengths of generated strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameLengths {
    pub node: usize,
    pub property: usize,
    pub value: usize,
}

impl Default for NameLengths {
    fn default() -> Self {
        Self {
            node: 9,
            property: 8,
            value: 16,
        }
    }
}

impl NameLengths {
    /// Every length must be at least 1; an empty name is never valid.
    pub fn validate(&self) -> SubgraphResult<()> {
        for (field, len) in [
            ("node", self.node),
            ("property", self.property),
            ("value", self.value),
        ] {
            if len == 0 {
                return Err(SubgraphError::InvalidArgument(format!(
                    "{field} name length must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Number of distinct node names, saturating at `u64::MAX`.
    pub fn distinct_node_names(&self) -> u64 {
        u32::try_from(self.node)
            .ok()
            .and_then(|len| 26u64.checked_pow(len))
            .unwrap_or(u64::MAX)
    }
}

/// Source of random lowercase strings.
///
/// With 26 letters a 9-letter node name has about 5.4e12 possible values, so
/// sibling collisions in the tree sizes exercised here are practically
/// impossible. The same seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    rng: StdRng,
    lengths: NameLengths,
}

impl NameGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_lengths(seed, NameLengths::default())
    }

    pub fn with_lengths(seed: u64, lengths: NameLengths) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            lengths,
        }
    }

    pub fn lengths(&self) -> NameLengths {
        self.lengths
    }

    pub fn node_name(&mut self) -> String {
        self.letters(self.lengths.node)
    }

    pub fn property_name(&mut self) -> String {
        self.letters(self.lengths.property)
    }

    pub fn property_value(&mut self) -> String {
        self.letters(self.lengths.value)
    }

    fn letters(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(self.rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

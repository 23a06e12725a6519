//! Element identity and seed allocation.
//!
//! Every element carries a unique string id and a pseudo-random seed that
//! viewers use to vary the hand-drawn rendering. Both are produced by an
//! [`IdSource`], which can be swapped for [`SequentialIdSource`] when
//! reproducible output is needed.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest seed value handed out by the bundled id sources (inclusive).
pub const MAX_SEED: u32 = 100_000;

/// Unique identifier of an element.
///
/// # Examples
///
/// ```
/// use scrawl_core::identifier::ElementId;
///
/// let id = ElementId::new("box-1");
/// assert_eq!(id.as_str(), "box-1");
/// assert_eq!(id.to_string(), "box-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a group that elements can be members of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allocator for element ids, group ids, and rendering seeds.
pub trait IdSource {
    /// Returns a fresh identifier string, unique within this source.
    fn next_id(&mut self) -> String;

    /// Returns a seed in `0..=MAX_SEED`.
    fn next_seed(&mut self) -> u32;

    fn next_element_id(&mut self) -> ElementId {
        ElementId(self.next_id())
    }

    fn next_group_id(&mut self) -> GroupId {
        GroupId(self.next_id())
    }
}

/// Default [`IdSource`]: UUIDv4 ids and thread-local random seeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }

    fn next_seed(&mut self) -> u32 {
        rand::rng().random_range(0..=MAX_SEED)
    }
}

/// Deterministic [`IdSource`] producing `"{prefix}-{n}"` ids and seeds from a
/// fixed-seed generator.
///
/// # Examples
///
/// ```
/// use scrawl_core::identifier::{IdSource, SequentialIdSource};
///
/// let mut ids = SequentialIdSource::new("el", 7);
/// assert_eq!(ids.next_id(), "el-0");
/// assert_eq!(ids.next_id(), "el-1");
///
/// let mut again = SequentialIdSource::new("el", 7);
/// let mut first = SequentialIdSource::new("el", 7);
/// assert_eq!(again.next_seed(), first.next_seed());
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIdSource {
    prefix: String,
    counter: u64,
    rng: StdRng,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.counter);
        self.counter += 1;
        id
    }

    fn next_seed(&mut self) -> u32 {
        self.rng.random_range(0..=MAX_SEED)
    }
}

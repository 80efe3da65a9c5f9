//! Newtype wrappers for node identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a render node.
///
/// Unlike arena handles, an instance id survives `derive`: every copy of a node shares the id
/// of the node it was derived from, so it can be used to find "the same" node in a snapshot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing instance ids.
#[derive(Debug, Clone, Default)]
pub struct InstanceIdGenerator {
    next: u64,
}

impl InstanceIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }
}

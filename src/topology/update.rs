//! Decoded topology updates and the staleness rule

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use super::TopologyAddress;
use crate::protocol::DEFAULT_CACHE_TOPOLOGY;

/// Shared, mutable topology id of one cache.
///
/// Cloning yields another handle to the same cell. Request headers hold a
/// handle so that a retried request writes the latest id known at send time.
#[derive(Debug, Clone)]
pub struct TopologyIdCell(Arc<AtomicI32>);

impl TopologyIdCell {
    pub fn new(topology_id: i32) -> Self {
        Self(Arc::new(AtomicI32::new(topology_id)))
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, topology_id: i32) {
        self.0.store(topology_id, Ordering::Release);
    }

    /// Both handles point at the same cell
    pub fn same_cell(&self, other: &TopologyIdCell) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for TopologyIdCell {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TOPOLOGY)
    }
}

/// Segment ownership carried by hash-distribution-aware responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashTopology {
    /// 0 means no consistent hash; `segment_owners` is then empty
    pub hash_function_version: u8,
    pub num_segments: u32,
    /// Owners per segment, primary first
    pub segment_owners: Vec<Vec<TopologyAddress>>,
}

/// One topology block as read from a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyUpdate {
    pub topology_id: i32,
    pub servers: Vec<TopologyAddress>,
    /// Present only when the request declared hash-distribution awareness
    pub hash: Option<HashTopology>,
}

/// Result of reading the topology section of a response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyOutcome {
    /// Marker byte said no topology follows
    Absent,
    /// Block was read and installed in the cluster state
    Applied(TopologyUpdate),
    /// Block was read and dropped as stale
    Discarded(TopologyUpdate),
}

impl TopologyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TopologyOutcome::Applied(_))
    }

    pub fn update(&self) -> Option<&TopologyUpdate> {
        match self {
            TopologyOutcome::Absent => None,
            TopologyOutcome::Applied(update) | TopologyOutcome::Discarded(update) => Some(update),
        }
    }
}

/// Whether a topology decoded from a response to a request created at
/// `request_age` may replace the current one.
///
/// A request from an older cluster generation always wins; within the same
/// generation only a different id is installed.
pub fn is_newer_topology(request_age: u32, current_age: u32, current_id: i32, new_id: i32) -> bool {
    request_age < current_age || (request_age == current_age && current_id != new_id)
}

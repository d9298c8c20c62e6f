//! Connection factory collaborator
//!
//! The codec never owns cluster state. It reads and updates it through this
//! trait, which the connection layer implements ([`super::ClusterTopology`]
//! is the in-crate implementation).

use super::{is_newer_topology, TopologyAddress, TopologyIdCell, TopologyUpdate};
use crate::codec::HeaderParams;

/// Cluster state operations the codec depends on
pub trait TransportFactory: Send + Sync {
    /// Current topology id of a cache
    fn topology_id(&self, cache_name: &[u8]) -> i32;

    /// Current cluster generation
    fn topology_age(&self) -> u32;

    /// Replace the member list of a cache. `quiet` suppresses listener
    /// notification.
    fn update_servers(&self, servers: &[TopologyAddress], cache_name: &[u8], quiet: bool);

    /// Replace the segment ownership table of a cache
    fn update_hash_function(
        &self,
        segment_owners: &[Vec<TopologyAddress>],
        num_segments: u32,
        hash_function_version: u8,
        cache_name: &[u8],
        topology_id: &TopologyIdCell,
    );

    /// Install `update` unless it is stale for the request described by
    /// `params`. Returns whether it was installed.
    ///
    /// The provided implementation checks and applies in separate steps.
    /// Implementations shared between threads should override it with an
    /// atomic check-and-apply.
    fn apply_topology(&self, params: &HeaderParams, update: &TopologyUpdate) -> bool {
        let cache_name = params.cache_name();
        let current_id = self.topology_id(cache_name);
        let current_age = self.topology_age();

        if !is_newer_topology(params.topology_age(), current_age, current_id, update.topology_id) {
            return false;
        }

        params.topology_id().set(update.topology_id);
        self.update_servers(&update.servers, cache_name, false);
        if let Some(hash) = &update.hash {
            self.update_hash_function(
                &hash.segment_owners,
                hash.num_segments,
                hash.hash_function_version,
                cache_name,
                params.topology_id(),
            );
        }
        true
    }
}

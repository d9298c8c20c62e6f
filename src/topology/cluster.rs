//! Shared cluster topology state
//!
//! ## Concurrency Model: Multi-Reader / Serialized-Writer
//!
//! - **Reads** (routing lookups, header construction): shared `RwLock` read
//!   guard, never block each other.
//! - **Writes** (topology apply, cluster switch): exclusive write guard. The
//!   staleness check and the apply happen under the same guard, so a writer
//!   that lost a race to a fresher topology sees it and backs off.
//! - Listener notification happens after the guard is released.

use std::collections::HashMap;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::{is_newer_topology, TopologyAddress, TopologyIdCell, TopologyUpdate, TransportFactory};
use crate::codec::HeaderParams;
use crate::protocol::{Operation, DEFAULT_CACHE_TOPOLOGY};

/// Point-in-time copy of one cache's topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTopologyInfo {
    pub topology_id: i32,
    pub servers: Vec<TopologyAddress>,
    pub segment_owners: Vec<Vec<TopologyAddress>>,
    pub num_segments: u32,
    /// `None` until a hash-aware response was applied
    pub hash_function_version: Option<u8>,
}

/// Sent to subscribers whenever a cache's member list changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServersChanged {
    pub cache_name: Vec<u8>,
    pub topology_id: i32,
    pub servers: Vec<TopologyAddress>,
}

struct CacheTopology {
    topology_id: TopologyIdCell,
    /// Age of the request whose response installed the current topology
    applied_age: Option<u32>,
    servers: Vec<TopologyAddress>,
    segment_owners: Vec<Vec<TopologyAddress>>,
    num_segments: u32,
    hash_function_version: Option<u8>,
}

impl CacheTopology {
    fn new(initial_servers: &[TopologyAddress]) -> Self {
        Self {
            topology_id: TopologyIdCell::default(),
            applied_age: None,
            servers: initial_servers.to_vec(),
            segment_owners: Vec::new(),
            num_segments: 0,
            hash_function_version: None,
        }
    }

    fn snapshot(&self) -> CacheTopologyInfo {
        CacheTopologyInfo {
            topology_id: self.topology_id.get(),
            servers: self.servers.clone(),
            segment_owners: self.segment_owners.clone(),
            num_segments: self.num_segments,
            hash_function_version: self.hash_function_version,
        }
    }
}

struct ClusterState {
    /// Cluster generation, bumped on every cluster switch
    age: u32,
    initial_servers: Vec<TopologyAddress>,
    caches: HashMap<Vec<u8>, CacheTopology>,
}

impl ClusterState {
    fn cache_mut(&mut self, cache_name: &[u8]) -> &mut CacheTopology {
        let initial = &self.initial_servers;
        self.caches
            .entry(cache_name.to_vec())
            .or_insert_with(|| CacheTopology::new(initial))
    }
}

/// Process-wide topology and hash state, shared by all connections
pub struct ClusterTopology {
    state: RwLock<ClusterState>,
    listeners: Mutex<Vec<Sender<ServersChanged>>>,
}

impl ClusterTopology {
    /// Create the state with the configured bootstrap servers
    pub fn new(initial_servers: Vec<TopologyAddress>) -> Self {
        Self {
            state: RwLock::new(ClusterState {
                age: 0,
                initial_servers,
                caches: HashMap::new(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Handle to the topology id cell of a cache, created on first use
    pub fn topology_id_cell(&self, cache_name: &[u8]) -> TopologyIdCell {
        if let Some(cache) = self.state.read().caches.get(cache_name) {
            return cache.topology_id.clone();
        }
        self.state.write().cache_mut(cache_name).topology_id.clone()
    }

    /// Build request header params bound to this cluster's state for `cache_name`
    pub fn header_params(&self, operation: Operation, message_id: u64, cache_name: &[u8]) -> HeaderParams {
        HeaderParams::new(operation, message_id)
            .with_cache_name(cache_name)
            .with_topology_id(self.topology_id_cell(cache_name))
            .with_topology_age(self.topology_age())
    }

    /// Members known for a cache, falling back to the bootstrap list
    pub fn servers(&self, cache_name: &[u8]) -> Vec<TopologyAddress> {
        let state = self.state.read();
        match state.caches.get(cache_name) {
            Some(cache) => cache.servers.clone(),
            None => state.initial_servers.clone(),
        }
    }

    /// Snapshot of a cache's topology, if the cache has been seen
    pub fn cache_topology(&self, cache_name: &[u8]) -> Option<CacheTopologyInfo> {
        self.state.read().caches.get(cache_name).map(CacheTopology::snapshot)
    }

    /// Switch to a different cluster. Bumps the generation and forgets every
    /// cache topology learned from the previous cluster.
    pub fn switch_cluster(&self, servers: Vec<TopologyAddress>) -> u32 {
        let mut state = self.state.write();
        state.age += 1;
        for cache in state.caches.values_mut() {
            cache.topology_id.set(DEFAULT_CACHE_TOPOLOGY);
            cache.applied_age = None;
            cache.servers = servers.clone();
            cache.segment_owners.clear();
            cache.num_segments = 0;
            cache.hash_function_version = None;
        }
        state.initial_servers = servers;
        tracing::info!(topology_age = state.age, "Switched cluster");
        state.age
    }

    /// Receive a [`ServersChanged`] for every non-quiet member list update
    pub fn subscribe(&self) -> Receiver<ServersChanged> {
        let (tx, rx) = channel::unbounded();
        self.listeners.lock().push(tx);
        rx
    }

    fn notify(&self, event: ServersChanged) {
        // Drop listeners whose receiver is gone
        self.listeners.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl TransportFactory for ClusterTopology {
    fn topology_id(&self, cache_name: &[u8]) -> i32 {
        self.state
            .read()
            .caches
            .get(cache_name)
            .map_or(DEFAULT_CACHE_TOPOLOGY, |cache| cache.topology_id.get())
    }

    fn topology_age(&self) -> u32 {
        self.state.read().age
    }

    fn update_servers(&self, servers: &[TopologyAddress], cache_name: &[u8], quiet: bool) {
        let topology_id = {
            let mut state = self.state.write();
            let cache = state.cache_mut(cache_name);
            cache.servers = servers.to_vec();
            cache.topology_id.get()
        };
        if !quiet {
            self.notify(ServersChanged {
                cache_name: cache_name.to_vec(),
                topology_id,
                servers: servers.to_vec(),
            });
        }
    }

    fn update_hash_function(
        &self,
        segment_owners: &[Vec<TopologyAddress>],
        num_segments: u32,
        hash_function_version: u8,
        cache_name: &[u8],
        topology_id: &TopologyIdCell,
    ) {
        let mut state = self.state.write();
        let cache = state.cache_mut(cache_name);
        cache.segment_owners = segment_owners.to_vec();
        cache.num_segments = num_segments;
        cache.hash_function_version = Some(hash_function_version);
        if !cache.topology_id.same_cell(topology_id) {
            cache.topology_id.set(topology_id.get());
        }
    }

    fn apply_topology(&self, params: &HeaderParams, update: &TopologyUpdate) -> bool {
        let cache_name = params.cache_name();
        let request_age = params.topology_age();

        {
            let mut state = self.state.write();
            let current_age = state.age;
            let cache = state.cache_mut(cache_name);

            // A response to an older request than the one that installed
            // the current topology never replaces it.
            if cache.applied_age.is_some_and(|applied| request_age < applied) {
                return false;
            }
            if !is_newer_topology(request_age, current_age, cache.topology_id.get(), update.topology_id) {
                return false;
            }

            cache.topology_id.set(update.topology_id);
            if !cache.topology_id.same_cell(params.topology_id()) {
                params.topology_id().set(update.topology_id);
            }
            cache.applied_age = Some(request_age);
            cache.servers = update.servers.clone();
            if let Some(hash) = &update.hash {
                cache.segment_owners = hash.segment_owners.clone();
                cache.num_segments = hash.num_segments;
                cache.hash_function_version = Some(hash.hash_function_version);
            }
        }

        self.notify(ServersChanged {
            cache_name: cache_name.to_vec(),
            topology_id: update.topology_id,
            servers: update.servers.clone(),
        });
        true
    }
}

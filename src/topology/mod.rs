//! Topology Module
//!
//! Cluster membership and consistent-hash segment ownership as announced by
//! the server in response headers.
//!
//! ## Responsibilities
//! - Decode the optional topology block of a response header
//! - Decide whether a decoded topology is fresher than the current one
//! - Hold the process-wide cluster state read by the routing layer
//!
//! Choosing which server to contact is not done here.

mod address;
mod cluster;
mod decoder;
mod factory;
mod update;

pub use address::TopologyAddress;
pub use cluster::{CacheTopologyInfo, ClusterTopology, ServersChanged};
pub use decoder::{read_new_topology_if_present, read_topology_update};
pub use factory::TransportFactory;
pub use update::{
    is_newer_topology, HashTopology, TopologyIdCell, TopologyOutcome, TopologyUpdate,
};

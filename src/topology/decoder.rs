//! Topology block decoding
//!
//! ```text
//! marker(1) [== 1:
//!   topologyId(VInt) memberCount(VInt) (host(string) port(u16))*
//!   [hash aware: hashVersion(1) segmentCount(VInt)
//!     [hashVersion > 0: (ownerCount(1) memberIndex(VInt)*)*]]]
//! ```
//!
//! The block is always consumed in full, whether or not it ends up applied,
//! so the bytes that follow stay aligned.

use bytes::Buf;

use super::{HashTopology, TopologyAddress, TopologyOutcome, TopologyUpdate, TransportFactory};
use crate::codec::HeaderParams;
use crate::error::{HotRodError, Result};
use crate::primitive::{read_string, read_u16, read_u8, read_vint};
use crate::protocol::{ClientIntelligence, TOPOLOGY_CHANGE_MARKER};

/// Read the marker byte and, if a topology follows, decode it and offer it
/// to `factory`.
pub fn read_new_topology_if_present<B: Buf + ?Sized>(
    buf: &mut B,
    params: &HeaderParams,
    factory: &dyn TransportFactory,
) -> Result<TopologyOutcome> {
    let marker = read_u8(buf)?;
    if marker != TOPOLOGY_CHANGE_MARKER {
        return Ok(TopologyOutcome::Absent);
    }

    let update = read_topology_update(buf, params.client_intelligence())?;
    let cache = params.cache_name_lossy();

    if factory.apply_topology(params, &update) {
        tracing::info!(
            cache = %cache,
            topology_id = update.topology_id,
            topology_age = factory.topology_age(),
            members = update.servers.len(),
            "New topology received: {:?}",
            update.servers
        );
        if let Some(hash) = &update.hash {
            if hash.hash_function_version == 0 {
                tracing::trace!("[{}] Not using a consistent hash function (hash function version == 0)", cache);
            } else {
                tracing::trace!("[{}] Updating client hash function with {} segments", cache, hash.num_segments);
            }
        }
        Ok(TopologyOutcome::Applied(update))
    } else {
        tracing::trace!(
            "[{}] Outdated topology received (topology id = {}, topology age = {}), so ignoring it: {:?}",
            cache,
            update.topology_id,
            factory.topology_age(),
            update.servers
        );
        Ok(TopologyOutcome::Discarded(update))
    }
}

/// Decode the body of a topology block (everything after the marker)
pub fn read_topology_update<B: Buf + ?Sized>(
    buf: &mut B,
    intelligence: ClientIntelligence,
) -> Result<TopologyUpdate> {
    let topology_id = read_vint(buf)? as i32;
    let servers = read_members(buf)?;

    let hash = if intelligence == ClientIntelligence::HashDistributionAware {
        Some(read_hash_topology(buf, &servers)?)
    } else {
        None
    };

    Ok(TopologyUpdate {
        topology_id,
        servers,
        hash,
    })
}

fn read_members<B: Buf + ?Sized>(buf: &mut B) -> Result<Vec<TopologyAddress>> {
    let count = read_vint(buf)? as usize;
    // Each member needs at least 3 bytes; do not trust the count for sizing.
    let mut servers = Vec::with_capacity(count.min(buf.remaining() / 3));
    for _ in 0..count {
        let host = read_string(buf)?;
        let port = read_u16(buf)?;
        servers.push(TopologyAddress::new(host, port));
    }
    Ok(servers)
}

fn read_hash_topology<B: Buf + ?Sized>(
    buf: &mut B,
    servers: &[TopologyAddress],
) -> Result<HashTopology> {
    let hash_function_version = read_u8(buf)?;
    let num_segments = read_vint(buf)?;

    let mut segment_owners = Vec::new();
    if hash_function_version > 0 {
        segment_owners.reserve((num_segments as usize).min(buf.remaining()));
        for _ in 0..num_segments {
            let owner_count = read_u8(buf)?;
            let mut owners = Vec::with_capacity(owner_count as usize);
            for _ in 0..owner_count {
                let index = read_vint(buf)?;
                let owner = servers.get(index as usize).ok_or(
                    HotRodError::InvalidTopologyReference {
                        index,
                        member_count: servers.len(),
                    },
                )?;
                owners.push(owner.clone());
            }
            segment_owners.push(owners);
        }
    }

    Ok(HashTopology {
        hash_function_version,
        num_segments,
        segment_owners,
    })
}

//! Topology Decoder Tests
//!
//! Tests for reading topology blocks out of response headers:
//! - Member lists and segment ownership
//! - Apply vs discard under the staleness rule
//! - Stream alignment after the block

#[path = "../common/mod.rs"]
mod common;

use common::{members, server, Frame};
use hotrod_codec::codec::{Codec30, HeaderParams};
use hotrod_codec::protocol::{ClientIntelligence, Operation};
use hotrod_codec::topology::{read_topology_update, TopologyOutcome};
use hotrod_codec::{ClusterTopology, Codec, HotRodError, TransportFactory};

fn params(cluster: &ClusterTopology, intelligence: ClientIntelligence) -> HeaderParams {
    cluster
        .header_params(Operation::Get, 7, b"books")
        .with_client_intelligence(intelligence)
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_topology_aware_update_is_applied() {
    let cluster = ClusterTopology::new(members(1));
    let params = params(&cluster, ClientIntelligence::TopologyAware);
    let nodes = members(3);
    let response = Frame::response(7).byte(0x04).byte(0x00).topology(12, &nodes).build();

    let mut cursor: &[u8] = &response;
    let header = Codec30::default()
        .read_header(&mut cursor, &params, &cluster, &server())
        .unwrap();

    match &header.topology {
        TopologyOutcome::Applied(update) => {
            assert_eq!(update.topology_id, 12);
            assert_eq!(update.servers, nodes);
            assert!(update.hash.is_none());
        }
        other => panic!("expected applied topology, got {other:?}"),
    }
    assert_eq!(cluster.topology_id(b"books"), 12);
    assert_eq!(cluster.servers(b"books"), nodes);
    assert_eq!(params.topology_id().get(), 12);
}

#[test]
fn test_hash_aware_segments_resolve_members() {
    let cluster = ClusterTopology::new(members(1));
    let params = params(&cluster, ClientIntelligence::HashDistributionAware);
    let nodes = members(3);
    let response = Frame::response(7)
        .byte(0x04)
        .byte(0x00)
        .topology(3, &nodes)
        .hash(3, &[vec![0, 1], vec![1, 2], vec![2]])
        .build();

    let mut cursor: &[u8] = &response;
    Codec30::default()
        .read_header(&mut cursor, &params, &cluster, &server())
        .unwrap();
    assert!(cursor.is_empty());

    let info = cluster.cache_topology(b"books").unwrap();
    assert_eq!(info.num_segments, 3);
    assert_eq!(info.hash_function_version, Some(3));
    assert_eq!(
        info.segment_owners,
        vec![
            vec![nodes[0].clone(), nodes[1].clone()],
            vec![nodes[1].clone(), nodes[2].clone()],
            vec![nodes[2].clone()],
        ]
    );
}

#[test]
fn test_hash_version_zero_has_no_owners() {
    let nodes = members(2);
    let mut body = Frame::default().vint(4).vint(2);
    for node in &nodes {
        body = body.string(node.host()).byte((node.port() >> 8) as u8).byte(node.port() as u8);
    }
    let bytes = body.byte(0).vint(256).build();

    let mut cursor: &[u8] = &bytes;
    let update = read_topology_update(&mut cursor, ClientIntelligence::HashDistributionAware).unwrap();

    let hash = update.hash.unwrap();
    assert_eq!(hash.hash_function_version, 0);
    assert_eq!(hash.num_segments, 256);
    assert!(hash.segment_owners.is_empty());
    assert!(cursor.is_empty());
}

#[test]
fn test_basic_client_skips_hash_section() {
    let cluster = ClusterTopology::new(members(1));
    let params = params(&cluster, ClientIntelligence::Basic);
    let response = Frame::response(7)
        .byte(0x04)
        .byte(0x00)
        .topology(2, &members(2))
        .array(b"value")
        .build();

    let mut cursor: &[u8] = &response;
    let header = Codec30::default()
        .read_header(&mut cursor, &params, &cluster, &server())
        .unwrap();

    assert!(header.topology.update().unwrap().hash.is_none());
    // Only the operation payload is left
    assert_eq!(cursor, &[0x05, b'v', b'a', b'l', b'u', b'e'][..]);
}

#[test]
fn test_out_of_range_owner_index() {
    let cluster = ClusterTopology::new(members(1));
    let params = params(&cluster, ClientIntelligence::HashDistributionAware);
    let response = Frame::response(7)
        .byte(0x04)
        .byte(0x00)
        .topology(3, &members(2))
        .hash(3, &[vec![0, 2]])
        .build();

    let mut cursor: &[u8] = &response;
    let err = Codec30::default()
        .read_header(&mut cursor, &params, &cluster, &server())
        .unwrap_err();

    assert!(matches!(
        err,
        HotRodError::InvalidTopologyReference {
            index: 2,
            member_count: 2
        }
    ));
    assert_eq!(cluster.topology_id(b"books"), -1);
}

#[test]
fn test_member_count_larger_than_input() {
    let bytes = Frame::default().vint(1).vint(u32::MAX).build();

    let mut cursor: &[u8] = &bytes;
    let err = read_topology_update(&mut cursor, ClientIntelligence::TopologyAware).unwrap_err();
    assert!(matches!(err, HotRodError::UnexpectedEndOfInput { .. }));
}

// =============================================================================
// Staleness Tests
// =============================================================================

#[test]
fn test_same_topology_id_is_discarded_and_consumed() {
    let cluster = ClusterTopology::new(members(1));
    let nodes = members(2);
    let codec = Codec30::default();

    for expected_applied in [true, false] {
        let params = params(&cluster, ClientIntelligence::TopologyAware);
        let response = Frame::response(7)
            .byte(0x04)
            .byte(0x00)
            .topology(8, &nodes)
            .array(b"v")
            .build();

        let mut cursor: &[u8] = &response;
        let header = codec
            .read_header(&mut cursor, &params, &cluster, &server())
            .unwrap();

        assert_eq!(header.topology.is_applied(), expected_applied);
        assert_eq!(cursor, &[0x01, b'v'][..]);
    }
}

#[test]
fn test_response_to_older_generation_is_applied() {
    let cluster = ClusterTopology::new(members(1));
    let stale_params = params(&cluster, ClientIntelligence::TopologyAware);
    cluster.switch_cluster(members(2));

    let response = Frame::response(7).byte(0x04).byte(0x00).topology(1, &members(4)).build();
    let mut cursor: &[u8] = &response;
    let header = Codec30::default()
        .read_header(&mut cursor, &stale_params, &cluster, &server())
        .unwrap();

    assert!(header.topology.is_applied());
    assert_eq!(cluster.servers(b"books").len(), 4);
}

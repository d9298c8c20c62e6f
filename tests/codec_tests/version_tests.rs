//! Version Tests
//!
//! Tests for the per-version codecs and the codec configuration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hotrod_codec::codec::{
    codec_for, AllowList, ClientListenerParams, Codec20, Codec21, Codec22, Codec26, Codec30,
    EventInterests, Expiration, HeaderParams, NamedFactory, TimeUnit,
};
use hotrod_codec::protocol::{ClientIntelligence, Operation, ProtocolVersion};
use hotrod_codec::{ClusterTopology, Codec, CodecConfig, HotRodError, TopologyAddress};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const ALL_VERSIONS: [ProtocolVersion; 5] = [
    ProtocolVersion::V20,
    ProtocolVersion::V21,
    ProtocolVersion::V22,
    ProtocolVersion::V26,
    ProtocolVersion::V30,
];

fn expiration_bytes(codec: &dyn Codec, lifespan: Expiration, max_idle: Expiration) -> Vec<u8> {
    let mut buf = Vec::new();
    codec.write_expiration_params(&mut buf, lifespan, max_idle);
    assert_eq!(codec.estimate_expiration_size(lifespan, max_idle), buf.len());
    buf
}

fn listener() -> ClientListenerParams {
    ClientListenerParams {
        include_current_state: true,
        filter_factory: NamedFactory::new("f", vec![b"x".to_vec()]),
        converter_factory: NamedFactory::default(),
        use_raw_data: true,
    }
}

// =============================================================================
// Version Byte Tests
// =============================================================================

#[test]
fn test_each_codec_writes_its_version() {
    for version in ALL_VERSIONS {
        let codec = codec_for(version);
        assert_eq!(codec.version(), version);

        let mut buf = Vec::new();
        codec.write_header(&mut buf, &HeaderParams::new(Operation::Ping, 1));
        assert_eq!(buf[2], version.value());
    }
}

#[test]
fn test_protocol_version_lookup() {
    assert_eq!(ProtocolVersion::from_u8(26), Some(ProtocolVersion::V26));
    assert_eq!(ProtocolVersion::from_u8(23), None);
    assert_eq!(ProtocolVersion::default(), ProtocolVersion::V30);
}

// =============================================================================
// Expiration Tests
// =============================================================================

#[test]
fn test_expiration_in_seconds_before_2_2() {
    let lifespan = Expiration::After(1500, TimeUnit::Milliseconds);

    for codec in [&Codec20 as &dyn Codec, &Codec21::default()] {
        assert_eq!(
            expiration_bytes(codec, lifespan, Expiration::Infinite),
            vec![0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
        assert_eq!(
            expiration_bytes(codec, Expiration::Default, Expiration::Default),
            vec![0x00, 0x00]
        );
    }
}

#[test]
fn test_expiration_with_units_from_2_2() {
    let lifespan = Expiration::After(1500, TimeUnit::Milliseconds);

    for codec in [&Codec22::default() as &dyn Codec, &Codec26::default(), &Codec30::default()] {
        assert_eq!(
            expiration_bytes(codec, lifespan, Expiration::Infinite),
            vec![0x18, 0xDC, 0x0B]
        );
        assert_eq!(
            expiration_bytes(codec, Expiration::Default, Expiration::Default),
            vec![0x77]
        );
        assert_eq!(
            expiration_bytes(codec, Expiration::Infinite, Expiration::After(3, TimeUnit::Hours)),
            vec![0x85, 0x03]
        );
    }
}

/// Counts WARN events seen while installed
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_clamped_expiration_warns_once_per_write() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
    let huge = Expiration::After(u64::MAX, TimeUnit::Days);

    let bytes = tracing::subscriber::with_default(subscriber, || {
        expiration_bytes(&Codec20, huge, Expiration::Default)
    });

    assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x00]);
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_amount_means_default() {
    let codec = Codec30::default();
    assert_eq!(
        expiration_bytes(&codec, Expiration::After(0, TimeUnit::Seconds), Expiration::Default),
        vec![0x77]
    );
}

// =============================================================================
// Listener Tests
// =============================================================================

#[test]
fn test_listener_params_by_version() {
    let v20 = vec![0x01, 0x01, b'f', 0x01, 0x01, b'x', 0x00];
    let mut v21 = v20.clone();
    v21.push(0x01);

    let mut buf = Vec::new();
    Codec20.write_client_listener_params(&mut buf, &listener());
    assert_eq!(buf, v20);

    for version in &ALL_VERSIONS[1..] {
        let mut buf = Vec::new();
        codec_for(*version).write_client_listener_params(&mut buf, &listener());
        assert_eq!(buf, v21, "version {version:?}");
    }
}

#[test]
fn test_listener_interests_from_2_6() {
    let interests = EventInterests::CREATED | EventInterests::REMOVED;

    for version in ALL_VERSIONS {
        let mut buf = Vec::new();
        codec_for(version).write_client_listener_interests(&mut buf, interests);
        if version >= ProtocolVersion::V26 {
            assert_eq!(buf, vec![0x05]);
        } else {
            assert!(buf.is_empty(), "version {version:?}");
        }
    }
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = CodecConfig::default();
    assert_eq!(config.protocol_version, ProtocolVersion::V30);
    assert_eq!(config.client_intelligence, ClientIntelligence::HashDistributionAware);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder() {
    let config = CodecConfig::builder()
        .protocol_version(ProtocolVersion::V22)
        .client_intelligence(ClientIntelligence::TopologyAware)
        .max_array_length(1024)
        .allow_list(AllowList::new(["com.example.*"]))
        .build()
        .unwrap();

    assert_eq!(config.codec().version(), ProtocolVersion::V22);
    assert_eq!(config.max_array_length, 1024);
    assert!(config.allow_list.is_allowed("com.example.Person"));
}

#[test]
fn test_config_rejects_zero_array_length() {
    let err = CodecConfig::builder().max_array_length(0).build().unwrap_err();
    assert!(matches!(err, HotRodError::Config(_)));
}

#[test]
fn test_config_header_params() {
    let config = CodecConfig::builder()
        .client_intelligence(ClientIntelligence::Basic)
        .build()
        .unwrap();
    let cluster = ClusterTopology::new(vec![TopologyAddress::new("localhost", 11222)]);

    let params = config.header_params(&cluster, Operation::Get, 5, b"cache");
    assert_eq!(params.client_intelligence(), ClientIntelligence::Basic);
    assert_eq!(params.cache_name(), b"cache");
    assert_eq!(params.response_code(), 0x04);
    assert_eq!(params.topology_id().get(), -1);
    assert!(params
        .topology_id()
        .same_cell(&cluster.topology_id_cell(b"cache")));
}

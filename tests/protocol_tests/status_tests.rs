//! Status Tests
//!
//! Tests for status classification and the errors raised from it.

#[path = "../common/mod.rs"]
mod common;

use common::server;
use hotrod_codec::codec::{AllowList, BytesMarshaller, Codec30, HeaderParams};
use hotrod_codec::primitive::{write_array, write_string, DEFAULT_MAX_ARRAY_LENGTH};
use hotrod_codec::protocol::status::{self, classify, StatusOutcome};
use hotrod_codec::protocol::Operation;
use hotrod_codec::{Codec, CodecConfig, ErrorKind, HotRodError, RecoveryHint};

fn with_message(message: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    write_string(&mut buf, message);
    buf
}

fn check(status: u8, payload: &[u8]) -> (hotrod_codec::Result<()>, usize) {
    let codec = Codec30::default();
    let params = HeaderParams::new(Operation::Get, 42).with_cache_name("orders");
    let mut cursor: &[u8] = payload;
    let result = codec.check_response_status(&mut cursor, Some(&params), status, &server());
    (result, cursor.len())
}

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_every_status_has_one_outcome() {
    for value in 0..=u8::MAX {
        let outcome = classify(value);
        let (result, _) = check(value, &with_message("m"));

        match outcome {
            StatusOutcome::Success | StatusOutcome::SuccessWithPrevious => {
                assert!(result.is_ok(), "status {value:#x}")
            }
            StatusOutcome::Unknown => assert!(matches!(
                result,
                Err(HotRodError::UnknownStatus { status }) if status == value
            )),
            _ => assert!(result.is_err(), "status {value:#x}"),
        }
    }
}

#[test]
fn test_previous_value_statuses() {
    for value in [0x03, 0x04, 0x07, 0x08] {
        assert!(status::has_previous(value));
    }
    for value in [0x00, 0x01, 0x02, 0x05, 0x06] {
        assert!(!status::has_previous(value));
    }
    assert!(status::is_success(0x06));
    assert!(status::is_not_executed(0x01));
    assert!(status::is_not_exist(0x02));
}

// =============================================================================
// Error Status Tests
// =============================================================================

#[test]
fn test_server_error_reads_message() {
    let (result, remaining) = check(status::SERVER_ERROR_STATUS, &with_message("out of memory"));
    let err = result.unwrap_err();

    match &err {
        HotRodError::ServerError {
            message,
            status,
            message_id,
        } => {
            assert_eq!(message, "out of memory");
            assert_eq!(*status, 0x85);
            assert_eq!(*message_id, 42);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(remaining, 0);
    assert_eq!(err.recovery_hint(), RecoveryHint::Propagate);
    assert!(!err.is_timeout());
}

#[test]
fn test_timeout_is_server_error() {
    let (result, _) = check(status::COMMAND_TIMEOUT_STATUS, &with_message("timed out"));
    let err = result.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert!(err.is_timeout());
    assert!(!err.should_discard_connection());
}

#[test]
fn test_framing_errors_discard_connection() {
    for value in [0x81, 0x82, 0x83, 0x84] {
        let (result, _) = check(value, &with_message("bad frame"));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert!(err.should_discard_connection(), "status {value:#x}");
    }
}

#[test]
fn test_node_suspected_may_retry_elsewhere() {
    let (result, remaining) = check(status::NODE_SUSPECTED, &with_message("node2 suspected"));
    let err = result.unwrap_err();

    assert!(matches!(&err, HotRodError::NodeSuspected { message, message_id: 42 } if message == "node2 suspected"));
    assert_eq!(err.recovery_hint(), RecoveryHint::RetryElsewhere);
    assert_eq!(remaining, 0);
}

#[test]
fn test_illegal_lifecycle_names_server() {
    let (result, _) = check(status::ILLEGAL_LIFECYCLE_STATE, &with_message("stopping"));

    match result.unwrap_err() {
        HotRodError::IllegalLifecycleState {
            message, server: s, ..
        } => {
            assert_eq!(message, "stopping");
            assert_eq!(s, server());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_status_reads_nothing() {
    let payload = with_message("ignored");
    let (result, remaining) = check(0x42, &payload);

    assert!(matches!(result, Err(HotRodError::UnknownStatus { status: 0x42 })));
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Fatal);
    assert_eq!(remaining, payload.len());
}

#[test]
fn test_error_without_message_is_truncated() {
    let (result, _) = check(status::SERVER_ERROR_STATUS, &[]);
    assert!(matches!(
        result,
        Err(HotRodError::UnexpectedEndOfInput { .. })
    ));
}

// =============================================================================
// Previous Value Tests
// =============================================================================

#[test]
fn test_previous_value_present() {
    let codec = Codec30::default();
    let mut payload = Vec::new();
    write_array(&mut payload, b"old");

    let mut cursor: &[u8] = &payload;
    let previous = codec
        .return_possible_prev_value(
            &mut cursor,
            status::SUCCESS_WITH_PREVIOUS,
            &BytesMarshaller,
            &AllowList::default(),
            DEFAULT_MAX_ARRAY_LENGTH,
        )
        .unwrap()
        .unwrap();

    assert_eq!(previous.downcast_ref::<Vec<u8>>().unwrap(), b"old");
    assert!(cursor.is_empty());
}

#[test]
fn test_previous_value_empty_is_none() {
    let codec = Codec30::default();
    let payload = [0x00u8];

    let mut cursor: &[u8] = &payload;
    let previous = codec
        .return_possible_prev_value(
            &mut cursor,
            status::NOT_EXECUTED_WITH_PREVIOUS,
            &BytesMarshaller,
            &AllowList::default(),
            DEFAULT_MAX_ARRAY_LENGTH,
        )
        .unwrap();

    assert!(previous.is_none());
    assert!(cursor.is_empty());
}

#[test]
fn test_no_previous_value_reads_nothing() {
    let codec = Codec30::default();
    let payload = [0x03u8, b'a', b'b', b'c'];

    let mut cursor: &[u8] = &payload;
    let previous = codec
        .return_possible_prev_value(
            &mut cursor,
            status::NO_ERROR_STATUS,
            &BytesMarshaller,
            &AllowList::default(),
            DEFAULT_MAX_ARRAY_LENGTH,
        )
        .unwrap();

    assert!(previous.is_none());
    assert_eq!(cursor.len(), payload.len());
}

#[test]
fn test_previous_value_respects_configured_limit() {
    let config = CodecConfig::builder().max_array_length(4).build().unwrap();
    let codec = config.codec();
    let mut payload = Vec::new();
    write_array(&mut payload, &[0xAB; 64]);

    let mut cursor: &[u8] = &payload;
    let err = codec
        .return_possible_prev_value(
            &mut cursor,
            status::SUCCESS_WITH_PREVIOUS,
            &BytesMarshaller,
            &config.allow_list,
            config.max_array_length,
        )
        .unwrap_err();

    assert!(matches!(err, HotRodError::ArrayTooLarge { length: 64, max: 4 }));
    assert!(err.should_discard_connection());
}

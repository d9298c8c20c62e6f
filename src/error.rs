//! Error types for the Hot Rod codec
//!
//! Provides a unified error type for all encode/decode operations, grouped
//! by how the caller is expected to react to them.
//!
//! ## Categories
//! - **MalformedFrame**: bad magic, truncated input, bad varint. The stream
//!   can no longer be trusted, the connection must be discarded.
//! - **ProtocolMismatch**: a well-formed frame that does not answer the
//!   request in flight.
//! - **ServerError**: explicit error status with a message from the server.
//! - **NodeSuspected / IllegalLifecycleState**: the server hints that the
//!   operation may succeed against another member.
//! - **Fatal**: listener, event, topology and status values the client
//!   cannot interpret.

use thiserror::Error;

use crate::protocol::status;
use crate::topology::TopologyAddress;

/// Result type alias using HotRodError
pub type Result<T> = std::result::Result<T, HotRodError>;

/// Unified error type for codec operations
#[derive(Debug, Error)]
pub enum HotRodError {
    // -------------------------------------------------------------------------
    // Malformed Frame Errors
    // -------------------------------------------------------------------------
    #[error("Invalid magic number. Expected {expected:#x} and received {actual:#x}")]
    InvalidMagic { expected: u8, actual: u8 },

    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfInput { needed: usize, remaining: usize },

    #[error("Malformed varint: no terminating byte within {max_bytes} bytes")]
    MalformedVarint { max_bytes: usize },

    #[error("String is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Array length {length} exceeds maximum of {max}")]
    ArrayTooLarge { length: usize, max: usize },

    // -------------------------------------------------------------------------
    // Protocol Mismatch Errors
    // -------------------------------------------------------------------------
    #[error("[{cache}] Invalid response operation. Expected {expected:#x} and received {actual:#x}")]
    UnexpectedOpCode { cache: String, expected: u8, actual: u8 },

    #[error("Invalid event header: {field} expected {expected:#x} and received {actual:#x}")]
    InvalidEventHeader {
        field: &'static str,
        expected: u8,
        actual: u8,
    },

    // -------------------------------------------------------------------------
    // Server Reported Errors
    // -------------------------------------------------------------------------
    #[error("Server error (status {status:#04x}, message id {message_id}): {message}")]
    ServerError {
        message: String,
        status: u8,
        message_id: u64,
    },

    #[error("Node suspected while executing message id {message_id}: {message}")]
    NodeSuspected { message: String, message_id: u64 },

    #[error("Illegal lifecycle state on {server} (message id {message_id}): {message}")]
    IllegalLifecycleState {
        message: String,
        message_id: u64,
        server: TopologyAddress,
    },

    // -------------------------------------------------------------------------
    // Fatal Decode Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected listener id {actual}, expected {expected}")]
    ListenerIdMismatch { expected: String, actual: String },

    #[error("Unknown event op code {op_code:#04x}")]
    UnknownEvent { op_code: u8 },

    #[error("Segment owner index {index} out of range for {member_count} members")]
    InvalidTopologyReference { index: u32, member_count: usize },

    #[error("Unknown status: {status:#04x}")]
    UnknownStatus { status: u8 },

    #[error("Invalid encoded counter state {encoded:#04x}")]
    InvalidCounterState { encoded: u8 },

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("Marshalling error: {0}")]
    Marshalling(String),

    #[error("Class {class} is not in the allow list")]
    ClassNotAllowed { class: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Broad category of a [`HotRodError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedFrame,
    ProtocolMismatch,
    ServerError,
    NodeSuspected,
    IllegalLifecycleState,
    Fatal,
    Collaborator,
}

/// What the layer above the codec should do after a failure.
///
/// The codec never recovers by itself; it only classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Surface the error to the caller unchanged.
    Propagate,
    /// The operation may be retried against a different cluster member.
    RetryElsewhere,
    /// The connection is desynchronised and must be closed and re-established.
    DiscardConnection,
}

impl HotRodError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HotRodError::InvalidMagic { .. }
            | HotRodError::UnexpectedEndOfInput { .. }
            | HotRodError::MalformedVarint { .. }
            | HotRodError::InvalidUtf8(_)
            | HotRodError::ArrayTooLarge { .. } => ErrorKind::MalformedFrame,
            HotRodError::UnexpectedOpCode { .. } | HotRodError::InvalidEventHeader { .. } => {
                ErrorKind::ProtocolMismatch
            }
            HotRodError::ServerError { .. } => ErrorKind::ServerError,
            HotRodError::NodeSuspected { .. } => ErrorKind::NodeSuspected,
            HotRodError::IllegalLifecycleState { .. } => ErrorKind::IllegalLifecycleState,
            HotRodError::ListenerIdMismatch { .. }
            | HotRodError::UnknownEvent { .. }
            | HotRodError::InvalidTopologyReference { .. }
            | HotRodError::UnknownStatus { .. }
            | HotRodError::InvalidCounterState { .. } => ErrorKind::Fatal,
            HotRodError::Marshalling(_)
            | HotRodError::ClassNotAllowed { .. }
            | HotRodError::Config(_) => ErrorKind::Collaborator,
        }
    }

    /// Recovery hint for the connection and retry layers
    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            HotRodError::ServerError { status, .. } if status::desynchronizes_stream(*status) => {
                RecoveryHint::DiscardConnection
            }
            _ => match self.kind() {
                ErrorKind::MalformedFrame => RecoveryHint::DiscardConnection,
                ErrorKind::NodeSuspected | ErrorKind::IllegalLifecycleState => {
                    RecoveryHint::RetryElsewhere
                }
                _ => RecoveryHint::Propagate,
            },
        }
    }

    /// True when the server reported a command timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            HotRodError::ServerError { status, .. } if *status == status::COMMAND_TIMEOUT_STATUS
        )
    }

    /// Convenience for the connection layer
    pub fn should_discard_connection(&self) -> bool {
        self.recovery_hint() == RecoveryHint::DiscardConnection
    }
}

//! Protocol Module
//!
//! Constants and small value types of the Hot Rod wire protocol.
//!
//! ## Request Header
//! ```text
//! ┌───────┬───────────┬─────────┬────────┬────────────┬───────────┬───────┬─────────────┐
//! │ 0xA0  │ msgId     │ version │ opCode │ cacheName  │ flags     │ intel │ topologyId  │
//! │ (1)   │ (VLong)   │ (1)     │ (1)    │ (array)    │ (VInt)    │ (1)   │ (VInt)      │
//! └───────┴───────────┴─────────┴────────┴────────────┴───────────┴───────┴─────────────┘
//! ```
//!
//! ### Response Header
//! ```text
//! ┌───────┬───────────┬────────┬────────┬──────────────┬─────────────────────┐
//! │ 0xA1  │ msgId     │ opCode │ status │ topo marker  │ topology (if == 1)  │
//! │ (1)   │ (VLong)   │ (1)    │ (1)    │ (1)          │                     │
//! └───────┴───────────┴────────┴────────┴──────────────┴─────────────────────┘
//! ```
//!
//! Error payloads (message string) and operation payloads follow the
//! topology block.

pub mod flags;
pub mod opcode;
pub mod status;

pub use flags::{ClientIntelligence, Flags};
pub use opcode::Operation;
pub use status::StatusOutcome;

/// First byte of every request
pub const REQUEST_MAGIC: u8 = 0xA0;

/// First byte of every response and pushed event
pub const RESPONSE_MAGIC: u8 = 0xA1;

/// Topology id of a cache the client has not received a topology for yet
pub const DEFAULT_CACHE_TOPOLOGY: i32 = -1;

/// Marker byte announcing a topology block
pub const TOPOLOGY_CHANGE_MARKER: u8 = 1;

/// Supported protocol versions, written as the header version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ProtocolVersion {
    V20 = 20,
    V21 = 21,
    V22 = 22,
    V26 = 26,
    V30 = 30,
}

impl ProtocolVersion {
    /// Newest version this crate speaks
    pub const LATEST: ProtocolVersion = ProtocolVersion::V30;

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            20 => Some(ProtocolVersion::V20),
            21 => Some(ProtocolVersion::V21),
            22 => Some(ProtocolVersion::V22),
            26 => Some(ProtocolVersion::V26),
            30 => Some(ProtocolVersion::V30),
            _ => None,
        }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        ProtocolVersion::LATEST
    }
}

//! Server-pushed events
//!
//! ## Entry Event Format
//! ```text
//! magic(1) msgId(VLong) opCode(1) status(1) reserved(1)
//! listenerId(array) isCustom(1) isRetried(1)
//!   custom:   data(array)
//!   created:  key(array) version(8)
//!   modified: key(array) version(8)
//!   removed:  key(array)
//! ```
//!
//! ## Counter Event Format
//! ```text
//! magic(1) msgId(VLong) 0x66 status(1)=0 topology(1)=0
//! counterName(string) listenerId(array) state(1) oldValue(8) newValue(8)
//! ```

use bytes::Buf;

use super::header::read_message_id;
use super::marshaller::{AllowList, Marshaller, Object};
use super::status::check_for_errors_in_response_status;
use crate::error::{HotRodError, Result};
use crate::primitive::{
    read_array, read_array_limited, read_i64, read_string, read_u64, read_u8,
    DEFAULT_MAX_ARRAY_LENGTH,
};
use crate::protocol::opcode::{
    CACHE_ENTRY_CREATED_EVENT_RESPONSE, CACHE_ENTRY_MODIFIED_EVENT_RESPONSE,
    CACHE_ENTRY_REMOVED_EVENT_RESPONSE, COUNTER_EVENT_RESPONSE, ERROR_RESPONSE,
};
use crate::topology::TopologyAddress;

/// What a listener needs to decode the events addressed to it
pub struct EventContext<'a> {
    /// Id the listener was registered with
    pub listener_id: &'a [u8],
    pub marshaller: &'a dyn Marshaller,
    pub allow_list: &'a AllowList,
    /// Upper bound for key and payload arrays
    pub max_array_length: usize,
}

impl<'a> EventContext<'a> {
    pub fn new(listener_id: &'a [u8], marshaller: &'a dyn Marshaller, allow_list: &'a AllowList) -> Self {
        Self {
            listener_id,
            marshaller,
            allow_list,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
        }
    }

    pub fn with_max_array_length(mut self, max_array_length: usize) -> Self {
        self.max_array_length = max_array_length;
        self
    }
}

/// Kind of a client event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Created,
    Modified,
    Removed,
    Counter,
}

/// Bound state of a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterState {
    Valid,
    LowerBoundReached,
    UpperBoundReached,
}

/// Value change of a strong or weak counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterEvent {
    pub counter_name: String,
    pub listener_id: Vec<u8>,
    pub old_value: i64,
    pub old_state: CounterState,
    pub new_value: i64,
    pub new_state: CounterState,
}

/// A decoded event
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Created {
        listener_id: Vec<u8>,
        key: Object,
        version: u64,
        retried: bool,
    },
    Modified {
        listener_id: Vec<u8>,
        key: Object,
        version: u64,
        retried: bool,
    },
    Removed {
        listener_id: Vec<u8>,
        key: Object,
        retried: bool,
    },
    /// Payload produced by a server-side converter
    Custom {
        listener_id: Vec<u8>,
        data: Object,
        event_type: EventType,
        retried: bool,
    },
    Counter(CounterEvent),
}

impl ClientEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            ClientEvent::Created { .. } => EventType::Created,
            ClientEvent::Modified { .. } => EventType::Modified,
            ClientEvent::Removed { .. } => EventType::Removed,
            ClientEvent::Custom { event_type, .. } => *event_type,
            ClientEvent::Counter(_) => EventType::Counter,
        }
    }

    /// Id of the listener the event was addressed to
    pub fn listener_id(&self) -> &[u8] {
        match self {
            ClientEvent::Created { listener_id, .. }
            | ClientEvent::Modified { listener_id, .. }
            | ClientEvent::Removed { listener_id, .. }
            | ClientEvent::Custom { listener_id, .. } => listener_id,
            ClientEvent::Counter(event) => &event.listener_id,
        }
    }

    /// The server re-sent the event because the originating command was retried
    pub fn is_command_retried(&self) -> bool {
        match self {
            ClientEvent::Created { retried, .. }
            | ClientEvent::Modified { retried, .. }
            | ClientEvent::Removed { retried, .. }
            | ClientEvent::Custom { retried, .. } => *retried,
            ClientEvent::Counter(_) => false,
        }
    }

    pub fn key(&self) -> Option<&Object> {
        match self {
            ClientEvent::Created { key, .. }
            | ClientEvent::Modified { key, .. }
            | ClientEvent::Removed { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            ClientEvent::Created { version, .. } | ClientEvent::Modified { version, .. } => {
                Some(*version)
            }
            _ => None,
        }
    }

    pub fn event_data(&self) -> Option<&Object> {
        match self {
            ClientEvent::Custom { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl From<CounterEvent> for ClientEvent {
    fn from(event: CounterEvent) -> Self {
        ClientEvent::Counter(event)
    }
}

// =============================================================================
// Entry Events
// =============================================================================

/// Read a complete entry event, starting at the magic byte
pub fn read_event<B: Buf + ?Sized>(
    buf: &mut B,
    context: &EventContext<'_>,
    server: &TopologyAddress,
) -> Result<ClientEvent> {
    read_message_id(buf)?;
    let op_code = read_u8(buf)?;
    read_partial_event(buf, op_code, context, server)
}

/// Read the rest of an entry event whose op code has already been consumed
pub(crate) fn read_partial_event<B: Buf + ?Sized>(
    buf: &mut B,
    op_code: u8,
    context: &EventContext<'_>,
    server: &TopologyAddress,
) -> Result<ClientEvent> {
    let status = read_u8(buf)?;
    read_u8(buf)?; // no topology on events

    let event_type = match op_code {
        CACHE_ENTRY_CREATED_EVENT_RESPONSE => EventType::Created,
        CACHE_ENTRY_MODIFIED_EVENT_RESPONSE => EventType::Modified,
        CACHE_ENTRY_REMOVED_EVENT_RESPONSE => EventType::Removed,
        ERROR_RESPONSE => {
            check_for_errors_in_response_status(buf, None, status, server)?;
            return Err(HotRodError::UnknownEvent { op_code });
        }
        _ => return Err(HotRodError::UnknownEvent { op_code }),
    };

    let listener_id = read_array_limited(buf, context.max_array_length)?;
    check_listener_id(context.listener_id, &listener_id)?;

    let is_custom = read_u8(buf)? == 1;
    let retried = read_u8(buf)? == 1;

    let unmarshall = |buf: &mut B| -> Result<Object> {
        let bytes = read_array_limited(buf, context.max_array_length)?;
        context
            .marshaller
            .bytes_to_object(&bytes, status, context.allow_list)
    };

    let event = if is_custom {
        ClientEvent::Custom {
            listener_id,
            data: unmarshall(&mut *buf)?,
            event_type,
            retried,
        }
    } else {
        let key = unmarshall(&mut *buf)?;
        match event_type {
            EventType::Created => ClientEvent::Created {
                listener_id,
                key,
                version: read_u64(buf)?,
                retried,
            },
            EventType::Modified => ClientEvent::Modified {
                listener_id,
                key,
                version: read_u64(buf)?,
                retried,
            },
            _ => ClientEvent::Removed {
                listener_id,
                key,
                retried,
            },
        }
    };

    tracing::trace!("Decoded {:?} event (retried: {})", event_type, retried);
    Ok(event)
}

// =============================================================================
// Counter Events
// =============================================================================

/// Read a complete counter event, starting at the magic byte
pub fn read_counter_event<B: Buf + ?Sized>(buf: &mut B, listener_id: &[u8]) -> Result<CounterEvent> {
    read_message_id(buf)?;
    expect_header_byte(buf, "op code", COUNTER_EVENT_RESPONSE)?;
    expect_header_byte(buf, "status", 0)?;
    expect_header_byte(buf, "topology marker", 0)?;

    let counter_name = read_string(buf)?;
    let received = read_array(buf)?;
    check_listener_id(listener_id, &received)?;

    let encoded = read_u8(buf)?;
    let old_value = read_i64(buf)?;
    let new_value = read_i64(buf)?;
    let (old_state, new_state) = decode_counter_states(encoded)?;

    tracing::trace!(
        "Counter event for '{}': {} ({:?}) -> {} ({:?})",
        counter_name,
        old_value,
        old_state,
        new_value,
        new_state
    );

    Ok(CounterEvent {
        counter_name,
        listener_id: received,
        old_value,
        old_state,
        new_value,
        new_state,
    })
}

/// Split the packed state byte into (old, new). Old state sits in bits 0-1,
/// new state in bits 2-3.
pub fn decode_counter_states(encoded: u8) -> Result<(CounterState, CounterState)> {
    let decode = |bits: u8| match bits {
        0 => Ok(CounterState::Valid),
        1 => Ok(CounterState::LowerBoundReached),
        2 => Ok(CounterState::UpperBoundReached),
        _ => Err(HotRodError::InvalidCounterState { encoded }),
    };
    Ok((decode(encoded & 0x03)?, decode((encoded >> 2) & 0x03)?))
}

fn expect_header_byte<B: Buf + ?Sized>(buf: &mut B, field: &'static str, expected: u8) -> Result<()> {
    let actual = read_u8(buf)?;
    if actual != expected {
        return Err(HotRodError::InvalidEventHeader {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_listener_id(expected: &[u8], actual: &[u8]) -> Result<()> {
    if expected != actual {
        return Err(HotRodError::ListenerIdMismatch {
            expected: to_hex(expected),
            actual: to_hex(actual),
        });
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

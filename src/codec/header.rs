//! Request and response headers

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Buf, BufMut};

use super::event::{read_partial_event, ClientEvent, EventContext};
use super::status::check_for_errors_in_response_status;
use crate::error::{HotRodError, Result};
use crate::primitive::{
    estimate_array_size, estimate_vint_size, estimate_vlong_size, read_u8, read_vlong, write_array,
    write_vint, write_vlong,
};
use crate::protocol::opcode::{self, ERROR_RESPONSE};
use crate::protocol::status::{classify, StatusOutcome};
use crate::protocol::{
    ClientIntelligence, Flags, Operation, ProtocolVersion, REQUEST_MAGIC, RESPONSE_MAGIC,
};
use crate::topology::{
    read_new_topology_if_present, TopologyAddress, TopologyIdCell, TopologyOutcome,
    TransportFactory,
};

// =============================================================================
// Header Params
// =============================================================================

/// Per-request header values.
///
/// Built once per logical operation and reused across its retries. The
/// topology id is a shared cell, read when the header is written rather than
/// when the params are built.
#[derive(Debug, Clone)]
pub struct HeaderParams {
    message_id: u64,
    op_code: u8,
    op_resp_code: u8,
    cache_name: Vec<u8>,
    flags: Flags,
    client_intelligence: ClientIntelligence,
    topology_id: TopologyIdCell,
    topology_age: u32,
}

impl HeaderParams {
    /// Params for one of the standard operations
    pub fn new(operation: Operation, message_id: u64) -> Self {
        Self::with_op_codes(operation.request_code(), operation.response_code(), message_id)
    }

    /// Params for an operation outside [`Operation`], such as counter extensions
    pub fn with_op_codes(op_code: u8, op_resp_code: u8, message_id: u64) -> Self {
        Self {
            message_id,
            op_code,
            op_resp_code,
            cache_name: Vec::new(),
            flags: Flags::empty(),
            client_intelligence: ClientIntelligence::default(),
            topology_id: TopologyIdCell::default(),
            topology_age: 0,
        }
    }

    /// Target cache; empty selects the default cache
    pub fn with_cache_name(mut self, cache_name: impl Into<Vec<u8>>) -> Self {
        self.cache_name = cache_name.into();
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_client_intelligence(mut self, intelligence: ClientIntelligence) -> Self {
        self.client_intelligence = intelligence;
        self
    }

    /// Bind to a cache's shared topology id cell
    pub fn with_topology_id(mut self, topology_id: TopologyIdCell) -> Self {
        self.topology_id = topology_id;
        self
    }

    /// Cluster generation observed when the request was created
    pub fn with_topology_age(mut self, topology_age: u32) -> Self {
        self.topology_age = topology_age;
        self
    }

    pub fn message_id(&self) -> u64 {
        self.message_id
    }

    pub fn op_code(&self) -> u8 {
        self.op_code
    }

    pub fn response_code(&self) -> u8 {
        self.op_resp_code
    }

    pub fn cache_name(&self) -> &[u8] {
        &self.cache_name
    }

    /// Cache name for log and error messages
    pub fn cache_name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.cache_name).into_owned()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn client_intelligence(&self) -> ClientIntelligence {
        self.client_intelligence
    }

    pub fn topology_id(&self) -> &TopologyIdCell {
        &self.topology_id
    }

    pub fn topology_age(&self) -> u32 {
        self.topology_age
    }
}

/// Source of ascending message ids, shared by all connections of a client
#[derive(Debug)]
pub struct MessageIdGenerator {
    next: AtomicU64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Write Path
// =============================================================================

/// Write the request header for `params` using the given version byte
pub fn write_header<'a, B: BufMut + ?Sized>(
    buf: &mut B,
    params: &'a HeaderParams,
    version: ProtocolVersion,
) -> &'a HeaderParams {
    let topology_id = params.topology_id.get();

    buf.put_u8(REQUEST_MAGIC);
    write_vlong(buf, params.message_id);
    buf.put_u8(version.value());
    buf.put_u8(params.op_code);
    write_array(buf, &params.cache_name);
    write_vint(buf, params.flags.bits());
    buf.put_u8(params.client_intelligence.value());
    write_vint(buf, topology_id as u32);

    tracing::trace!(
        "[{}] Wrote header for messageId={}. Operation code: {:#04x}({}). Flags: {:#x}. Topology id: {}",
        params.cache_name_lossy(),
        params.message_id,
        params.op_code,
        opcode::name_of(params.op_code),
        params.flags.bits(),
        topology_id
    );

    params
}

/// Exact number of bytes [`write_header`] produces for `params`
pub fn estimate_header_size(params: &HeaderParams) -> usize {
    1 + estimate_vlong_size(params.message_id)
        + 1
        + 1
        + estimate_array_size(&params.cache_name)
        + estimate_vint_size(params.flags.bits())
        + 1
        + estimate_vint_size(params.topology_id.get() as u32)
}

// =============================================================================
// Read Path
// =============================================================================

/// Decoded response header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub message_id: u64,
    pub op_code: u8,
    pub status: u8,
    pub topology: TopologyOutcome,
}

impl ResponseHeader {
    pub fn outcome(&self) -> StatusOutcome {
        classify(self.status)
    }
}

/// A frame read from a connection that carries both responses and events
#[derive(Debug, Clone)]
pub enum HeaderOrEvent {
    Header(ResponseHeader),
    Event(ClientEvent),
}

/// Check the response magic and read the message id
pub fn read_message_id<B: Buf + ?Sized>(buf: &mut B) -> Result<u64> {
    let magic = read_u8(buf)?;
    if magic != RESPONSE_MAGIC {
        tracing::warn!(
            "Invalid magic number. Expected {:#x} and received {:#x}",
            RESPONSE_MAGIC,
            magic
        );
        return Err(HotRodError::InvalidMagic {
            expected: RESPONSE_MAGIC,
            actual: magic,
        });
    }

    let message_id = read_vlong(buf)?;
    tracing::trace!("Received response for messageId={}", message_id);
    Ok(message_id)
}

/// Read a complete response header
pub fn read_header<B: Buf + ?Sized>(
    buf: &mut B,
    params: &HeaderParams,
    factory: &dyn TransportFactory,
    server: &TopologyAddress,
) -> Result<ResponseHeader> {
    let message_id = read_message_id(buf)?;
    let op_code = read_u8(buf)?;
    read_partial_header(buf, message_id, op_code, params, factory, server)
}

/// Read a response header or, if the op code announces one, an entry event
pub fn read_header_or_event<B: Buf + ?Sized>(
    buf: &mut B,
    params: &HeaderParams,
    events: &EventContext<'_>,
    factory: &dyn TransportFactory,
    server: &TopologyAddress,
) -> Result<HeaderOrEvent> {
    let message_id = read_message_id(buf)?;
    let op_code = read_u8(buf)?;
    if opcode::is_entry_event(op_code) {
        let event = read_partial_event(buf, op_code, events, server)?;
        return Ok(HeaderOrEvent::Event(event));
    }
    read_partial_header(buf, message_id, op_code, params, factory, server).map(HeaderOrEvent::Header)
}

fn read_partial_header<B: Buf + ?Sized>(
    buf: &mut B,
    message_id: u64,
    op_code: u8,
    params: &HeaderParams,
    factory: &dyn TransportFactory,
    server: &TopologyAddress,
) -> Result<ResponseHeader> {
    // Status and topology are both consumed before any error is raised, the
    // error message sits behind the topology block.
    let status = read_u8(buf)?;
    let topology = read_new_topology_if_present(buf, params, factory)?;

    if op_code != params.op_resp_code {
        if op_code == ERROR_RESPONSE {
            check_for_errors_in_response_status(buf, Some(params), status, server)?;
        }
        return Err(HotRodError::UnexpectedOpCode {
            cache: params.cache_name_lossy(),
            expected: params.op_resp_code,
            actual: op_code,
        });
    }

    tracing::trace!(
        "[{}] Received operation code is: {:#04x}({})",
        params.cache_name_lossy(),
        op_code,
        opcode::name_of(op_code)
    );

    if !matches!(
        classify(status),
        StatusOutcome::Success | StatusOutcome::SuccessWithPrevious
    ) {
        check_for_errors_in_response_status(buf, Some(params), status, server)?;
    }

    Ok(ResponseHeader {
        message_id,
        op_code,
        status,
        topology,
    })
}

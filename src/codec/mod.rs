//! Codec Module
//!
//! Versioned encoder/decoder for request headers, response headers, status
//! errors and pushed events.
//!
//! ## Version Dispatch
//! [`Codec`] is the one contract every protocol version implements. Header,
//! status and event handling did not change across the supported versions
//! and are provided methods. The parameter encodings that did change are
//! required methods: [`Codec20`] implements the baseline and each later
//! version wraps its predecessor, overriding only what its version changed.
//!
//! ```text
//! Codec30 ─▶ Codec26 ─▶ Codec22 ─▶ Codec21 ─▶ Codec20
//!            interests  expiration listener   baseline
//! ```

mod event;
mod header;
mod marshaller;
mod params;
mod status;
mod versions;

pub use event::{
    decode_counter_states, read_counter_event, read_event, ClientEvent, CounterEvent,
    CounterState, EventContext, EventType,
};
pub use header::{
    estimate_header_size, read_header, read_header_or_event, read_message_id, write_header,
    HeaderOrEvent, HeaderParams, MessageIdGenerator, ResponseHeader,
};
pub use marshaller::{AllowList, BincodeMarshaller, BytesMarshaller, Marshaller, Object};
pub use params::{
    ClientListenerParams, EventInterests, Expiration, NamedFactory, TimeUnit, TIME_UNIT_DEFAULT,
    TIME_UNIT_INFINITE,
};
pub use status::check_for_errors_in_response_status;
pub use versions::{codec_for, Codec20, Codec21, Codec22, Codec26, Codec30};

use bytes::{Buf, BufMut};

use crate::error::Result;
use crate::primitive::read_array_limited;
use crate::protocol::status::has_previous;
use crate::protocol::ProtocolVersion;
use crate::topology::{TopologyAddress, TransportFactory};

/// Wire codec for one protocol version
pub trait Codec: Send + Sync {
    /// Version byte written into request headers
    fn version(&self) -> ProtocolVersion;

    // -------------------------------------------------------------------------
    // Version-specific encodings
    // -------------------------------------------------------------------------

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration);

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize;

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams);

    /// No-op for versions without interest filtering
    fn write_client_listener_interests(&self, buf: &mut dyn BufMut, interests: EventInterests);

    // -------------------------------------------------------------------------
    // Shared header handling
    // -------------------------------------------------------------------------

    /// Write the request header; returns `params` for chaining
    fn write_header<'a>(&self, buf: &mut dyn BufMut, params: &'a HeaderParams) -> &'a HeaderParams {
        header::write_header(buf, params, self.version())
    }

    fn estimate_header_size(&self, params: &HeaderParams) -> usize {
        header::estimate_header_size(params)
    }

    fn read_message_id(&self, buf: &mut dyn Buf) -> Result<u64> {
        header::read_message_id(buf)
    }

    /// Read a response header, applying any topology it carries and raising
    /// error statuses
    fn read_header(
        &self,
        buf: &mut dyn Buf,
        params: &HeaderParams,
        factory: &dyn TransportFactory,
        server: &TopologyAddress,
    ) -> Result<ResponseHeader> {
        header::read_header(buf, params, factory, server)
    }

    fn read_header_or_event(
        &self,
        buf: &mut dyn Buf,
        params: &HeaderParams,
        events: &EventContext<'_>,
        factory: &dyn TransportFactory,
        server: &TopologyAddress,
    ) -> Result<HeaderOrEvent> {
        header::read_header_or_event(buf, params, events, factory, server)
    }

    // -------------------------------------------------------------------------
    // Shared status and event handling
    // -------------------------------------------------------------------------

    fn check_response_status(
        &self,
        buf: &mut dyn Buf,
        params: Option<&HeaderParams>,
        status: u8,
        server: &TopologyAddress,
    ) -> Result<()> {
        status::check_for_errors_in_response_status(buf, params, status, server)
    }

    /// Read the previous value if `status` says one follows. An empty array
    /// means the entry had no previous value; one longer than
    /// `max_array_length` is rejected.
    fn return_possible_prev_value(
        &self,
        buf: &mut dyn Buf,
        status: u8,
        marshaller: &dyn Marshaller,
        allow_list: &AllowList,
        max_array_length: usize,
    ) -> Result<Option<Object>> {
        if !has_previous(status) {
            return Ok(None);
        }
        let bytes = read_array_limited(buf, max_array_length)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        marshaller.bytes_to_object(&bytes, status, allow_list).map(Some)
    }

    fn read_event(
        &self,
        buf: &mut dyn Buf,
        events: &EventContext<'_>,
        server: &TopologyAddress,
    ) -> Result<ClientEvent> {
        event::read_event(buf, events, server)
    }

    fn read_counter_event(&self, buf: &mut dyn Buf, listener_id: &[u8]) -> Result<CounterEvent> {
        event::read_counter_event(buf, listener_id)
    }
}

//! One codec per protocol version

use bytes::BufMut;

use super::params::{
    estimate_expiration_v20, estimate_expiration_v22, write_expiration_v20, write_expiration_v22,
    write_listener_interests_v26, write_listener_params_v20, write_listener_params_v21,
};
use super::{ClientListenerParams, Codec, EventInterests, Expiration};
use crate::protocol::ProtocolVersion;

/// Codec for the version in question
pub fn codec_for(version: ProtocolVersion) -> Box<dyn Codec> {
    match version {
        ProtocolVersion::V20 => Box::new(Codec20),
        ProtocolVersion::V21 => Box::new(Codec21::default()),
        ProtocolVersion::V22 => Box::new(Codec22::default()),
        ProtocolVersion::V26 => Box::new(Codec26::default()),
        ProtocolVersion::V30 => Box::new(Codec30::default()),
    }
}

/// 2.0 baseline
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec20;

impl Codec for Codec20 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V20
    }

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration) {
        write_expiration_v20(buf, lifespan, max_idle);
    }

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize {
        estimate_expiration_v20(lifespan, max_idle)
    }

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams) {
        write_listener_params_v20(buf, listener);
    }

    fn write_client_listener_interests(&self, _buf: &mut dyn BufMut, _interests: EventInterests) {}
}

/// 2.1: listener registration carries the raw-data flag
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec21 {
    previous: Codec20,
}

impl Codec for Codec21 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V21
    }

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration) {
        self.previous.write_expiration_params(buf, lifespan, max_idle);
    }

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize {
        self.previous.estimate_expiration_size(lifespan, max_idle)
    }

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams) {
        write_listener_params_v21(buf, listener);
    }

    fn write_client_listener_interests(&self, buf: &mut dyn BufMut, interests: EventInterests) {
        self.previous.write_client_listener_interests(buf, interests);
    }
}

/// 2.2: expiration amounts carry their time unit
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec22 {
    previous: Codec21,
}

impl Codec for Codec22 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V22
    }

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration) {
        write_expiration_v22(buf, lifespan, max_idle);
    }

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize {
        estimate_expiration_v22(lifespan, max_idle)
    }

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams) {
        self.previous.write_client_listener_params(buf, listener);
    }

    fn write_client_listener_interests(&self, buf: &mut dyn BufMut, interests: EventInterests) {
        self.previous.write_client_listener_interests(buf, interests);
    }
}

/// 2.6: listeners declare which event kinds they want
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec26 {
    previous: Codec22,
}

impl Codec for Codec26 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V26
    }

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration) {
        self.previous.write_expiration_params(buf, lifespan, max_idle);
    }

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize {
        self.previous.estimate_expiration_size(lifespan, max_idle)
    }

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams) {
        self.previous.write_client_listener_params(buf, listener);
    }

    fn write_client_listener_interests(&self, buf: &mut dyn BufMut, interests: EventInterests) {
        write_listener_interests_v26(buf, interests);
    }
}

/// 3.0: same encodings as 2.6 under a new version byte
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec30 {
    previous: Codec26,
}

impl Codec for Codec30 {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V30
    }

    fn write_expiration_params(&self, buf: &mut dyn BufMut, lifespan: Expiration, max_idle: Expiration) {
        self.previous.write_expiration_params(buf, lifespan, max_idle);
    }

    fn estimate_expiration_size(&self, lifespan: Expiration, max_idle: Expiration) -> usize {
        self.previous.estimate_expiration_size(lifespan, max_idle)
    }

    fn write_client_listener_params(&self, buf: &mut dyn BufMut, listener: &ClientListenerParams) {
        self.previous.write_client_listener_params(buf, listener);
    }

    fn write_client_listener_interests(&self, buf: &mut dyn BufMut, interests: EventInterests) {
        self.previous.write_client_listener_interests(buf, interests);
    }
}

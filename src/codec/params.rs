//! Operation parameters whose encoding changed between protocol versions
//!
//! Each encoding is a free function named after the version that introduced
//! it; the versioned codecs pick the right one.

use bitflags::bitflags;
use bytes::BufMut;

use crate::primitive::{
    estimate_vint_size, estimate_vlong_size, write_array, write_string, write_vint, write_vlong,
};

// =============================================================================
// Expiration
// =============================================================================

/// Time unit of an expiration amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Unit code used by the 2.2+ expiration encoding
    pub fn code(self) -> u8 {
        match self {
            TimeUnit::Seconds => 0x00,
            TimeUnit::Milliseconds => 0x01,
            TimeUnit::Nanoseconds => 0x02,
            TimeUnit::Microseconds => 0x03,
            TimeUnit::Minutes => 0x04,
            TimeUnit::Hours => 0x05,
            TimeUnit::Days => 0x06,
        }
    }

    fn nanos(self) -> u128 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }
}

/// Unit code meaning "use the server's configured default"
pub const TIME_UNIT_DEFAULT: u8 = 0x07;
/// Unit code meaning "never expire"
pub const TIME_UNIT_INFINITE: u8 = 0x08;

/// Lifespan or max-idle of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiration {
    /// Server-side default
    #[default]
    Default,
    /// Never expires
    Infinite,
    /// Expires after the amount; an amount of zero is treated as `Default`
    After(u64, TimeUnit),
}

impl Expiration {
    fn timed(self) -> Option<(u64, TimeUnit)> {
        match self {
            Expiration::After(amount, unit) if amount > 0 => Some((amount, unit)),
            _ => None,
        }
    }

    fn unit_code(self) -> u8 {
        match self {
            Expiration::Infinite => TIME_UNIT_INFINITE,
            _ => self.timed().map_or(TIME_UNIT_DEFAULT, |(_, unit)| unit.code()),
        }
    }

    /// Whole seconds as sent by the 2.0 encoding: rounded up, -1 for
    /// infinite, 0 for default. The flag is set when the amount did not fit
    /// and was clamped to `i32::MAX`.
    fn seconds(self) -> (i32, bool) {
        match self {
            Expiration::Infinite => (-1, false),
            _ => match self.timed() {
                None => (0, false),
                Some((amount, unit)) => {
                    let nanos = u128::from(amount) * unit.nanos();
                    let seconds = nanos.div_ceil(1_000_000_000);
                    match i32::try_from(seconds) {
                        Ok(seconds) => (seconds, false),
                        Err(_) => (i32::MAX, true),
                    }
                }
            },
        }
    }
}

/// 2.0: lifespan and max-idle as VInt seconds
pub fn write_expiration_v20<B: BufMut + ?Sized>(buf: &mut B, lifespan: Expiration, max_idle: Expiration) {
    for expiration in [lifespan, max_idle] {
        let (seconds, clamped) = expiration.seconds();
        if clamped {
            tracing::warn!(
                "Expiration value greater than the max supported size (i32::MAX seconds), this can cause precision loss"
            );
        }
        write_vint(buf, seconds as u32);
    }
}

pub fn estimate_expiration_v20(lifespan: Expiration, max_idle: Expiration) -> usize {
    estimate_vint_size(lifespan.seconds().0 as u32) + estimate_vint_size(max_idle.seconds().0 as u32)
}

/// 2.2: unit byte (lifespan high nibble, max-idle low nibble), then a VLong
/// amount for each timed value
pub fn write_expiration_v22<B: BufMut + ?Sized>(buf: &mut B, lifespan: Expiration, max_idle: Expiration) {
    buf.put_u8((lifespan.unit_code() << 4) | max_idle.unit_code());
    if let Some((amount, _)) = lifespan.timed() {
        write_vlong(buf, amount);
    }
    if let Some((amount, _)) = max_idle.timed() {
        write_vlong(buf, amount);
    }
}

pub fn estimate_expiration_v22(lifespan: Expiration, max_idle: Expiration) -> usize {
    1 + lifespan.timed().map_or(0, |(amount, _)| estimate_vlong_size(amount))
        + max_idle.timed().map_or(0, |(amount, _)| estimate_vlong_size(amount))
}

// =============================================================================
// Client Listeners
// =============================================================================

/// Server-side filter or converter factory and its parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedFactory {
    /// Empty when no factory is used
    pub name: String,
    pub params: Vec<Vec<u8>>,
}

impl NamedFactory {
    pub fn new(name: impl Into<String>, params: Vec<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Registration parameters of a client listener
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientListenerParams {
    pub include_current_state: bool,
    pub filter_factory: NamedFactory,
    pub converter_factory: NamedFactory,
    /// Receive keys and values unmarshalled (2.1+)
    pub use_raw_data: bool,
}

/// 2.0: include-current-state byte, filter factory, converter factory
pub fn write_listener_params_v20<B: BufMut + ?Sized>(buf: &mut B, listener: &ClientListenerParams) {
    buf.put_u8(u8::from(listener.include_current_state));
    write_named_factory(buf, &listener.filter_factory);
    write_named_factory(buf, &listener.converter_factory);
}

/// 2.1: the 2.0 layout followed by a use-raw-data byte
pub fn write_listener_params_v21<B: BufMut + ?Sized>(buf: &mut B, listener: &ClientListenerParams) {
    write_listener_params_v20(buf, listener);
    buf.put_u8(u8::from(listener.use_raw_data));
}

fn write_named_factory<B: BufMut + ?Sized>(buf: &mut B, factory: &NamedFactory) {
    write_string(buf, &factory.name);
    if !factory.name.is_empty() {
        buf.put_u8(factory.params.len() as u8);
        for param in &factory.params {
            write_array(buf, param);
        }
    }
}

bitflags! {
    /// Event kinds a listener subscribes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventInterests: u32 {
        const CREATED  = 0x01;
        const MODIFIED = 0x02;
        const REMOVED  = 0x04;
        const EXPIRED  = 0x08;
        const ALL = Self::CREATED.bits()
            | Self::MODIFIED.bits()
            | Self::REMOVED.bits()
            | Self::EXPIRED.bits();
    }
}

impl Default for EventInterests {
    fn default() -> Self {
        EventInterests::ALL
    }
}

/// 2.6: interest bitmask as a VInt
pub fn write_listener_interests_v26<B: BufMut + ?Sized>(buf: &mut B, interests: EventInterests) {
    write_vint(buf, interests.bits());
}

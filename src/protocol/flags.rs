//! Request flags and client intelligence

use bitflags::bitflags;

bitflags! {
    /// Per-request flag bitmask, written as a VInt in the header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        const FORCE_RETURN_VALUE         = 0x0001;
        const DEFAULT_LIFESPAN           = 0x0002;
        const DEFAULT_MAXIDLE            = 0x0004;
        const SKIP_CACHE_LOAD            = 0x0008;
        const SKIP_INDEXING              = 0x0010;
        const SKIP_LISTENER_NOTIFICATION = 0x0020;
    }
}

/// How much topology information the client asks the server for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ClientIntelligence {
    /// No topology updates
    Basic = 0x01,
    /// Member list updates
    TopologyAware = 0x02,
    /// Member list plus segment ownership
    #[default]
    HashDistributionAware = 0x03,
}

impl ClientIntelligence {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(ClientIntelligence::Basic),
            0x02 => Some(ClientIntelligence::TopologyAware),
            0x03 => Some(ClientIntelligence::HashDistributionAware),
            _ => None,
        }
    }
}

//! # hotrod-codec
//!
//! Client-side codec for the Hot Rod remote cache protocol:
//! - Request header framing for every supported protocol version
//! - Response header decoding with magic, message id and op code checks
//! - Cluster topology and consistent-hash segment ownership updates
//! - Status classification into typed errors with recovery hints
//! - Server-pushed cache entry and counter events
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Operations / Connection Layer                │
//! │                (external: I/O, pooling, retries)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Codec (per version)                      │
//! │        header · status · events · versioned params           │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌───────────────────┐
//!   │    Topology     │──── apply ───▶│  ClusterTopology  │
//!   │    Decoder      │               │  (RwLock, shared) │
//!   └────────┬────────┘               └───────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │   Primitives    │
//!   │ (VInt, arrays)  │
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod primitive;
pub mod protocol;
pub mod topology;
pub mod codec;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, HotRodError, RecoveryHint, Result};
pub use config::CodecConfig;
pub use codec::{Codec, HeaderParams};
pub use topology::{ClusterTopology, TopologyAddress, TransportFactory};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hotrod-codec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

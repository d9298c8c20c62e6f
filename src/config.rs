//! Configuration for the codec
//!
//! Centralized configuration with sensible defaults.

use crate::codec::{codec_for, AllowList, Codec, EventContext, HeaderParams, Marshaller};
use crate::error::{HotRodError, Result};
use crate::primitive::DEFAULT_MAX_ARRAY_LENGTH;
use crate::protocol::{ClientIntelligence, Operation, ProtocolVersion};
use crate::topology::ClusterTopology;

/// Codec configuration
#[derive(Debug, Clone)]
pub struct CodecConfig {
    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Protocol version spoken with the servers
    pub protocol_version: ProtocolVersion,

    /// Topology detail requested in every header
    pub client_intelligence: ClientIntelligence,

    // -------------------------------------------------------------------------
    // Decoding Limits
    // -------------------------------------------------------------------------
    /// Longest key, value or listener id array accepted from the server
    pub max_array_length: usize,

    // -------------------------------------------------------------------------
    // Marshalling Configuration
    // -------------------------------------------------------------------------
    /// Types the marshaller may produce for compatibility-mode responses
    pub allow_list: AllowList,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::LATEST,
            client_intelligence: ClientIntelligence::HashDistributionAware,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            allow_list: AllowList::default(),
        }
    }
}

impl CodecConfig {
    /// Create a new config builder
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Reject settings the codec cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_array_length == 0 {
            return Err(HotRodError::Config(
                "max_array_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Codec for the configured protocol version
    pub fn codec(&self) -> Box<dyn Codec> {
        codec_for(self.protocol_version)
    }

    /// Header params for a new request, bound to the cluster's state for
    /// `cache_name` and carrying the configured intelligence
    pub fn header_params(
        &self,
        cluster: &ClusterTopology,
        operation: Operation,
        message_id: u64,
        cache_name: &[u8],
    ) -> HeaderParams {
        cluster
            .header_params(operation, message_id, cache_name)
            .with_client_intelligence(self.client_intelligence)
    }

    /// Event decoding context using the configured limits and allow list
    pub fn event_context<'a>(
        &'a self,
        listener_id: &'a [u8],
        marshaller: &'a dyn Marshaller,
    ) -> EventContext<'a> {
        EventContext::new(listener_id, marshaller, &self.allow_list)
            .with_max_array_length(self.max_array_length)
    }
}

/// Builder for CodecConfig
#[derive(Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    /// Set the protocol version
    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Set the client intelligence level
    pub fn client_intelligence(mut self, intelligence: ClientIntelligence) -> Self {
        self.config.client_intelligence = intelligence;
        self
    }

    /// Set the longest accepted array (in bytes)
    pub fn max_array_length(mut self, length: usize) -> Self {
        self.config.max_array_length = length;
        self
    }

    /// Set the marshaller allow list
    pub fn allow_list(mut self, allow_list: AllowList) -> Self {
        self.config.allow_list = allow_list;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<CodecConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Shared helpers for building response frames byte by byte.

#![allow(dead_code)]

use hotrod_codec::primitive::{write_array, write_string, write_vint, write_vlong};
use hotrod_codec::protocol::RESPONSE_MAGIC;
use hotrod_codec::TopologyAddress;

/// Fluent builder for raw response bytes
#[derive(Default)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Magic and message id
    pub fn response(message_id: u64) -> Self {
        let mut frame = Frame::default();
        frame.bytes.push(RESPONSE_MAGIC);
        write_vlong(&mut frame.bytes, message_id);
        frame
    }

    pub fn byte(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn vint(mut self, value: u32) -> Self {
        write_vint(&mut self.bytes, value);
        self
    }

    pub fn array(mut self, value: &[u8]) -> Self {
        write_array(&mut self.bytes, value);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        write_string(&mut self.bytes, value);
        self
    }

    pub fn long(mut self, value: i64) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Topology marker plus a topology block
    pub fn topology(mut self, topology_id: u32, members: &[TopologyAddress]) -> Self {
        self = self.byte(1).vint(topology_id).vint(members.len() as u32);
        for member in members {
            self = self.string(member.host());
            self.bytes.extend_from_slice(&member.port().to_be_bytes());
        }
        self
    }

    /// Hash section: version, segment count and owner indices per segment
    pub fn hash(mut self, version: u8, segments: &[Vec<u32>]) -> Self {
        self = self.byte(version).vint(segments.len() as u32);
        if version > 0 {
            for owners in segments {
                self = self.byte(owners.len() as u8);
                for index in owners {
                    self = self.vint(*index);
                }
            }
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn server() -> TopologyAddress {
    TopologyAddress::new("127.0.0.1", 11222)
}

pub fn members(count: u16) -> Vec<TopologyAddress> {
    (0..count)
        .map(|i| TopologyAddress::new(format!("node{i}"), 11222 + i))
        .collect()
}

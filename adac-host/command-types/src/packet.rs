// Licensed under the Apache-2.0 license

//! Packet Headers
//!
//! Fixed headers framing every request and response on the wire

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Header shared by request and response packets.
///
/// `code` is the command ID in a request and the status in a response.
/// `data_count` counts the 32-bit payload words that follow the header.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct PacketHeader {
    pub code: u16,
    pub data_count: u16,
}

/// Size of [`PacketHeader`] in bytes
pub const PACKET_HEADER_SIZE: usize = core::mem::size_of::<PacketHeader>();

/// Size of one payload word in bytes
pub const WORD_SIZE: usize = 4;

impl PacketHeader {
    pub fn new(code: u16, data_count: u16) -> Self {
        Self { code, data_count }
    }

    /// Number of payload bytes announced by the header
    pub fn payload_len(&self) -> usize {
        self.data_count as usize * WORD_SIZE
    }
}

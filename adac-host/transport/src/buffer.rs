// Licensed under the Apache-2.0 license

//! Packet staging buffer
//!
//! Requests are serialized into, and responses received into, the same region.
//! The buffer moves `Empty -> Request -> Empty` when a request is built and
//! released, and `Empty -> Response -> Empty` when a response is received and
//! released. Packets borrow the buffer mutably so the compiler rules out a
//! second live packet; the status is still tracked so a leaked packet keeps
//! the buffer locked instead of letting it be silently reused.

use crate::error::{TransportError, TransportResult};
use crate::tlv::TlvIter;
use adac_host_command_types::{AdacStatus, PacketHeader, PACKET_HEADER_SIZE, WORD_SIZE};
use zerocopy::IntoBytes;

/// Largest packet, header included, the buffer can stage
pub const MAX_PACKET_SIZE: usize = 4096;

/// Ownership state of a [`PacketBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStatus {
    Empty,
    Request,
    Response,
}

pub struct PacketBuffer {
    storage: [u8; MAX_PACKET_SIZE],
    capacity: usize,
    status: BufferStatus,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PacketBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PacketBuffer")
            .field("capacity", &self.capacity)
            .field("status", &self.status)
            .finish()
    }
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PACKET_SIZE)
    }

    /// Create a buffer limited to `capacity` bytes.
    ///
    /// The capacity is clamped to `PACKET_HEADER_SIZE..=MAX_PACKET_SIZE` and
    /// rounded down to a whole number of words. Any adjustment is logged as a
    /// warning.
    pub fn with_capacity(requested: usize) -> Self {
        let capacity = requested.clamp(PACKET_HEADER_SIZE, MAX_PACKET_SIZE) & !(WORD_SIZE - 1);
        if capacity != requested {
            log::warn!(
                "Packet buffer capacity {} adjusted to {} bytes",
                requested,
                capacity
            );
        }
        Self {
            storage: [0u8; MAX_PACKET_SIZE],
            capacity,
            status: BufferStatus::Empty,
        }
    }

    pub fn status(&self) -> BufferStatus {
        self.status
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest request payload that fits behind the header
    pub fn max_payload(&self) -> usize {
        self.capacity - PACKET_HEADER_SIZE
    }

    /// Serialize a request into the buffer.
    ///
    /// `data` must be a whole number of 32-bit words; its length becomes the
    /// header's `data_count`.
    pub fn build_request(&mut self, command: u16, data: &[u8]) -> TransportResult<RequestPacket<'_>> {
        if self.status != BufferStatus::Empty {
            return Err(TransportError::BufferBusy);
        }
        if data.len() > self.max_payload() {
            return Err(TransportError::RequestTooLarge {
                size: data.len(),
                max: self.max_payload(),
            });
        }
        if data.len() % WORD_SIZE != 0 {
            return Err(TransportError::UnalignedPayload(data.len()));
        }

        let header = PacketHeader::new(command, (data.len() / WORD_SIZE) as u16);
        self.storage[..PACKET_HEADER_SIZE].copy_from_slice(header.as_bytes());
        self.storage[PACKET_HEADER_SIZE..PACKET_HEADER_SIZE + data.len()].copy_from_slice(data);
        self.status = BufferStatus::Request;

        Ok(RequestPacket {
            buffer: self,
            header,
        })
    }

    /// Reserve the buffer for an incoming response
    pub fn lock_response(&mut self) -> TransportResult<ResponsePacket<'_>> {
        if self.status != BufferStatus::Empty {
            return Err(TransportError::BufferBusy);
        }
        self.status = BufferStatus::Response;
        Ok(ResponsePacket {
            buffer: self,
            header: PacketHeader::new(0, 0),
        })
    }

    fn release(&mut self) {
        self.status = BufferStatus::Empty;
    }
}

/// A request staged in the packet buffer
pub struct RequestPacket<'a> {
    buffer: &'a mut PacketBuffer,
    header: PacketHeader,
}

impl RequestPacket<'_> {
    pub fn command(&self) -> u16 {
        self.header.code
    }

    pub fn data_count(&self) -> u16 {
        self.header.data_count
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer.storage[PACKET_HEADER_SIZE..PACKET_HEADER_SIZE + self.header.payload_len()]
    }

    /// Header and payload exactly as written to the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.storage[..PACKET_HEADER_SIZE + self.header.payload_len()]
    }

    /// Hand the buffer back
    pub fn release(self) {}
}

impl Drop for RequestPacket<'_> {
    fn drop(&mut self) {
        self.buffer.release();
    }
}

/// A response received into the packet buffer
#[derive(Debug)]
pub struct ResponsePacket<'a> {
    buffer: &'a mut PacketBuffer,
    header: PacketHeader,
}

impl ResponsePacket<'_> {
    /// Raw status code as received
    pub fn status(&self) -> u16 {
        self.header.code
    }

    /// Status code, if it is one the host understands
    pub fn adac_status(&self) -> Option<AdacStatus> {
        AdacStatus::from_raw(self.header.code)
    }

    pub fn data_count(&self) -> u16 {
        self.header.data_count
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer.storage[PACKET_HEADER_SIZE..PACKET_HEADER_SIZE + self.header.payload_len()]
    }

    /// Walk the payload as a sequence of TLV records
    pub fn tlvs(&self) -> TlvIter<'_> {
        TlvIter::new(self.data())
    }

    /// Hand the buffer back
    pub fn release(self) {}

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.capacity
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        let capacity = self.buffer.capacity;
        &mut self.buffer.storage[..capacity]
    }

    pub(crate) fn set_header(&mut self, header: PacketHeader) {
        self.header = header;
    }
}

impl Drop for ResponsePacket<'_> {
    fn drop(&mut self) {
        self.buffer.release();
    }
}

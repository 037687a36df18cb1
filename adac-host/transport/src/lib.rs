// Licensed under the Apache-2.0 license

//! ADAC Transport Layer
//!
//! Packet framing and byte transport for ADAC debug host communication.
//!
//! A single [`PacketBuffer`] stages every request and response. It has exactly
//! one owner at a time: building a request or receiving a response borrows it
//! mutably, and dropping the resulting packet hands it back.

#![no_std]

pub mod buffer;
pub mod error;
pub mod tlv;
pub mod transports;

// Re-export commonly used types
pub use buffer::{BufferStatus, PacketBuffer, RequestPacket, ResponsePacket, MAX_PACKET_SIZE};
pub use error::{TransportError, TransportResult};
pub use tlv::{split_tlvs, Tlv, TlvIter};

// Re-export message transport types specifically
pub use transports::message::{receive_packet, DriverError, MessageDriver, MessageTransport};

/// Transport trait for device communication
pub trait Transport: Send {
    fn connect(&mut self) -> TransportResult<()>;
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Write a request packet, header first, to the target
    fn send(&mut self, packet: &RequestPacket<'_>) -> TransportResult<()>;

    /// Read one response packet into `buffer`
    fn receive<'b>(&mut self, buffer: &'b mut PacketBuffer) -> TransportResult<ResponsePacket<'b>>;

    fn is_connected(&self) -> bool;
}

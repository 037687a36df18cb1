// Licensed under the Apache-2.0 license

//! Message Transport Implementation
//!
//! Carries ADAC packets over any reliable byte stream. The packet header is
//! written and read first; `data_count` then tells the reader how many payload
//! words follow.

use crate::buffer::{PacketBuffer, RequestPacket, ResponsePacket};
use crate::{Transport, TransportError, TransportResult};
use adac_host_command_types::{PacketHeader, PACKET_HEADER_SIZE};
use zerocopy::FromBytes;

/// Trait for byte stream communication with a debug target
pub trait MessageDriver: Send {
    /// Write some of `data`, returning how many bytes were accepted.
    /// Returning `Ok(0)` means the stream can take no more.
    fn write(&mut self, data: &[u8]) -> Result<usize, DriverError>;

    /// Read into `buffer`, returning how many bytes arrived.
    /// Returning `Ok(0)` means the stream has ended.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, DriverError>;

    /// Check if the link is ready
    fn is_ready(&self) -> bool;

    /// Connect to the target
    fn connect(&mut self) -> Result<(), DriverError>;

    /// Disconnect from the target
    fn disconnect(&mut self) -> Result<(), DriverError>;
}

/// Driver error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    NotReady,
    ConnectionRefused,
    Timeout,
    Closed,
    CommunicationError,
}

/// Write all of `data`, failing on a short write
fn write_all(driver: &mut dyn MessageDriver, data: &[u8]) -> TransportResult<()> {
    let mut sent = 0;
    while sent < data.len() {
        match driver.write(&data[sent..])? {
            0 => return Err(TransportError::SendFailed(Some("Short write"))),
            n => sent += n,
        }
    }
    Ok(())
}

/// Fill `buffer` completely, failing on a short read
fn read_exact(driver: &mut dyn MessageDriver, buffer: &mut [u8]) -> TransportResult<()> {
    let mut received = 0;
    while received < buffer.len() {
        match driver.read(&mut buffer[received..])? {
            0 => return Err(TransportError::ReceiveFailed(Some("Short read"))),
            n => received += n,
        }
    }
    Ok(())
}

/// Receive one packet from `driver` into `buffer`.
///
/// The announced payload size is checked against the buffer capacity before
/// any payload byte is read.
pub fn receive_packet<'b>(
    driver: &mut dyn MessageDriver,
    buffer: &'b mut PacketBuffer,
) -> TransportResult<ResponsePacket<'b>> {
    let mut packet = buffer.lock_response()?;
    let capacity = packet.capacity();

    let storage = packet.storage_mut();
    if let Err(err) = read_exact(driver, &mut storage[..PACKET_HEADER_SIZE]) {
        log::error!("Error receiving message header: {}", err);
        return Err(err);
    }
    let header = PacketHeader::read_from_bytes(&storage[..PACKET_HEADER_SIZE])
        .map_err(|_| TransportError::ReceiveFailed(Some("Malformed header")))?;

    let total = PACKET_HEADER_SIZE + header.payload_len();
    if total > capacity {
        log::error!("Message would overflow buffer ({} > {})", total, capacity);
        return Err(TransportError::ResponseOverflow {
            size: total,
            capacity,
        });
    }

    if let Err(err) = read_exact(driver, &mut storage[PACKET_HEADER_SIZE..total]) {
        log::error!("Error receiving message body: {}", err);
        return Err(err);
    }

    packet.set_header(header);
    Ok(packet)
}

/// Message Transport using dynamic dispatch
pub struct MessageTransport<'a> {
    driver: &'a mut dyn MessageDriver,
    connected: bool,
}

impl<'a> MessageTransport<'a> {
    pub fn new(driver: &'a mut dyn MessageDriver) -> Self {
        Self {
            driver,
            connected: false,
        }
    }
}

impl Transport for MessageTransport<'_> {
    fn connect(&mut self) -> TransportResult<()> {
        self.driver.connect().map_err(TransportError::from)?;
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.driver.disconnect().map_err(TransportError::from)?;
        self.connected = false;
        Ok(())
    }

    fn send(&mut self, packet: &RequestPacket<'_>) -> TransportResult<()> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        write_all(self.driver, packet.as_bytes())
    }

    fn receive<'b>(&mut self, buffer: &'b mut PacketBuffer) -> TransportResult<ResponsePacket<'b>> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        receive_packet(self.driver, buffer)
    }

    fn is_connected(&self) -> bool {
        self.connected && self.driver.is_ready()
    }
}

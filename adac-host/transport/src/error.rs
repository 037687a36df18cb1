// Licensed under the Apache-2.0 license

//! Transport error types

use crate::transports::message::DriverError;
use adac_host_command_types::PsaStatus;
use core::fmt;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection failed
    ConnectionFailed(Option<&'static str>),

    /// Send operation failed
    SendFailed(Option<&'static str>),

    /// Receive operation failed
    ReceiveFailed(Option<&'static str>),

    /// Transport disconnected
    Disconnected,

    /// Packet buffer is still owned by another packet
    BufferBusy,

    /// Request payload does not fit in the packet buffer
    RequestTooLarge { size: usize, max: usize },

    /// Response header announces more data than the packet buffer holds
    ResponseOverflow { size: usize, capacity: usize },

    /// Request payload is not a whole number of words
    UnalignedPayload(usize),

    /// Driver error
    Driver(DriverError),
}

impl TransportError {
    /// PSA status reported for this failure
    pub fn status(&self) -> PsaStatus {
        match self {
            TransportError::BufferBusy => PsaStatus::GenericError,
            TransportError::RequestTooLarge { .. } | TransportError::UnalignedPayload(_) => {
                PsaStatus::InvalidArgument
            }
            _ => PsaStatus::CommunicationFailure,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionFailed(msg) => {
                write!(f, "Connection failed")?;
                if let Some(msg) = msg {
                    write!(f, ": {}", msg)?;
                }
                Ok(())
            }
            TransportError::SendFailed(msg) => {
                write!(f, "Send failed")?;
                if let Some(msg) = msg {
                    write!(f, ": {}", msg)?;
                }
                Ok(())
            }
            TransportError::ReceiveFailed(msg) => {
                write!(f, "Receive failed")?;
                if let Some(msg) = msg {
                    write!(f, ": {}", msg)?;
                }
                Ok(())
            }
            TransportError::Disconnected => write!(f, "Transport disconnected"),
            TransportError::BufferBusy => write!(f, "Packet buffer already in use"),
            TransportError::RequestTooLarge { size, max } => {
                write!(f, "Request payload too large ({} > {})", size, max)
            }
            TransportError::ResponseOverflow { size, capacity } => {
                write!(f, "Message would overflow buffer ({} > {})", size, capacity)
            }
            TransportError::UnalignedPayload(len) => {
                write!(f, "Payload of {} bytes is not word aligned", len)
            }
            TransportError::Driver(err) => write!(f, "Driver error: {:?}", err),
        }
    }
}

impl From<DriverError> for TransportError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::NotReady => TransportError::ConnectionFailed(Some("Driver not ready")),
            DriverError::ConnectionRefused => {
                TransportError::ConnectionFailed(Some("Connection refused"))
            }
            other => TransportError::Driver(other),
        }
    }
}

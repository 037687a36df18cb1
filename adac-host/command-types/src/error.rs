// Licensed under the Apache-2.0 license

//! Command Error Types
//!
//! Error definitions for decoding ADAC structures

use crate::PsaStatus;

/// Command processing errors
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Data shorter than the structure being decoded
    Truncated { needed: usize, available: usize },

    /// A TLV announced a value running past the end of its buffer
    TlvOverrun { offset: usize },

    /// Response payload has the wrong size for the command
    InvalidResponseLength { expected: usize, actual: usize },

    /// Payload is not a whole number of words
    Unaligned(usize),

    /// More TLV records than the caller can hold
    TooManyExtensions { max: usize },

    /// Command not supported
    Unsupported(u16),

    /// Buffer too small for operation
    BufferTooSmall,
}

impl CommandError {
    pub fn status(&self) -> PsaStatus {
        match self {
            CommandError::Unsupported(_) => PsaStatus::NotSupported,
            CommandError::TooManyExtensions { .. } => PsaStatus::NotPermitted,
            CommandError::Unaligned(_) | CommandError::BufferTooSmall => {
                PsaStatus::InvalidArgument
            }
            _ => PsaStatus::GenericError,
        }
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::Truncated { needed, available } => {
                write!(f, "Truncated data: needed {} bytes, {} available", needed, available)
            }
            CommandError::TlvOverrun { offset } => {
                write!(f, "TLV at offset {} runs past the end of the buffer", offset)
            }
            CommandError::InvalidResponseLength { expected, actual } => write!(
                f,
                "Invalid response length: expected {} bytes, got {}",
                expected, actual
            ),
            CommandError::Unaligned(len) => {
                write!(f, "Payload of {} bytes is not word aligned", len)
            }
            CommandError::TooManyExtensions { max } => {
                write!(f, "More than {} TLV records", max)
            }
            CommandError::Unsupported(cmd) => write!(f, "Command 0x{:04x} not supported", cmd),
            CommandError::BufferTooSmall => write!(f, "Buffer too small"),
        }
    }
}

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

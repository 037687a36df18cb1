// Licensed under the Apache-2.0 license

use adac_host_command_types::{AdacCommand, CommandError, PsaStatus};
use adac_host_crypto::CryptoError;
use adac_host_session::SessionError;
use adac_host_transport::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// High-level result type for API functions
pub type AdacResult<T> = Result<T, AdacError>;

#[derive(Debug, Error)]
pub enum AdacError {
    #[error("Certificate chain cannot be loaded from {}", path.display())]
    ChainLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing trust chain: {0}")]
    Chain(CommandError),
    #[error("Certificate chain contains no certificate")]
    NoCertificate,
    #[error("Malformed response: {0}")]
    Response(CommandError),
    #[error("{0}")]
    Session(SessionError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("Unexpected response status 0x{status:04x} to {}", command.description())]
    UnexpectedStatus { command: AdacCommand, status: u16 },
    #[error("Cryptosystem Type ID not specified")]
    CryptosystemListMissing,
    #[error("Cryptosystem 0x{0:02x} not supported by target")]
    CryptosystemUnsupported(u8),
    #[error("Target does not advertise {0}")]
    FormatUnsupported(&'static str),
    #[error("Reserved field of TLV 0x{type_id:04x} is 0x{value:04x}")]
    ReservedNotZero { type_id: u16, value: u16 },
    #[error("Command 0x{0:04x} is not a vendor command")]
    NotVendorCommand(u16),
}

impl AdacError {
    /// PSA status reported for this failure
    pub fn status(&self) -> PsaStatus {
        match self {
            AdacError::Chain(err) | AdacError::Response(err) => err.status(),
            AdacError::Session(err) => err.status(),
            AdacError::Crypto(err) => err.status(),
            AdacError::CryptosystemListMissing => PsaStatus::DoesNotExist,
            AdacError::CryptosystemUnsupported(_) | AdacError::FormatUnsupported(_) => {
                PsaStatus::NotSupported
            }
            AdacError::NotVendorCommand(_) => PsaStatus::InvalidArgument,
            _ => PsaStatus::GenericError,
        }
    }
}

impl From<SessionError> for AdacError {
    fn from(err: SessionError) -> Self {
        AdacError::Session(err)
    }
}

impl From<TransportError> for AdacError {
    fn from(err: TransportError) -> Self {
        AdacError::Session(SessionError::Transport(err))
    }
}

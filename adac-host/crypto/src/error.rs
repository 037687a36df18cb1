// Licensed under the Apache-2.0 license

use adac_host_command_types::{KeyType, PsaStatus};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Could not read key file {}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not import private key: {0}")]
    InvalidKey(String),
    #[error("Unsupported key type (0x{0:x})")]
    UnsupportedKeyType(u8),
    #[error("Key handle {0} is not loaded")]
    UnknownHandle(u32),
    #[error("{actual:?} key cannot produce a {expected:?} signature")]
    KeyTypeMismatch { expected: KeyType, actual: KeyType },
    #[error("Error signing token: {0}")]
    Signing(String),
}

impl CryptoError {
    pub fn status(&self) -> PsaStatus {
        match self {
            CryptoError::UnsupportedKeyType(_) => PsaStatus::NotSupported,
            CryptoError::KeyTypeMismatch { .. } => PsaStatus::InvalidArgument,
            _ => PsaStatus::GenericError,
        }
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;

// Licensed under the Apache-2.0 license

//! Certificate Structures
//!
//! Binary header carried at the start of every `PSA_BINARY_CRT` value

use crate::{CertificateRole, KeyType};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Format version of an ADAC structure
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct AdacVersion {
    pub major: u8,
    pub minor: u8,
}

impl Default for AdacVersion {
    fn default() -> Self {
        Self { major: 1, minor: 0 }
    }
}

/// Certificate header
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct CertificateHeader {
    pub format_version: AdacVersion,
    pub signature_type: u8,
    pub key_type: u8,
    pub role: u8,
    pub usage: u8,
    pub reserved: u16,
    pub lifecycle: u16,
    pub oem_constraint: u16,
    pub extensions_bytes: u32,
    pub soc_class: u32,
    pub soc_id: [u8; 16],
    pub permissions_mask: [u8; 16],
}

/// Size of [`CertificateHeader`] in bytes
pub const CERTIFICATE_HEADER_SIZE: usize = core::mem::size_of::<CertificateHeader>();

impl CertificateHeader {
    /// Decoded key type, if it is one the host knows
    pub fn key_type(&self) -> Option<KeyType> {
        KeyType::from_raw(self.key_type)
    }

    /// Decoded role, if it is one the host knows
    pub fn role(&self) -> Option<CertificateRole> {
        CertificateRole::from_raw(self.role)
    }
}

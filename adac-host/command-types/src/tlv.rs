// Licensed under the Apache-2.0 license

//! TLV Definitions
//!
//! Type identifiers and the binary header of the type-length-value records used
//! in discovery responses, certificate chains and tokens.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Token formats supported by the target (discovery)
pub const TOKEN_FORMATS: u16 = 0x0100;
/// Certificate formats supported by the target (discovery)
pub const CERT_FORMATS: u16 = 0x0101;
/// Cryptosystems supported by the target (discovery)
pub const CRYPTOSYSTEMS: u16 = 0x0102;
/// PSA binary authentication token
pub const PSA_BINARY_TOKEN: u16 = 0x0200;
/// PSA binary certificate
pub const PSA_BINARY_CRT: u16 = 0x0201;

/// TLV record header
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct TlvHeader {
    pub reserved: u16,
    pub type_id: u16,
    pub length_in_bytes: u32,
}

/// Size of [`TlvHeader`] in bytes
pub const TLV_HEADER_SIZE: usize = core::mem::size_of::<TlvHeader>();

impl TlvHeader {
    pub fn new(type_id: u16, length_in_bytes: u32) -> Self {
        Self {
            reserved: 0,
            type_id,
            length_in_bytes,
        }
    }

    /// Length of the value once padded to the next word boundary
    pub fn padded_len(&self) -> usize {
        round_to_word(self.length_in_bytes as usize)
    }
}

/// Round a byte count up to a multiple of four
pub const fn round_to_word(len: usize) -> usize {
    (len + 3) & !3
}

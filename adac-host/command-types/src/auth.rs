// Licensed under the Apache-2.0 license

//! Authentication Structures
//!
//! Challenge returned by `AUTH_START` and the header of the signed token
//! sent back through `AUTH_RESPONSE`.

use crate::AdacVersion;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of the challenge vector in bytes
pub const CHALLENGE_SIZE: usize = 32;

/// Size of the requested permissions bitmap in bytes
pub const PERMISSION_REQUEST_SIZE: usize = 16;

/// Challenge issued by the target
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct AuthChallenge {
    pub format_version: AdacVersion,
    pub reserved: u16,
    pub challenge_vector: [u8; CHALLENGE_SIZE],
}

/// Size of [`AuthChallenge`] in bytes
pub const AUTH_CHALLENGE_SIZE: usize = core::mem::size_of::<AuthChallenge>();

/// Token header
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct TokenHeader {
    pub format_version: AdacVersion,
    pub signature_type: u8,
    pub reserved: u8,
    pub extensions_bytes: u32,
    pub requested_permissions: [u8; PERMISSION_REQUEST_SIZE],
}

/// Size of [`TokenHeader`] in bytes
pub const TOKEN_HEADER_SIZE: usize = core::mem::size_of::<TokenHeader>();

impl TokenHeader {
    pub fn new(
        signature_type: u8,
        extensions_bytes: u32,
        requested_permissions: [u8; PERMISSION_REQUEST_SIZE],
    ) -> Self {
        Self {
            format_version: AdacVersion::default(),
            signature_type,
            reserved: 0,
            extensions_bytes,
            requested_permissions,
        }
    }
}

/// Permission request used by the reference host flow: `perm[i] = 0xFF ^ i`
pub fn default_permission_request() -> [u8; PERMISSION_REQUEST_SIZE] {
    let mut perm = [0u8; PERMISSION_REQUEST_SIZE];
    for (i, p) in perm.iter_mut().enumerate() {
        *p = 0xFF ^ i as u8;
    }
    perm
}

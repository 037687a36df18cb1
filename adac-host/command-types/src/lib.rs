// Licensed under the Apache-2.0 license

//! ADAC Command Types
//!
//! Shared wire definitions for the Authenticated Debug Access Control host library:
//! command and status codes, TLV type identifiers, cryptosystems, and the
//! fixed-layout headers exchanged with a debug target.

#![no_std]

pub mod auth;
pub mod certificate;
pub mod error;
pub mod packet;
pub mod status;
pub mod tlv;

// Re-export all types
pub use auth::*;
pub use certificate::*;
pub use error::*;
pub use packet::*;
pub use status::*;
pub use tlv::*;

/// ADAC command IDs as carried in the request packet header
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdacCommand {
    Discovery = 0x0001,
    AuthStart = 0x0002,
    AuthResponse = 0x0003,
    /// Closes the debug session and lets the target continue booting
    ResumeBoot = 0x0004,
    LockDebug = 0x0005,
    LcsChange = 0x0006,
}

/// Bit marking a vendor specific command ID
pub const VENDOR_COMMAND_BIT: u16 = 0x8000;

impl AdacCommand {
    pub fn from_raw(command: u16) -> Option<Self> {
        match command {
            0x0001 => Some(Self::Discovery),
            0x0002 => Some(Self::AuthStart),
            0x0003 => Some(Self::AuthResponse),
            0x0004 => Some(Self::ResumeBoot),
            0x0005 => Some(Self::LockDebug),
            0x0006 => Some(Self::LcsChange),
            _ => None,
        }
    }

    /// Human readable description used when logging outgoing commands
    pub fn description(self) -> &'static str {
        match self {
            Self::Discovery => "discovery request",
            Self::AuthStart => "challenge request",
            Self::AuthResponse => "authentication response",
            Self::ResumeBoot => "close session command",
            Self::LockDebug => "lock debug request",
            Self::LcsChange => "LCS change command",
        }
    }
}

impl From<AdacCommand> for u16 {
    fn from(command: AdacCommand) -> Self {
        command as u16
    }
}

/// Check whether a raw command ID falls in the vendor specific range
pub fn is_vendor_command(command: u16) -> bool {
    command & VENDOR_COMMAND_BIT != 0
}

/// ADAC response status codes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdacStatus {
    Success = 0x0000,
    Failure = 0x0001,
    NeedMoreData = 0x0002,
    Unsupported = 0x0003,
    InvalidParameters = 0x7FFE,
    InvalidCommand = 0x7FFF,
}

impl AdacStatus {
    pub fn from_raw(status: u16) -> Option<Self> {
        match status {
            0x0000 => Some(Self::Success),
            0x0001 => Some(Self::Failure),
            0x0002 => Some(Self::NeedMoreData),
            0x0003 => Some(Self::Unsupported),
            0x7FFE => Some(Self::InvalidParameters),
            0x7FFF => Some(Self::InvalidCommand),
            _ => None,
        }
    }
}

impl From<AdacStatus> for u16 {
    fn from(status: AdacStatus) -> Self {
        status as u16
    }
}

/// Signature and MAC systems a certificate chain or token can use
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    EcdsaP256Sha256 = 0x01,
    EcdsaP521Sha512 = 0x02,
    Rsa3072Sha256 = 0x03,
    Rsa4096Sha256 = 0x04,
    Ed25519Sha512 = 0x05,
    Ed448Shake256 = 0x06,
    SmSm2Sm3 = 0x07,
    CmacAes = 0x08,
    HmacSha256 = 0x09,
}

impl KeyType {
    pub fn from_raw(key_type: u8) -> Option<Self> {
        match key_type {
            0x01 => Some(Self::EcdsaP256Sha256),
            0x02 => Some(Self::EcdsaP521Sha512),
            0x03 => Some(Self::Rsa3072Sha256),
            0x04 => Some(Self::Rsa4096Sha256),
            0x05 => Some(Self::Ed25519Sha512),
            0x06 => Some(Self::Ed448Shake256),
            0x07 => Some(Self::SmSm2Sm3),
            0x08 => Some(Self::CmacAes),
            0x09 => Some(Self::HmacSha256),
            _ => None,
        }
    }

    /// Symmetric MAC systems authenticate with a shared secret instead of a private key
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::CmacAes | Self::HmacSha256)
    }

    /// Size of the signature or MAC appended to a token
    pub fn signature_size(self) -> usize {
        match self {
            Self::EcdsaP256Sha256 => 64,
            Self::EcdsaP521Sha512 => 132,
            Self::Rsa3072Sha256 => 384,
            Self::Rsa4096Sha256 => 512,
            Self::Ed25519Sha512 => 64,
            Self::Ed448Shake256 => 114,
            Self::SmSm2Sm3 => 64,
            Self::CmacAes => 16,
            Self::HmacSha256 => 32,
        }
    }
}

impl From<KeyType> for u8 {
    fn from(key_type: KeyType) -> Self {
        key_type as u8
    }
}

/// Role of a certificate within a trust chain
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateRole {
    Root = 0x01,
    Intermediate = 0x02,
    Leaf = 0x03,
}

impl CertificateRole {
    pub fn from_raw(role: u8) -> Option<Self> {
        match role {
            0x01 => Some(Self::Root),
            0x02 => Some(Self::Intermediate),
            0x03 => Some(Self::Leaf),
            _ => None,
        }
    }
}

/// Upper bound on the TLV records the host accepts from a certificate chain
pub const MAX_EXTENSIONS: usize = 16;

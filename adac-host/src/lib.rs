// Licensed under the Apache-2.0 license

//! ADAC Debug Host Library
//!
//! Host side of the Authenticated Debug Access Control protocol: authenticates
//! against a locked target with a certificate chain and a signed token, and
//! asks it to open its debug port.
//!
//! The library is split into small crates:
//!
//! - **command-types**: Wire structures and protocol constants with zerocopy support
//! - **transport**: Packet staging buffer, TLV walker and byte stream framing
//! - **session**: Session management for command execution
//! - **crypto**: Key loading and token signing behind a pluggable provider
//! - **commands**: Certificate chain store, per-command API and the unlock sequence
//!
//! ## Architecture Overview
//!
//! ```text
//!     ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//!     │ adac-host-      │    │ adac-host-      │    │ adac-host-      │
//!     │ commands        │───►│ crypto          │    │ command-types   │
//!     │ (High-level API)│    │ (Token Signing) │    │ (Type Defs)     │
//!     └─────────────────┘    └─────────────────┘    └─────────────────┘
//!              │                                             │
//!              └─────────────────────────────────────────────┘
//!                          │
//!             ┌──────────────────┐
//!             │ adac-host-       │
//!             │ session          │
//!             │ (Session Mgmt)   │
//!             └──────────────────┘
//!                      │
//!             ┌──────────────────┐
//!             │ adac-host-       │         ┌─────────────────┐
//!             │ transport        │◄────────│ MessageDriver   │
//!             │ (Packet framing) │         │ (Unix socket..) │
//!             └──────────────────┘         └─────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Single Owner Buffer**: One staging buffer per session, borrowed by each packet in turn
//! - **Pluggable Drivers**: Any reliable byte stream can carry the protocol
//! - **Typed Crypto Operations**: Signing and MAC through the `CryptoProvider` trait
//! - **Fragmented Upload**: Certificates are sent one per `AUTH_RESPONSE`
//! - **Checkpoint Reporting**: Unlock failures name the step that failed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adac_host::{
//!     unlock_debug, AdacSession, MessageDriver, MessageTransport, RustCryptoProvider,
//!     UnlockOutcome, UnlockRequest,
//! };
//!
//! // Implement or use a message driver (e.g., Unix socket based)
//! struct SocketDriver { /* ... */ }
//! impl MessageDriver for SocketDriver { /* ... */ }
//!
//! let mut driver = SocketDriver::connect("/tmp/adac.sock")?;
//! let mut transport = MessageTransport::new(&mut driver);
//!
//! // Create session and connect
//! let mut session = AdacSession::new(&mut transport);
//! session.connect()?;
//!
//! // Run the whole unlock sequence
//! let mut provider = RustCryptoProvider::new();
//! let request = UnlockRequest::new("leaf.pem", "chain.bin");
//! match unlock_debug(&mut session, &mut provider, &request)? {
//!     UnlockOutcome::Unlocked => println!("Debug unlocked"),
//!     other => println!("Not unlocked: {:?}", other),
//! }
//! ```

// Re-export main public APIs for convenience
pub use adac_host_command_types::{
    AdacCommand, AdacStatus, AuthChallenge, CertificateHeader, CertificateRole, KeyType,
    PsaStatus, TlvHeader, TokenHeader,
};
pub use adac_host_commands::api::{
    adac_cmd_auth_response, adac_cmd_auth_start, adac_cmd_discovery, adac_cmd_lcs_change,
    adac_cmd_lock_debug, adac_cmd_resume_boot, adac_cmd_send_token, adac_cmd_vendor,
    check_support, CertificateUpload, DiscoveryReport,
};
pub use adac_host_commands::{
    unlock_debug, CertificateChain, Checkpoint, DebugUnlock, UnlockOutcome, UnlockRequest,
};
pub use adac_host_crypto::{construct_token, Challenge, CryptoProvider, RustCryptoProvider, Token};
pub use adac_host_session::AdacSession;
pub use adac_host_transport::{MessageDriver, MessageTransport, PacketBuffer, Transport};

// Re-export error types
pub use adac_host_commands::{AdacError, UnlockError};
pub use adac_host_crypto::CryptoError;
pub use adac_host_session::SessionError;
pub use adac_host_transport::{DriverError, TransportError};

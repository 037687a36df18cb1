// Licensed under the Apache-2.0 license

//! ADAC Commands Layer
//!
//! Certificate chain handling, per-command API functions and the debug unlock
//! sequence built on top of them.

// Re-export command types for convenience
pub use adac_host_command_types::*;

pub mod api;
pub mod chain;
mod error;
pub mod unlock;

pub use chain::{
    detect_cryptosystem, get_role, leaf_header, load_chain, split_into_extensions,
    CertificateChain, Extensions,
};
pub use error::{AdacError, AdacResult};
pub use unlock::{
    unlock_debug, Checkpoint, DebugUnlock, UnlockError, UnlockOutcome, UnlockRequest, UnlockState,
};

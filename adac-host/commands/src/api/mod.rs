// Licensed under the Apache-2.0 license

//! High-level API functions for ADAC commands
//!
//! Each function issues one command through an [`AdacSession`], waits for the
//! response and releases the packet buffer before returning.
//!
//! [`AdacSession`]: adac_host_session::AdacSession

pub mod auth;
pub mod discovery;
pub mod lifecycle;
pub mod vendor;

pub use auth::*;
pub use discovery::*;
pub use lifecycle::*;
pub use vendor::*;

// Licensed under the Apache-2.0 license

//! Token signing for the ADAC debug host
//!
//! Signing keys live behind a [`CryptoProvider`]. Asymmetric keys are imported
//! once and referred to by an opaque [`KeyHandle`]; MAC secrets are held by the
//! host as raw bytes. [`construct_token`] turns a target challenge into a
//! signed authentication token with whichever kind of key the chain requires.

mod error;
mod key;
mod provider;
mod token;

pub use error::{CryptoError, CryptoResult};
pub use key::{get_private_key, HostKey};
pub use provider::{CryptoProvider, KeyHandle, RustCryptoProvider};
pub use token::{construct_token, Challenge, Token};

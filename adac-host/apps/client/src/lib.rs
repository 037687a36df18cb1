// Licensed under the Apache-2.0 license

//! ADAC Host Client Library
//!
//! Runs the debug unlock sequence against a target reachable through a Unix
//! domain socket. [`UnixSocketDriver`] implements `MessageDriver`, which the
//! `MessageTransport` layer frames ADAC packets over.

mod unix_driver;

pub use unix_driver::UnixSocketDriver;

use adac_host::{
    unlock_debug, AdacSession, MessageDriver, MessageTransport, PacketBuffer, RustCryptoProvider,
    UnlockOutcome, UnlockRequest,
};
use adac_host_config::HostConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Files and settings for one unlock run
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub key_file: PathBuf,
    pub chain_file: PathBuf,
    pub config: HostConfig,
}

impl ClientOptions {
    fn unlock_request(&self) -> UnlockRequest {
        let mut request = UnlockRequest::new(&self.key_file, &self.chain_file);
        request.permissions = self.config.unlock.permissions;
        request.relock = self.config.unlock.relock;
        request
    }
}

/// Connect through `driver` and run one unlock sequence.
///
/// A connection failure is an error; every other failure is reported with
/// the checkpoint it happened at.
pub fn run_unlock(driver: &mut dyn MessageDriver, options: &ClientOptions) -> Result<UnlockOutcome> {
    let mut transport = MessageTransport::new(driver);
    let buffer = PacketBuffer::with_capacity(options.config.transport.buffer_size);
    let mut session = AdacSession::with_buffer(&mut transport, buffer);

    session
        .connect()
        .map_err(|e| anyhow::anyhow!("Failed to connect to target: {}", e))?;
    log::info!("Connected to target");

    let mut provider = RustCryptoProvider::new();
    let result = unlock_debug(&mut session, &mut provider, &options.unlock_request());

    if let Err(err) = session.disconnect() {
        log::warn!("Disconnect failed: {}", err);
    }
    log::info!(
        "Session statistics: {} commands sent, {} responses received, {} failed",
        session.stats.commands_sent,
        session.stats.responses_received,
        session.stats.commands_failed
    );

    result.with_context(|| "Debug unlock sequence failed")
}

// Licensed under the Apache-2.0 license

//! Debug unlock sequence
//!
//! Drives one complete host session against a locked target:
//!
//! 1. lock debug (the target may already be locked)
//! 2. load the certificate chain and find the leaf cryptosystem
//! 3. discovery, then skip if the target does not support that cryptosystem
//! 4. load the host key and request a challenge
//! 5. sign the token
//! 6. upload the certificate chain one certificate at a time
//! 7. send the token
//! 8. resume boot, whether or not the token was accepted
//! 9. lock debug again
//!
//! Any I/O failure or unexpected status aborts the sequence at its numbered
//! checkpoint. Nothing is retried.

use crate::api::{
    adac_cmd_auth_start, adac_cmd_discovery, adac_cmd_lock_debug, adac_cmd_resume_boot,
    adac_cmd_send_token, CertificateUpload,
};
use crate::chain::{detect_cryptosystem, get_role, CertificateChain};
use crate::AdacError;
use adac_host_command_types::{
    default_permission_request, AdacCommand, AdacStatus, CertificateRole, KeyType, PsaStatus,
    PERMISSION_REQUEST_SIZE,
};
use adac_host_crypto::{construct_token, get_private_key, CryptoError, CryptoProvider};
use adac_host_session::AdacSession;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Numbered points at which the sequence can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    LockDebug = 1,
    LoadChain = 2,
    Discovery = 3,
    Challenge = 4,
    Token = 5,
    CertificateUpload = 6,
    TokenResponse = 7,
    ResumeBoot = 8,
    Relock = 9,
}

impl Checkpoint {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn description(self) -> &'static str {
        match self {
            Checkpoint::LockDebug => "lock debug",
            Checkpoint::LoadChain => "load certificate chain",
            Checkpoint::Discovery => "discovery",
            Checkpoint::Challenge => "challenge",
            Checkpoint::Token => "token construction",
            Checkpoint::CertificateUpload => "certificate upload",
            Checkpoint::TokenResponse => "token response",
            Checkpoint::ResumeBoot => "resume boot",
            Checkpoint::Relock => "relock",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "checkpoint {} ({})", self.number(), self.description())
    }
}

#[derive(Debug, Error)]
#[error("{checkpoint}: {source}")]
pub struct UnlockError {
    pub checkpoint: Checkpoint,
    #[source]
    pub source: AdacError,
}

impl UnlockError {
    pub fn status(&self) -> PsaStatus {
        self.source.status()
    }
}

fn at<E: Into<AdacError>>(checkpoint: Checkpoint) -> impl FnOnce(E) -> UnlockError {
    move |err| {
        let source = err.into();
        log::error!("Failed at {}: {}", checkpoint, source);
        UnlockError { checkpoint, source }
    }
}

/// Progress of the unlock sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    Locked,
    ChainLoaded,
    Discovering,
    Negotiated,
    Challenged,
    TokenReady,
    CertSent,
    Authenticated,
    Resumed,
    RelockedOrEnd,
}

/// How a sequence that ran to completion ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The target accepted the token
    Unlocked,
    /// The target rejected the token with `status`; the session was still
    /// closed and relocked
    Refused { status: u16 },
    /// The target does not support the chain's cryptosystem
    Skipped { key_type: u8 },
}

/// Inputs of one unlock sequence
#[derive(Debug, Clone)]
pub struct UnlockRequest {
    pub key_file: PathBuf,
    pub chain_file: PathBuf,
    pub permissions: [u8; PERMISSION_REQUEST_SIZE],
    /// TLV sequence appended to the token
    pub extensions: Vec<u8>,
    /// Lock debug again after resuming boot
    pub relock: bool,
}

impl UnlockRequest {
    pub fn new(key_file: impl Into<PathBuf>, chain_file: impl Into<PathBuf>) -> Self {
        Self {
            key_file: key_file.into(),
            chain_file: chain_file.into(),
            permissions: default_permission_request(),
            extensions: Vec::new(),
            relock: true,
        }
    }
}

pub struct DebugUnlock<'s, 't> {
    session: &'s mut AdacSession<'t>,
    provider: &'s mut dyn CryptoProvider,
    state: UnlockState,
}

impl<'s, 't> DebugUnlock<'s, 't> {
    pub fn new(session: &'s mut AdacSession<'t>, provider: &'s mut dyn CryptoProvider) -> Self {
        Self {
            session,
            provider,
            state: UnlockState::Locked,
        }
    }

    /// Last state reached
    pub fn state(&self) -> UnlockState {
        self.state
    }

    fn advance(&mut self, next: UnlockState) {
        log::debug!("unlock: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn lock(&mut self, checkpoint: Checkpoint) -> Result<(), UnlockError> {
        let status = adac_cmd_lock_debug(self.session).map_err(at(checkpoint))?;
        match AdacStatus::from_raw(status) {
            Some(AdacStatus::Success) | Some(AdacStatus::Unsupported) => Ok(()),
            _ => Err(at(checkpoint)(AdacError::UnexpectedStatus {
                command: AdacCommand::LockDebug,
                status,
            })),
        }
    }

    /// Run the whole sequence
    pub fn run(&mut self, request: &UnlockRequest) -> Result<UnlockOutcome, UnlockError> {
        self.lock(Checkpoint::LockDebug)?;

        let chain = CertificateChain::load(&request.chain_file).map_err(at(Checkpoint::LoadChain))?;
        let extensions = chain.extensions().map_err(at(Checkpoint::LoadChain))?;
        let key_type = detect_cryptosystem(&extensions).map_err(at(Checkpoint::LoadChain))?;
        let role = get_role(&extensions).map_err(at(Checkpoint::LoadChain))?;
        if CertificateRole::from_raw(role) != Some(CertificateRole::Leaf) {
            log::warn!("Last certificate of the chain has role {}", role);
        }
        self.advance(UnlockState::ChainLoaded);

        self.advance(UnlockState::Discovering);
        let report = adac_cmd_discovery(self.session).map_err(at(Checkpoint::Discovery))?;
        match report.check_support(key_type) {
            Ok(()) => self.advance(UnlockState::Negotiated),
            Err(AdacError::CryptosystemUnsupported(_)) => {
                log::info!("Skipping: target does not support key type {}", key_type);
                return Ok(UnlockOutcome::Skipped { key_type });
            }
            Err(err) => return Err(at(Checkpoint::Discovery)(err)),
        }

        let key = get_private_key(self.provider, &request.key_file, key_type)
            .map_err(at(Checkpoint::Challenge))?;
        let challenge = adac_cmd_auth_start(self.session).map_err(at(Checkpoint::Challenge))?;
        self.advance(UnlockState::Challenged);

        let sign_type = KeyType::from_raw(key_type)
            .ok_or(CryptoError::UnsupportedKeyType(key_type))
            .map_err(at(Checkpoint::Token))?;
        let token = construct_token(
            &*self.provider,
            challenge,
            sign_type,
            &request.extensions,
            request.permissions,
            &key,
        )
        .map_err(at(Checkpoint::Token))?;
        self.advance(UnlockState::TokenReady);

        let delivered = CertificateUpload::new(&extensions)
            .and_then(|upload| upload.send_all(self.session))
            .map_err(at(Checkpoint::CertificateUpload))?;
        log::info!("Sent {} certificates", delivered.count());
        self.advance(UnlockState::CertSent);

        let status = adac_cmd_send_token(self.session, &token, delivered)
            .map_err(at(Checkpoint::TokenResponse))?;
        let outcome = if status == AdacStatus::Success as u16 {
            log::info!("Target unlocked successfully");
            self.advance(UnlockState::Authenticated);
            UnlockOutcome::Unlocked
        } else {
            log::error!("Target refused the token (status 0x{:04x})", status);
            UnlockOutcome::Refused { status }
        };

        let status = adac_cmd_resume_boot(self.session).map_err(at(Checkpoint::ResumeBoot))?;
        if status != AdacStatus::Success as u16 {
            return Err(at(Checkpoint::ResumeBoot)(AdacError::UnexpectedStatus {
                command: AdacCommand::ResumeBoot,
                status,
            }));
        }
        self.advance(UnlockState::Resumed);

        if request.relock {
            self.lock(Checkpoint::Relock)?;
        }
        self.advance(UnlockState::RelockedOrEnd);

        Ok(outcome)
    }
}

/// Run one unlock sequence over `session`
pub fn unlock_debug(
    session: &mut AdacSession,
    provider: &mut dyn CryptoProvider,
    request: &UnlockRequest,
) -> Result<UnlockOutcome, UnlockError> {
    DebugUnlock::new(session, provider).run(request)
}

// Licensed under the Apache-2.0 license

//! Challenge, certificate upload and token delivery

use crate::{AdacError, AdacResult};
use adac_host_command_types::{
    round_to_word, AdacCommand, AdacStatus, AuthChallenge, CommandError, AUTH_CHALLENGE_SIZE,
    PSA_BINARY_CRT,
};
use adac_host_crypto::{Challenge, Token};
use adac_host_session::AdacSession;
use adac_host_transport::Tlv;
use zerocopy::FromBytes;

/// Request a fresh challenge from the target.
///
/// The response payload must be exactly one [`AuthChallenge`]. The returned
/// [`Challenge`] is consumed by the token it signs.
pub fn adac_cmd_auth_start(session: &mut AdacSession) -> AdacResult<Challenge> {
    let response = session.execute(AdacCommand::AuthStart.into(), &[])?;
    log::info!("Receiving challenge..");

    if response.adac_status() != Some(AdacStatus::Success) {
        return Err(AdacError::UnexpectedStatus {
            command: AdacCommand::AuthStart,
            status: response.status(),
        });
    }

    let data = response.data();
    if data.len() != AUTH_CHALLENGE_SIZE {
        return Err(AdacError::Response(CommandError::InvalidResponseLength {
            expected: AUTH_CHALLENGE_SIZE,
            actual: data.len(),
        }));
    }
    let wire = AuthChallenge::read_from_bytes(data).map_err(|_| {
        AdacError::Response(CommandError::Truncated {
            needed: AUTH_CHALLENGE_SIZE,
            available: data.len(),
        })
    })?;
    response.release();

    let challenge = Challenge::new(wire);
    log::debug!("challenge vector: {}", hex::encode(challenge.vector()));
    Ok(challenge)
}

/// Send an `AUTH_RESPONSE` payload and return the raw response status
pub fn adac_cmd_auth_response(session: &mut AdacSession, payload: &[u8]) -> AdacResult<u16> {
    let response = session.execute(AdacCommand::AuthResponse.into(), payload)?;
    Ok(response.status())
}

/// Proof that the whole certificate chain reached the target
#[derive(Debug)]
pub struct CertificatesDelivered {
    count: usize,
}

impl CertificatesDelivered {
    /// Number of certificates sent
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Where a certificate upload stands after sending one fragment
#[derive(Debug)]
pub enum UploadState<'c> {
    Pending(CertificateUpload<'c>),
    Complete(CertificatesDelivered),
}

/// Fragmented upload of a certificate chain.
///
/// Each certificate travels in its own `AUTH_RESPONSE` and the target must
/// answer `NEED_MORE_DATA` to every one of them. The upload can only finish
/// by sending its last certificate, so holding a [`CertificatesDelivered`]
/// means the whole chain was accepted.
#[derive(Debug)]
pub struct CertificateUpload<'c> {
    certificates: Vec<Tlv<'c>>,
    next: usize,
}

impl<'c> CertificateUpload<'c> {
    /// Prepare the `PSA_BINARY_CRT` records of `extensions` for upload
    pub fn new(extensions: &[Tlv<'c>]) -> AdacResult<Self> {
        let certificates: Vec<_> = extensions
            .iter()
            .filter(|tlv| tlv.type_id() == PSA_BINARY_CRT)
            .copied()
            .collect();
        if certificates.is_empty() {
            return Err(AdacError::NoCertificate);
        }
        Ok(Self {
            certificates,
            next: 0,
        })
    }

    /// Certificates not yet sent
    pub fn remaining(&self) -> usize {
        self.certificates.len() - self.next
    }

    /// Send the next certificate and wait for the target to ask for more
    pub fn send_next_fragment(mut self, session: &mut AdacSession) -> AdacResult<UploadState<'c>> {
        let certificate = self.certificates[self.next];
        let mut payload = certificate.as_bytes().to_vec();
        payload.resize(round_to_word(payload.len()), 0);

        log::info!("Sending Certificate..");
        let status = adac_cmd_auth_response(session, &payload)?;
        if status != AdacStatus::NeedMoreData as u16 {
            log::error!("Unexpected response status {:x}", status);
            return Err(AdacError::UnexpectedStatus {
                command: AdacCommand::AuthResponse,
                status,
            });
        }

        self.next += 1;
        if self.next == self.certificates.len() {
            Ok(UploadState::Complete(CertificatesDelivered {
                count: self.certificates.len(),
            }))
        } else {
            Ok(UploadState::Pending(self))
        }
    }

    /// Send every remaining certificate
    pub fn send_all(self, session: &mut AdacSession) -> AdacResult<CertificatesDelivered> {
        let mut upload = self;
        loop {
            match upload.send_next_fragment(session)? {
                UploadState::Pending(next) => upload = next,
                UploadState::Complete(delivered) => return Ok(delivered),
            }
        }
    }
}

/// Send the signed token once the chain is delivered; returns the raw status
pub fn adac_cmd_send_token(
    session: &mut AdacSession,
    token: &Token,
    _delivered: CertificatesDelivered,
) -> AdacResult<u16> {
    log::info!("Sending token");
    let status = adac_cmd_auth_response(session, token.as_bytes())?;
    log::info!("Receiving token_authentication response");
    Ok(status)
}

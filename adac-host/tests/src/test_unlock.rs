// Licensed under the Apache-2.0 license

//! Integration tests for the complete debug unlock sequence
//!
//! The mock target is scripted with every answer up front; the tests then
//! check the outcome, the checkpoint of any failure and the exact command
//! order the host produced.

use crate::common::{test_constants::*, *};
use adac_host::{unlock_debug, Checkpoint, DebugUnlock, UnlockOutcome, UnlockRequest};
use adac_host_command_types::{
    default_permission_request, AdacCommand, AdacStatus, KeyType, PsaStatus, TlvHeader,
    TokenHeader, PSA_BINARY_TOKEN, TLV_HEADER_SIZE, TOKEN_HEADER_SIZE,
};
use adac_host_commands::{AdacError, UnlockError, UnlockState};
use adac_host_crypto::{CryptoProvider, RustCryptoProvider};
use adac_host_session::AdacSession;
use adac_host_transport::MessageTransport;
use ecdsa::signature::Verifier;
use p256::pkcs8::LineEnding;
use tempfile::NamedTempFile;
use zerocopy::{FromBytes, IntoBytes};

const LOCK: u16 = AdacCommand::LockDebug as u16;
const DISCOVERY: u16 = AdacCommand::Discovery as u16;
const AUTH_START: u16 = AdacCommand::AuthStart as u16;
const AUTH_RESPONSE: u16 = AdacCommand::AuthResponse as u16;
const RESUME: u16 = AdacCommand::ResumeBoot as u16;

/// Chain and key files for one scenario
struct Fixture {
    chain: NamedTempFile,
    key: NamedTempFile,
}

impl Fixture {
    fn new(chain: &[u8], key: &[u8]) -> Self {
        Self {
            chain: temp_file(chain),
            key: temp_file(key),
        }
    }

    fn hmac() -> Self {
        Self::new(&two_level_chain(KeyType::HmacSha256), &HMAC_SECRET)
    }

    fn request(&self) -> UnlockRequest {
        UnlockRequest::new(self.key.path(), self.chain.path())
    }
}

/// Queue the answers of a target that accepts everything
fn queue_accepting_target(target: &mut MockTarget, key_type: KeyType, certificates: usize) {
    target
        .queue_status(AdacStatus::Success)
        .queue_response(AdacStatus::Success.into(), &discovery_payload(&[key_type]))
        .queue_response(AdacStatus::Success.into(), test_challenge().as_bytes());
    for _ in 0..certificates {
        target.queue_status(AdacStatus::NeedMoreData);
    }
    target
        .queue_status(AdacStatus::Success)
        .queue_status(AdacStatus::Success)
        .queue_status(AdacStatus::Success);
}

fn run(target: &mut MockTarget, request: &UnlockRequest) -> Result<UnlockOutcome, UnlockError> {
    let mut transport = MessageTransport::new(target);
    let mut session = AdacSession::new(&mut transport);
    session.connect().expect("Failed to connect AdacSession");
    let mut provider = RustCryptoProvider::new();
    unlock_debug(&mut session, &mut provider, request)
}

/// Split a token request into its token header, extensions and signature
fn split_token(data: &[u8], sign_type: KeyType) -> (TokenHeader, &[u8], &[u8]) {
    let (tlv, rest) = TlvHeader::read_from_prefix(data).unwrap();
    assert_eq!(tlv.type_id, PSA_BINARY_TOKEN);
    let (header, rest) = TokenHeader::read_from_prefix(rest).unwrap();
    let extensions_len = header.extensions_bytes as usize;
    assert_eq!(
        tlv.length_in_bytes as usize,
        TOKEN_HEADER_SIZE + extensions_len + sign_type.signature_size()
    );
    let (extensions, rest) = rest.split_at(extensions_len);
    (header, extensions, &rest[..sign_type.signature_size()])
}

fn signed_message(header: &TokenHeader, extensions: &[u8]) -> Vec<u8> {
    let mut message = test_challenge().challenge_vector.to_vec();
    message.extend_from_slice(header.as_bytes());
    message.extend_from_slice(extensions);
    message
}

/// Single ECDSA P-256 certificate, target supports it: unlocked and relocked
#[test]
fn test_unlock_ecdsa_p256() {
    let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
    let pem = secret.to_sec1_pem(LineEnding::LF).unwrap();
    let mut chain = Vec::new();
    push_certificate(
        &mut chain,
        KeyType::EcdsaP256Sha256,
        adac_host_command_types::CertificateRole::Leaf,
        91,
    );
    let fixture = Fixture::new(&chain, pem.as_bytes());

    let mut target = MockTarget::new();
    queue_accepting_target(&mut target, KeyType::EcdsaP256Sha256, 1);

    let outcome = run(&mut target, &fixture.request()).unwrap();
    assert_eq!(outcome, UnlockOutcome::Unlocked);
    assert_eq!(
        target.commands(),
        vec![LOCK, DISCOVERY, AUTH_START, AUTH_RESPONSE, AUTH_RESPONSE, RESUME, LOCK]
    );
    assert_eq!(target.unread_bytes(), 0);

    let token = &target.requests()[4].data;
    assert_eq!(token.len() % 4, 0);
    let (header, extensions, signature) = split_token(token, KeyType::EcdsaP256Sha256);
    assert_eq!(header.signature_type, KeyType::EcdsaP256Sha256 as u8);
    assert_eq!(header.requested_permissions, default_permission_request());
    assert!(extensions.is_empty());

    let verifying = p256::ecdsa::VerifyingKey::from(&p256::ecdsa::SigningKey::from(secret));
    let signature = p256::ecdsa::Signature::from_slice(signature).unwrap();
    assert!(verifying
        .verify(&signed_message(&header, extensions), &signature)
        .is_ok());
}

/// HMAC chain with token extensions: the MAC covers challenge, header and extensions
#[test]
fn test_unlock_hmac_with_extensions() {
    let fixture = Fixture::hmac();
    let mut token_extensions = Vec::new();
    push_tlv(&mut token_extensions, 0x0300, &[0x10, 0x20, 0x30]);
    let mut request = fixture.request();
    request.extensions = token_extensions.clone();

    let mut target = MockTarget::new();
    queue_accepting_target(&mut target, KeyType::HmacSha256, 2);

    assert_eq!(run(&mut target, &request).unwrap(), UnlockOutcome::Unlocked);
    assert_eq!(
        target.commands(),
        vec![
            LOCK,
            DISCOVERY,
            AUTH_START,
            AUTH_RESPONSE,
            AUTH_RESPONSE,
            AUTH_RESPONSE,
            RESUME,
            LOCK
        ]
    );

    let (header, extensions, mac) = split_token(&target.requests()[5].data, KeyType::HmacSha256);
    assert_eq!(extensions, token_extensions.as_slice());
    let expected = RustCryptoProvider::new()
        .mac(
            KeyType::HmacSha256,
            &HMAC_SECRET,
            &signed_message(&header, extensions),
        )
        .unwrap();
    assert_eq!(mac, expected.as_slice());
}

/// Target does not support the chain's cryptosystem: skipped, no challenge requested
#[test]
fn test_skip_unsupported_cryptosystem() {
    let chain = two_level_chain(KeyType::EcdsaP256Sha256);
    let fixture = Fixture::new(&chain, b"never read");

    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::Rsa3072Sha256]),
        );

    let outcome = run(&mut target, &fixture.request()).unwrap();
    assert_eq!(
        outcome,
        UnlockOutcome::Skipped {
            key_type: KeyType::EcdsaP256Sha256 as u8
        }
    );
    assert_eq!(target.commands(), vec![LOCK, DISCOVERY]);
    assert!(!target.commands().contains(&AUTH_START));
}

/// Token rejected: reported as refused, but the session is still closed and relocked
#[test]
fn test_token_refused_still_resumes() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::HmacSha256]),
        )
        .queue_response(AdacStatus::Success.into(), test_challenge().as_bytes())
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::Failure)
        .queue_status(AdacStatus::Success)
        .queue_status(AdacStatus::Success);

    let outcome = run(&mut target, &fixture.request()).unwrap();
    assert_eq!(
        outcome,
        UnlockOutcome::Refused {
            status: AdacStatus::Failure as u16
        }
    );
    assert_eq!(target.commands()[6..], [RESUME, LOCK]);
}

/// Challenge of the wrong size aborts at checkpoint 4
#[test]
fn test_malformed_challenge_size() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::HmacSha256]),
        )
        .queue_response(AdacStatus::Success.into(), &[0x44; 40]);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::Challenge);
    assert_eq!(err.checkpoint.number(), 4);
    assert!(matches!(err.source, AdacError::Response(_)));
    assert_eq!(target.commands(), vec![LOCK, DISCOVERY, AUTH_START]);
}

/// A certificate answered with anything but NEED_MORE_DATA aborts at checkpoint 6
#[test]
fn test_certificate_rejected() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::HmacSha256]),
        )
        .queue_response(AdacStatus::Success.into(), test_challenge().as_bytes())
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::Failure);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::CertificateUpload);
    assert!(matches!(
        err.source,
        AdacError::UnexpectedStatus {
            command: AdacCommand::AuthResponse,
            status: 0x0001
        }
    ));
    assert_eq!(
        target.commands(),
        vec![LOCK, DISCOVERY, AUTH_START, AUTH_RESPONSE, AUTH_RESPONSE]
    );
}

/// A discovery response without a cryptosystem list is fatal
#[test]
fn test_missing_cryptosystem_list() {
    let fixture = Fixture::hmac();
    let mut payload = Vec::new();
    push_tlv(&mut payload, 0x0100, &[0x00, 0x02]);

    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(AdacStatus::Success.into(), &payload);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::Discovery);
    assert_eq!(err.status(), PsaStatus::DoesNotExist);
}

/// Oversized discovery response is a transport failure at checkpoint 3
#[test]
fn test_discovery_overflow() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_raw(&[0x00, 0x00, 0x00, 0x08]);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::Discovery);
    assert_eq!(err.status(), PsaStatus::CommunicationFailure);
}

#[test]
fn test_lock_failure() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Failure);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::LockDebug);
    assert_eq!(
        err.to_string(),
        "checkpoint 1 (lock debug): Unexpected response status 0x0001 to lock debug request"
    );
}

#[test]
fn test_missing_chain_file() {
    let fixture = Fixture::hmac();
    let mut request = fixture.request();
    request.chain_file = fixture.chain.path().with_extension("missing");

    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Success);

    let err = run(&mut target, &request).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::LoadChain);
    assert!(matches!(err.source, AdacError::ChainLoad { .. }));
    assert_eq!(target.commands(), vec![LOCK]);
}

#[test]
fn test_missing_key_file() {
    let fixture = Fixture::hmac();
    let mut request = fixture.request();
    request.key_file = fixture.key.path().with_extension("missing");

    let mut target = MockTarget::new();
    queue_accepting_target(&mut target, KeyType::HmacSha256, 2);

    let err = run(&mut target, &request).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::Challenge);
    assert!(matches!(err.source, AdacError::Crypto(_)));
    assert_eq!(target.commands(), vec![LOCK, DISCOVERY]);
}

#[test]
fn test_resume_failure() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Success)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::HmacSha256]),
        )
        .queue_response(AdacStatus::Success.into(), test_challenge().as_bytes())
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::Success)
        .queue_status(AdacStatus::Failure);

    let err = run(&mut target, &fixture.request()).unwrap_err();
    assert_eq!(err.checkpoint, Checkpoint::ResumeBoot);
    assert_eq!(target.commands().last(), Some(&RESUME));
}

/// A target without a debug lock answers UNSUPPORTED; relock can be turned off
#[test]
fn test_unsupported_lock_without_relock() {
    let fixture = Fixture::hmac();
    let mut request = fixture.request();
    request.relock = false;

    let mut target = MockTarget::new();
    target
        .queue_status(AdacStatus::Unsupported)
        .queue_response(
            AdacStatus::Success.into(),
            &discovery_payload(&[KeyType::HmacSha256]),
        )
        .queue_response(AdacStatus::Success.into(), test_challenge().as_bytes())
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::NeedMoreData)
        .queue_status(AdacStatus::Success)
        .queue_status(AdacStatus::Success);

    let (outcome, state) = {
        let mut transport = MessageTransport::new(&mut target);
        let mut session = AdacSession::new(&mut transport);
        session.connect().unwrap();
        let mut provider = RustCryptoProvider::new();
        let mut unlock = DebugUnlock::new(&mut session, &mut provider);
        let outcome = unlock.run(&request).unwrap();
        (outcome, unlock.state())
    };
    assert_eq!(outcome, UnlockOutcome::Unlocked);
    assert_eq!(state, UnlockState::RelockedOrEnd);
    assert_eq!(target.commands().last(), Some(&RESUME));
    assert_eq!(target.unread_bytes(), 0);
}

/// Token requests are framed as PSA_BINARY_TOKEN records
#[test]
fn test_token_framing() {
    let fixture = Fixture::hmac();
    let mut target = MockTarget::new();
    queue_accepting_target(&mut target, KeyType::HmacSha256, 2);
    run(&mut target, &fixture.request()).unwrap();

    let token = &target.requests()[5].data;
    assert_eq!(
        token.len(),
        TLV_HEADER_SIZE + TOKEN_HEADER_SIZE + KeyType::HmacSha256.signature_size()
    );
    assert_eq!(&token[2..4], &PSA_BINARY_TOKEN.to_ne_bytes());
}

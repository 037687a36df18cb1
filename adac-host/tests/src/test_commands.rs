// Licensed under the Apache-2.0 license

//! Integration tests for the per-command API functions
//!
//! Each test scripts the target's answers, runs one high-level API function
//! and checks both its result and the packets the target received.

use crate::common::{test_constants::*, *};
use adac_host_command_types::{
    AdacCommand, AdacStatus, CertificateRole, CommandError, KeyType, PsaStatus, AUTH_CHALLENGE_SIZE,
    MAX_EXTENSIONS, PSA_BINARY_CRT,
};
use adac_host_commands::api::{
    adac_cmd_auth_response, adac_cmd_auth_start, adac_cmd_discovery, adac_cmd_lcs_change,
    adac_cmd_lock_debug, adac_cmd_resume_boot, adac_cmd_vendor, check_support, CertificateUpload,
    UploadState,
};
use adac_host_commands::{split_into_extensions, AdacError};
use adac_host_session::{AdacSession, SessionError};
use adac_host_transport::MessageTransport;
use zerocopy::IntoBytes;

/// Run `f` against a connected session over `target`
fn with_session<T>(target: &mut MockTarget, f: impl FnOnce(&mut AdacSession) -> T) -> T {
    let mut transport = MessageTransport::new(target);
    let mut session = AdacSession::new(&mut transport);
    session.connect().expect("Failed to connect AdacSession");
    f(&mut session)
}

#[test]
fn test_discovery_report() {
    let payload = discovery_payload(&[KeyType::Rsa3072Sha256, KeyType::EcdsaP256Sha256]);
    let mut target = MockTarget::new();
    target.queue_response(AdacStatus::Success.into(), &payload);

    let report = with_session(&mut target, |session| adac_cmd_discovery(session)).unwrap();
    assert_eq!(report.as_bytes(), payload.as_slice());
    assert_eq!(report.records().len(), 3);
    assert_eq!(
        report.cryptosystems(),
        Some(&[KeyType::Rsa3072Sha256 as u8, KeyType::EcdsaP256Sha256 as u8][..])
    );
    assert!(report.check_formats().is_ok());
    assert!(report.check_reserved().is_ok());
    assert!(report.check_support(KeyType::EcdsaP256Sha256.into()).is_ok());
    assert!(matches!(
        report.check_support(KeyType::HmacSha256.into()),
        Err(AdacError::CryptosystemUnsupported(0x09))
    ));
    assert_eq!(target.commands(), vec![AdacCommand::Discovery as u16]);
}

#[test]
fn test_discovery_failure_status() {
    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Failure);

    let err = with_session(&mut target, |session| adac_cmd_discovery(session)).unwrap_err();
    assert!(matches!(
        err,
        AdacError::UnexpectedStatus {
            command: AdacCommand::Discovery,
            status: 0x0001
        }
    ));
    assert_eq!(err.status(), PsaStatus::GenericError);
}

/// Odd-length TLVs are walked with padding; every record is visited once
#[test]
fn test_discovery_odd_length_records() {
    let mut payload = Vec::new();
    push_tlv(&mut payload, 0x0300, &[1]);
    push_tlv(&mut payload, 0x0301, &[2, 3, 4, 5, 6]);
    push_tlv(&mut payload, 0x0102, &[KeyType::Ed25519Sha512 as u8, 0x77, 0x78]);

    let mut target = MockTarget::new();
    target.queue_response(AdacStatus::Success.into(), &payload);
    let report = with_session(&mut target, |session| adac_cmd_discovery(session)).unwrap();

    let ids: Vec<u16> = report.records().iter().map(|r| r.type_id).collect();
    assert_eq!(ids, vec![0x0300, 0x0301, 0x0102]);
    assert_eq!(report.records()[1].value, vec![2, 3, 4, 5, 6]);
    assert!(report.check_support(KeyType::Ed25519Sha512.into()).is_ok());
    assert!(matches!(
        report.check_formats(),
        Err(AdacError::FormatUnsupported(_))
    ));
}

#[test]
fn test_check_support_without_cryptosystems() {
    let mut payload = Vec::new();
    push_tlv(&mut payload, 0x0100, &[0x00, 0x02]);
    for key_system in 0..=u8::MAX {
        let err = check_support(&payload, key_system).unwrap_err();
        assert_eq!(err.status(), PsaStatus::DoesNotExist);
    }
}

#[test]
fn test_auth_start_challenge() {
    let challenge = test_challenge();
    let mut target = MockTarget::new();
    target.queue_response(AdacStatus::Success.into(), challenge.as_bytes());

    let received = with_session(&mut target, |session| adac_cmd_auth_start(session)).unwrap();
    assert_eq!(received.vector(), &challenge.challenge_vector);
    assert_eq!(received.format_version(), challenge.format_version);
    assert_eq!(target.requests()[0].command, AdacCommand::AuthStart as u16);
    assert!(target.requests()[0].data.is_empty());
}

/// The challenge must be exactly the size of the challenge structure
#[test]
fn test_auth_start_wrong_size() {
    for len in [0usize, 32, 40] {
        let mut target = MockTarget::new();
        target.queue_response(AdacStatus::Success.into(), &vec![0x33; len]);

        let err = with_session(&mut target, |session| adac_cmd_auth_start(session)).unwrap_err();
        assert!(matches!(
            err,
            AdacError::Response(CommandError::InvalidResponseLength {
                expected: AUTH_CHALLENGE_SIZE,
                ..
            })
        ));
    }
}

#[test]
fn test_auth_response_requires_payload() {
    let mut target = MockTarget::new();
    let err = with_session(&mut target, |session| adac_cmd_auth_response(session, &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        AdacError::Session(SessionError::MissingPayload(0x0003))
    ));
    assert!(target.requests().is_empty());
}

/// Each certificate travels alone; the upload ends with the last one
#[test]
fn test_certificate_upload_fragments() {
    let mut chain = two_level_chain(KeyType::EcdsaP256Sha256);
    push_certificate(
        &mut chain,
        KeyType::EcdsaP256Sha256,
        CertificateRole::Intermediate,
        7,
    );
    let extensions = split_into_extensions(&chain, MAX_EXTENSIONS).unwrap();

    let mut target = MockTarget::new();
    for _ in 0..3 {
        target.queue_status(AdacStatus::NeedMoreData);
    }

    let delivered = with_session(&mut target, |session| {
        let mut upload = CertificateUpload::new(&extensions).unwrap();
        assert_eq!(upload.remaining(), 3);
        loop {
            match upload.send_next_fragment(session).unwrap() {
                UploadState::Pending(next) => upload = next,
                UploadState::Complete(delivered) => return delivered,
            }
        }
    });
    assert_eq!(delivered.count(), 3);

    let requests = target.requests();
    assert_eq!(requests.len(), 3);
    for (request, extension) in requests.iter().zip(extensions.iter()) {
        assert_eq!(request.command, AdacCommand::AuthResponse as u16);
        assert_eq!(request.data.len() % 4, 0);
        assert_eq!(&request.data[..extension.as_bytes().len()], extension.as_bytes());
        assert_eq!(extension.type_id(), PSA_BINARY_CRT);
    }
}

/// Anything but NEED_MORE_DATA in answer to a certificate stops the upload
#[test]
fn test_certificate_upload_terminal_status() {
    let chain = two_level_chain(KeyType::HmacSha256);
    let extensions = split_into_extensions(&chain, MAX_EXTENSIONS).unwrap();

    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Success);
    target.queue_status(AdacStatus::NeedMoreData);

    let err = with_session(&mut target, |session| {
        CertificateUpload::new(&extensions)
            .unwrap()
            .send_all(session)
    })
    .unwrap_err();
    assert!(matches!(
        err,
        AdacError::UnexpectedStatus {
            command: AdacCommand::AuthResponse,
            status: 0x0000
        }
    ));
    assert_eq!(target.requests().len(), 1);
}

#[test]
fn test_upload_without_certificates() {
    let mut chain = Vec::new();
    push_tlv(&mut chain, 0x0200, &[0; 8]);
    let extensions = split_into_extensions(&chain, MAX_EXTENSIONS).unwrap();
    assert!(matches!(
        CertificateUpload::new(&extensions),
        Err(AdacError::NoCertificate)
    ));
}

#[test]
fn test_lcs_change_forwards_tlvs() {
    let mut tlvs = Vec::new();
    push_tlv(&mut tlvs, 0x0001, &[0x01, 0x02, 0x03]);

    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Success);
    target.queue_status(AdacStatus::InvalidParameters);

    let (first, second) = with_session(&mut target, |session| {
        (
            adac_cmd_lcs_change(session, &tlvs).unwrap(),
            adac_cmd_lcs_change(session, &[]).unwrap(),
        )
    });
    assert_eq!(first, AdacStatus::Success as u16);
    assert_eq!(second, AdacStatus::InvalidParameters as u16);
    assert_eq!(target.requests()[0].data, tlvs);
    assert!(target.requests()[1].data.is_empty());
}

#[test]
fn test_lock_and_resume_report_raw_status() {
    let mut target = MockTarget::new();
    target.queue_status(AdacStatus::Unsupported);
    target.queue_status(AdacStatus::Success);

    let (lock, resume) = with_session(&mut target, |session| {
        (
            adac_cmd_lock_debug(session).unwrap(),
            adac_cmd_resume_boot(session).unwrap(),
        )
    });
    assert_eq!(lock, AdacStatus::Unsupported as u16);
    assert_eq!(resume, AdacStatus::Success as u16);
    assert_eq!(
        target.commands(),
        vec![AdacCommand::LockDebug as u16, AdacCommand::ResumeBoot as u16]
    );
}

#[test]
fn test_vendor_command() {
    let mut target = MockTarget::new();
    target.queue_response(0x1234, &[0xAB; 12]);

    let response =
        with_session(&mut target, |session| adac_cmd_vendor(session, VENDOR_COMMAND, &[1; 4]))
            .unwrap();
    assert_eq!(response.status, 0x1234);
    assert_eq!(response.data, vec![0xAB; 12]);

    let err = with_session(&mut target, |session| {
        adac_cmd_vendor(session, AdacCommand::Discovery.into(), &[])
    })
    .unwrap_err();
    assert!(matches!(err, AdacError::NotVendorCommand(0x0001)));
    assert_eq!(err.status(), PsaStatus::InvalidArgument);
    assert_eq!(target.commands(), vec![VENDOR_COMMAND]);
}

// Licensed under the Apache-2.0 license

use crate::{CryptoError, CryptoProvider, CryptoResult, HostKey};
use adac_host_command_types::{
    round_to_word, AdacVersion, AuthChallenge, KeyType, TlvHeader, TokenHeader, CHALLENGE_SIZE,
    PERMISSION_REQUEST_SIZE, PSA_BINARY_TOKEN, TLV_HEADER_SIZE, TOKEN_HEADER_SIZE,
};
use zerocopy::IntoBytes;

/// Challenge issued by the target, good for exactly one token.
///
/// Neither `Clone` nor `Copy`. [`construct_token`] takes it by value, so the
/// same challenge cannot be signed twice:
///
/// ```compile_fail
/// use adac_host_command_types::KeyType;
/// use adac_host_crypto::{construct_token, Challenge, CryptoProvider, HostKey};
///
/// fn sign_twice(provider: &dyn CryptoProvider, challenge: Challenge, key: &HostKey) {
///     let _ = construct_token(provider, challenge, KeyType::HmacSha256, &[], [0; 16], key);
///     let _ = construct_token(provider, challenge, KeyType::HmacSha256, &[], [0; 16], key);
/// }
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Challenge {
    format_version: AdacVersion,
    vector: [u8; CHALLENGE_SIZE],
}

impl Challenge {
    /// Take ownership of a challenge as received on the wire
    pub fn new(wire: AuthChallenge) -> Self {
        Self {
            format_version: wire.format_version,
            vector: wire.challenge_vector,
        }
    }

    pub fn format_version(&self) -> AdacVersion {
        self.format_version
    }

    pub fn vector(&self) -> &[u8; CHALLENGE_SIZE] {
        &self.vector
    }
}

impl From<AuthChallenge> for Challenge {
    fn from(wire: AuthChallenge) -> Self {
        Self::new(wire)
    }
}

/// Signed authentication token, framed as a `PSA_BINARY_TOKEN` TLV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    bytes: Vec<u8>,
    sign_type: KeyType,
    permissions: [u8; PERMISSION_REQUEST_SIZE],
    signature_offset: usize,
}

impl Token {
    /// TLV encoded token, padded to a whole number of words
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sign_type(&self) -> KeyType {
        self.sign_type
    }

    pub fn permissions(&self) -> &[u8; PERMISSION_REQUEST_SIZE] {
        &self.permissions
    }

    pub fn signature(&self) -> &[u8] {
        let end = self.signature_offset + self.sign_type.signature_size();
        &self.bytes[self.signature_offset..end]
    }
}

/// Sign a token answering `challenge`.
///
/// The signature or MAC covers the challenge vector, the token header and
/// `extensions`. The challenge is consumed: each one yields a single token.
pub fn construct_token(
    provider: &dyn CryptoProvider,
    challenge: Challenge,
    sign_type: KeyType,
    extensions: &[u8],
    permissions: [u8; PERMISSION_REQUEST_SIZE],
    key: &HostKey,
) -> CryptoResult<Token> {
    let header = TokenHeader::new(sign_type.into(), extensions.len() as u32, permissions);

    let mut message = Vec::with_capacity(CHALLENGE_SIZE + TOKEN_HEADER_SIZE + extensions.len());
    message.extend_from_slice(challenge.vector());
    message.extend_from_slice(header.as_bytes());
    message.extend_from_slice(extensions);

    let signature = sign_message(provider, sign_type, key, &message).map_err(|e| {
        log::error!("Error signing token: {}", e);
        match e {
            CryptoError::Signing(_) => e,
            other => CryptoError::Signing(other.to_string()),
        }
    })?;

    let value_len = TOKEN_HEADER_SIZE + extensions.len() + signature.len();
    let mut bytes = Vec::with_capacity(TLV_HEADER_SIZE + round_to_word(value_len));
    bytes.extend_from_slice(TlvHeader::new(PSA_BINARY_TOKEN, value_len as u32).as_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(extensions);
    let signature_offset = bytes.len();
    bytes.extend_from_slice(&signature);
    bytes.resize(TLV_HEADER_SIZE + round_to_word(value_len), 0);

    Ok(Token {
        bytes,
        sign_type,
        permissions,
        signature_offset,
    })
}

fn sign_message(
    provider: &dyn CryptoProvider,
    sign_type: KeyType,
    key: &HostKey,
    message: &[u8],
) -> CryptoResult<Vec<u8>> {
    let signature = match key {
        HostKey::Handle(handle) => {
            if handle.key_type() != sign_type {
                return Err(CryptoError::KeyTypeMismatch {
                    expected: sign_type,
                    actual: handle.key_type(),
                });
            }
            provider.sign(*handle, message)?
        }
        HostKey::Secret(secret) => provider.mac(sign_type, secret, message)?,
    };

    if signature.len() != sign_type.signature_size() {
        return Err(CryptoError::Signing(format!(
            "{} byte signature, expected {}",
            signature.len(),
            sign_type.signature_size()
        )));
    }
    Ok(signature)
}

// Licensed under the Apache-2.0 license

use crate::{CryptoError, CryptoResult};
use adac_host_command_types::KeyType;
use aes::{Aes128, Aes256};
use cmac::Cmac;
use ecdsa::signature::Signer;
use ed25519_dalek::pkcs8::DecodePrivateKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Opaque reference to a private key held by a [`CryptoProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandle {
    id: u32,
    key_type: KeyType,
}

impl KeyHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }
}

/// Signing capabilities needed by the host
pub trait CryptoProvider {
    /// Import a PEM encoded private key for an asymmetric cryptosystem
    fn import_private_key(&mut self, key_type: KeyType, pem: &str) -> CryptoResult<KeyHandle>;

    /// Sign `message` with a previously imported key
    fn sign(&self, handle: KeyHandle, message: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Compute a MAC over `message` with a raw shared secret
    fn mac(&self, key_type: KeyType, secret: &[u8], message: &[u8]) -> CryptoResult<Vec<u8>>;
}

enum ImportedKey {
    P256(p256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

/// Software provider built on the RustCrypto and dalek crates.
///
/// Supports ECDSA P-256, Ed25519, HMAC-SHA256 and AES-CMAC.
#[derive(Default)]
pub struct RustCryptoProvider {
    keys: Vec<ImportedKey>,
}

impl RustCryptoProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn import_p256(pem: &str) -> CryptoResult<p256::ecdsa::SigningKey> {
    let secret = if pem.contains("BEGIN EC PRIVATE KEY") {
        p256::SecretKey::from_sec1_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))?
    } else {
        p256::SecretKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))?
    };
    Ok(p256::ecdsa::SigningKey::from(secret))
}

impl CryptoProvider for RustCryptoProvider {
    fn import_private_key(&mut self, key_type: KeyType, pem: &str) -> CryptoResult<KeyHandle> {
        let key = match key_type {
            KeyType::EcdsaP256Sha256 => ImportedKey::P256(import_p256(pem)?),
            KeyType::Ed25519Sha512 => ImportedKey::Ed25519(
                ed25519_dalek::SigningKey::from_pkcs8_pem(pem)
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))?,
            ),
            other => return Err(CryptoError::UnsupportedKeyType(other.into())),
        };

        let id = self.keys.len() as u32;
        self.keys.push(key);
        Ok(KeyHandle { id, key_type })
    }

    fn sign(&self, handle: KeyHandle, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = self
            .keys
            .get(handle.id as usize)
            .ok_or(CryptoError::UnknownHandle(handle.id))?;

        match key {
            ImportedKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .try_sign(message)
                    .map_err(|e| CryptoError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            ImportedKey::Ed25519(key) => {
                let signature: ed25519_dalek::Signature = key
                    .try_sign(message)
                    .map_err(|e| CryptoError::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    fn mac(&self, key_type: KeyType, secret: &[u8], message: &[u8]) -> CryptoResult<Vec<u8>> {
        match key_type {
            KeyType::HmacSha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            KeyType::CmacAes => match secret.len() {
                16 => {
                    let mut mac = Cmac::<Aes128>::new_from_slice(secret)
                        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
                    mac.update(message);
                    Ok(mac.finalize().into_bytes().to_vec())
                }
                32 => {
                    let mut mac = Cmac::<Aes256>::new_from_slice(secret)
                        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
                    mac.update(message);
                    Ok(mac.finalize().into_bytes().to_vec())
                }
                len => Err(CryptoError::InvalidKey(format!(
                    "AES key must be 16 or 32 bytes, got {len}"
                ))),
            },
            other => Err(CryptoError::UnsupportedKeyType(other.into())),
        }
    }
}

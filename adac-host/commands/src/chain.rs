// Licensed under the Apache-2.0 license

//! Certificate chain store
//!
//! A chain file is a sequence of TLV records ordered root first. Each
//! `PSA_BINARY_CRT` record starts with a [`CertificateHeader`]; the last one in
//! the chain is the leaf, whose header names the cryptosystem the host must
//! sign with.

use crate::{AdacError, AdacResult};
use adac_host_command_types::{
    CertificateHeader, CommandError, CERTIFICATE_HEADER_SIZE, MAX_EXTENSIONS, PSA_BINARY_CRT,
};
use adac_host_transport::{split_tlvs, Tlv};
use arrayvec::ArrayVec;
use std::path::Path;
use zerocopy::FromBytes;

/// TLV records of a parsed chain, bounded by [`MAX_EXTENSIONS`]
pub type Extensions<'a> = ArrayVec<Tlv<'a>, MAX_EXTENSIONS>;

/// Read a certificate chain blob from `path`
pub fn load_chain(path: &Path) -> AdacResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| {
        log::error!("Certificate chain cannot be loaded ({})", path.display());
        AdacError::ChainLoad {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Split a chain into its TLV records, failing if there are more than
/// `max_count`. `max_count` is capped at [`MAX_EXTENSIONS`].
pub fn split_into_extensions(chain: &[u8], max_count: usize) -> AdacResult<Extensions<'_>> {
    let max_count = max_count.min(MAX_EXTENSIONS);
    let extensions = split_tlvs::<MAX_EXTENSIONS>(chain).map_err(|err| {
        log::error!("Error parsing trust chain: {}", err);
        AdacError::Chain(err)
    })?;

    if extensions.len() > max_count {
        log::error!("Extension count exceeded maximum allowed");
        return Err(AdacError::Chain(CommandError::TooManyExtensions { max: max_count }));
    }

    log::info!("Found {} certificates", extensions.len());
    Ok(extensions)
}

/// Header of the leaf certificate, the last `PSA_BINARY_CRT` in the chain
pub fn leaf_header(extensions: &[Tlv<'_>]) -> AdacResult<CertificateHeader> {
    let leaf = extensions
        .iter()
        .rev()
        .find(|tlv| tlv.type_id() == PSA_BINARY_CRT)
        .ok_or(AdacError::NoCertificate)?;

    CertificateHeader::read_from_prefix(leaf.value())
        .map(|(header, _)| header)
        .map_err(|_| {
            AdacError::Chain(CommandError::Truncated {
                needed: CERTIFICATE_HEADER_SIZE,
                available: leaf.len(),
            })
        })
}

/// Key type the leaf certificate signs with
pub fn detect_cryptosystem(extensions: &[Tlv<'_>]) -> AdacResult<u8> {
    let key_type = leaf_header(extensions)?.key_type;
    log::info!("Cryptosystem detected: {}", key_type);
    Ok(key_type)
}

/// Role of the leaf certificate
pub fn get_role(extensions: &[Tlv<'_>]) -> AdacResult<u8> {
    let role = leaf_header(extensions)?.role;
    log::info!("Certificate role: {}", role);
    Ok(role)
}

/// Certificate chain loaded from disk
#[derive(Debug, Clone)]
pub struct CertificateChain {
    bytes: Vec<u8>,
}

impl CertificateChain {
    pub fn load(path: &Path) -> AdacResult<Self> {
        load_chain(path).map(Self::from_bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Records of the chain, at most [`MAX_EXTENSIONS`]
    pub fn extensions(&self) -> AdacResult<Extensions<'_>> {
        split_into_extensions(&self.bytes, MAX_EXTENSIONS)
    }
}

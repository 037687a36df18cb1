// Licensed under the Apache-2.0 license

use crate::{CryptoError, CryptoProvider, CryptoResult, KeyHandle};
use adac_host_command_types::KeyType;
use std::path::Path;
use zeroize::Zeroizing;

/// Key material the host authenticates with.
///
/// Asymmetric cryptosystems hand back a provider handle, MAC cryptosystems
/// hand back the shared secret itself.
pub enum HostKey {
    Handle(KeyHandle),
    Secret(Zeroizing<Vec<u8>>),
}

impl std::fmt::Debug for HostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostKey::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
            HostKey::Secret(secret) => write!(f, "Secret({} bytes)", secret.len()),
        }
    }
}

impl HostKey {
    pub fn handle(&self) -> Option<KeyHandle> {
        match self {
            HostKey::Handle(handle) => Some(*handle),
            HostKey::Secret(_) => None,
        }
    }

    pub fn secret(&self) -> Option<&[u8]> {
        match self {
            HostKey::Secret(secret) => Some(secret.as_slice()),
            HostKey::Handle(_) => None,
        }
    }
}

fn read_key_file(path: &Path) -> CryptoResult<Zeroizing<Vec<u8>>> {
    std::fs::read(path)
        .map(Zeroizing::new)
        .map_err(|source| CryptoError::KeyFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the host key for `key_type` from `path`.
///
/// Asymmetric keys are PEM files imported into `provider`. MAC keys are raw
/// binary secrets.
pub fn get_private_key(
    provider: &mut dyn CryptoProvider,
    path: &Path,
    key_type: u8,
) -> CryptoResult<HostKey> {
    let Some(kind) = KeyType::from_raw(key_type) else {
        log::info!("Unsupported key type (0x{:x})", key_type);
        return Err(CryptoError::UnsupportedKeyType(key_type));
    };

    let contents = read_key_file(path)?;
    if kind.is_symmetric() {
        if contents.is_empty() {
            log::error!("Could not import secret key ({})", path.display());
            return Err(CryptoError::InvalidKey("empty secret".into()));
        }
        return Ok(HostKey::Secret(contents));
    }

    let pem = std::str::from_utf8(&contents)
        .map_err(|_| CryptoError::InvalidKey("key file is not PEM text".into()))?;
    let handle = provider.import_private_key(kind, pem).inspect_err(|e| {
        log::error!("Could not import private key ({}): {}", path.display(), e);
    })?;
    Ok(HostKey::Handle(handle))
}

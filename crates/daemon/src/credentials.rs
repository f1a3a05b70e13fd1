//! Resolution of the email API key.
//!
//! A plain key wins. Otherwise an encrypted key (hex of
//! `12-byte nonce || AES-256-GCM ciphertext || tag`) is opened with a
//! decryption key that must be exactly 32 bytes.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use stockwatch_core::WatchError;

pub const DECRYPTION_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct KeyMaterial {
    pub api_key: Option<String>,
    pub encrypted_api_key: Option<String>,
    pub decryption_key: Option<String>,
}

/// Returns the usable API key, `None` when nothing is configured.
pub fn resolve_api_key(material: &KeyMaterial) -> Result<Option<String>, WatchError> {
    if let Some(key) = non_empty(&material.api_key) {
        return Ok(Some(key.to_string()));
    }
    let Some(ciphertext) = non_empty(&material.encrypted_api_key) else {
        return Ok(None);
    };
    // The secret is used byte-for-byte: whitespace counts towards its length.
    let secret = material
        .decryption_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WatchError::Credential("encrypted key set without a decryption key".into()))?;
    decrypt_api_key(ciphertext, secret.as_bytes()).map(Some)
}

pub fn decrypt_api_key(hex_payload: &str, secret: &[u8]) -> Result<String, WatchError> {
    if secret.len() != DECRYPTION_KEY_LEN {
        return Err(WatchError::Credential(format!(
            "decryption key must be exactly {DECRYPTION_KEY_LEN} bytes, got {}",
            secret.len()
        )));
    }

    let mut bytes = hex::decode(hex_payload.trim())
        .map_err(|e| WatchError::Credential(format!("encrypted key is not hex: {e}")))?;
    if bytes.len() <= NONCE_LEN {
        return Err(WatchError::Credential("encrypted key too short".into()));
    }
    let mut sealed = bytes.split_off(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(&bytes)
        .map_err(|_| WatchError::Credential("bad nonce".into()))?;

    let key = UnboundKey::new(&AES_256_GCM, secret)
        .map_err(|_| WatchError::Credential("bad decryption key".into()))?;
    let plain = LessSafeKey::new(key)
        .open_in_place(nonce, Aad::empty(), &mut sealed)
        .map_err(|_| WatchError::Credential("encrypted key failed authentication".into()))?;

    String::from_utf8(plain.to_vec())
        .map_err(|_| WatchError::Credential("decrypted key is not UTF-8".into()))
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

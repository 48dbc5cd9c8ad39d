//! AES-256-GCM sealing for persisted tokens.
//!
//! The file-backed credential store never writes token plaintext to disk:
//! values are sealed with AES-256-GCM under a key derived from the store
//! passphrase. Output is base64 with a random 12-byte nonce prepended.

use rand::RngCore;
use sha2::{Digest, Sha256};

use super::StoreError;

/// Nonce size for AES-256-GCM (12 bytes).
const NONCE_SIZE: usize = 12;
/// AES-256 key size (32 bytes).
const KEY_SIZE: usize = 32;
/// GCM tag size (16 bytes).
const TAG_SIZE: usize = 16;

/// Derive a 32-byte key from the store passphrase using SHA-256.
fn derive_key(passphrase: &str) -> [u8; KEY_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    let digest = hasher.finalize();
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

/// Seal a token value. Returns base64-encoded `nonce || ciphertext || tag`.
pub fn seal(plaintext: &str, passphrase: &str) -> Result<String, StoreError> {
    use aes_gcm::aead::Aead;
    use aes_gcm::{Aes256Gcm, KeyInit, Nonce};

    let key = derive_key(passphrase);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| StoreError::Crypto(format!("Key init failed: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| StoreError::Crypto(format!("Sealing failed: {e}")))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.encode(&combined))
}

/// Open a sealed token value produced by [`seal`].
pub fn open(sealed_b64: &str, passphrase: &str) -> Result<String, StoreError> {
    use aes_gcm::aead::Aead;
    use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
    use base64::Engine;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(sealed_b64)
        .map_err(|e| StoreError::Crypto(format!("Base64 decode failed: {e}")))?;

    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(StoreError::Crypto("Sealed value too short".into()));
    }

    let key = derive_key(passphrase);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| StoreError::Crypto(format!("Key init failed: {e}")))?;

    let nonce = Nonce::from_slice(&combined[..NONCE_SIZE]);
    let ciphertext = &combined[NONCE_SIZE..];

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| StoreError::Crypto(format!("Opening failed: {e}")))?;

    String::from_utf8(plaintext).map_err(|e| StoreError::Crypto(format!("UTF-8 decode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let passphrase = "haulog-test-passphrase";
        let token = "eyJhbGciOiJIUzI1NiJ9.stub.payload";
        let sealed = seal(token, passphrase).unwrap();
        assert_ne!(sealed, token);
        assert_eq!(open(&sealed, passphrase).unwrap(), token);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let sealed = seal("A1", "correct-passphrase").unwrap();
        assert!(open(&sealed, "wrong-passphrase").is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        use base64::Engine;
        let engine = &base64::engine::general_purpose::STANDARD;
        let sealed = seal("A1", "passphrase").unwrap();
        let mut bytes = engine.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(open(&engine.encode(&bytes), "passphrase").is_err());
    }

    #[test]
    fn empty_plaintext() {
        let sealed = seal("", "passphrase").unwrap();
        assert_eq!(open(&sealed, "passphrase").unwrap(), "");
    }
}

//! Field-level encryption for export files
//!
//! Key: SHA-256(password ‖ salt). This is the key schedule of every export
//! file written so far and has to stay byte-for-byte identical to read them.
//!
//! Cipher: AES-256-GCM. Each field is sealed with its own random 96-bit nonce
//! and stored as base64(nonce ‖ ciphertext ‖ tag).

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::error::TransferError;

/// Lengths of fixed-size fields
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Symmetric key derived for one export or import call
pub type FieldKey = Zeroizing<[u8; KEY_LEN]>;

/// Generate a fresh export salt using the OS RNG
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the field key from a password and salt
pub fn derive_key(password: &str, salt: &[u8]) -> FieldKey {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&hasher.finalize());
    key
}

/// Encrypt one secret field, returning the base64 blob
pub fn encrypt_field(plaintext: &str, key: &FieldKey) -> Result<String, TransferError> {
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| TransferError::EncryptionFailed)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // AES-GCM appends the tag to the ciphertext
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| TransferError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(blob))
}

/// Decrypt one secret field.
///
/// Bad base64, a truncated blob, a failed tag check and non-UTF-8 plaintext
/// all report the same `DecryptionFailed`.
pub fn decrypt_field(blob: &str, key: &FieldKey) -> Result<String, TransferError> {
    let combined = BASE64
        .decode(blob.trim())
        .map_err(|_| TransferError::DecryptionFailed)?;

    if combined.len() < NONCE_LEN + TAG_LEN {
        return Err(TransferError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(&key[..]).map_err(|_| TransferError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| TransferError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| TransferError::DecryptionFailed)
}

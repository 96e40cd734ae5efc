//! AES-256-GCM encryptor for static provider secrets at rest.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cloudtrust_application::SecretEncryptor;
use cloudtrust_core::{AppError, AppResult};

const NONCE_LEN: usize = 12;

/// AES-256-GCM encryptor for secret access keys stored in IdP configs.
///
/// Stored form is `base64(nonce || ciphertext)`.
#[derive(Clone)]
pub struct AesSecretEncryptor {
    cipher: Aes256Gcm,
}

impl AesSecretEncryptor {
    /// Creates a new encryptor from a 32-byte key.
    #[must_use]
    pub fn new(key_bytes: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(key_bytes.into());
        Self { cipher }
    }

    /// Creates a new encryptor from a hex-encoded 32-byte key.
    pub fn from_hex(hex_key: &str) -> AppResult<Self> {
        let decoded = hex::decode(hex_key.trim()).map_err(|error| {
            AppError::InvalidArgument(format!("invalid SECRET_ENCRYPTION_KEY hex: {error}"))
        })?;

        let key: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            AppError::InvalidArgument(
                "SECRET_ENCRYPTION_KEY must be exactly 32 bytes (64 hex chars)".to_owned(),
            )
        })?;

        Ok(Self::new(&key))
    }
}

impl SecretEncryptor for AesSecretEncryptor {
    fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|error| AppError::Internal(format!("failed to encrypt secret: {error}")))?;

        let mut stored = Vec::with_capacity(nonce.len() + ciphertext.len());
        stored.extend_from_slice(&nonce);
        stored.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(stored))
    }

    fn decrypt(&self, ciphertext: &str) -> AppResult<String> {
        let stored = STANDARD.decode(ciphertext.trim()).map_err(|error| {
            AppError::InvalidArgument(format!("encrypted secret is not valid base64: {error}"))
        })?;

        if stored.len() <= NONCE_LEN {
            return Err(AppError::InvalidArgument(
                "encrypted secret too short: missing nonce".to_owned(),
            ));
        }

        let (nonce_bytes, encrypted) = stored.split_at(NONCE_LEN);
        let nonce_array: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| AppError::Internal("nonce must be exactly 12 bytes".to_owned()))?;
        let nonce = Nonce::from(nonce_array);

        let plaintext = self
            .cipher
            .decrypt(&nonce, encrypted)
            .map_err(|error| AppError::Internal(format!("failed to decrypt secret: {error}")))?;

        String::from_utf8(plaintext).map_err(|error| {
            AppError::Internal(format!("decrypted secret is not valid utf-8: {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() -> AppResult<()> {
        let encryptor = AesSecretEncryptor::new(&[42u8; 32]);

        let encrypted = encryptor.encrypt("wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY")?;
        assert_ne!(encrypted, "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY");

        let decrypted = encryptor.decrypt(&encrypted)?;
        assert_eq!(decrypted, "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY");
        Ok(())
    }

    #[test]
    fn decrypt_with_wrong_key_fails() -> AppResult<()> {
        let encryptor1 = AesSecretEncryptor::new(&[42u8; 32]);
        let encryptor2 = AesSecretEncryptor::new(&[99u8; 32]);

        let encrypted = encryptor1.encrypt("secret")?;
        assert!(encryptor2.decrypt(&encrypted).is_err());
        Ok(())
    }

    #[test]
    fn from_hex_rejects_short_keys() {
        assert!(matches!(
            AesSecretEncryptor::from_hex("abcd"),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(AesSecretEncryptor::from_hex(&"ab".repeat(32)).is_ok());
    }

    #[test]
    fn decrypt_rejects_plaintext_input() {
        let encryptor = AesSecretEncryptor::new(&[7u8; 32]);

        assert!(matches!(
            encryptor.decrypt("not base64 at all!"),
            Err(AppError::InvalidArgument(_))
        ));
    }
}

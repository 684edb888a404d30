//! Request body encryption.
//!
//! The JSON API expects every request body but the partner login encrypted
//! with Blowfish in ECB mode under the partner encryption key. Plaintext is
//! zero-padded to the block size and the ciphertext is sent as lower-case
//! hex.
//!
//! The server time returned by the partner login is encrypted the same way
//! under the partner decryption key. Its plaintext is four bytes of noise
//! followed by the time in seconds since the epoch as ASCII digits.

use std::fmt;

use blowfish::{
    cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit},
    Blowfish,
};

use crate::error::{Error, Result};

pub struct Crypt {
    encryptor: Blowfish,
    decryptor: Blowfish,
}

impl Crypt {
    /// Blowfish block size in bytes.
    pub const BLOCK_SIZE: usize = 8;

    /// Bytes of noise preceding the server time.
    const SYNC_TIME_PREFIX: usize = 4;

    /// Creates a cipher pair from the partner keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a key has an invalid length for Blowfish.
    pub fn new(encryption_key: &str, decryption_key: &str) -> Result<Self> {
        let encryptor = Blowfish::new_from_slice(encryption_key.as_bytes())
            .map_err(|_| Error::invalid_argument("invalid encryption key length"))?;
        let decryptor = Blowfish::new_from_slice(decryption_key.as_bytes())
            .map_err(|_| Error::invalid_argument("invalid decryption key length"))?;

        Ok(Self {
            encryptor,
            decryptor,
        })
    }

    /// Encrypts `plaintext` and returns it hex-encoded.
    #[must_use]
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut buffer = plaintext.as_bytes().to_vec();
        let padded_len = buffer.len().div_ceil(Self::BLOCK_SIZE) * Self::BLOCK_SIZE;
        buffer.resize(padded_len, 0);

        for chunk in buffer.chunks_exact_mut(Self::BLOCK_SIZE) {
            self.encryptor
                .encrypt_block(GenericArray::from_mut_slice(chunk));
        }

        hex::encode(buffer)
    }

    /// Decrypts hex-encoded `ciphertext`. Padding is left in place.
    ///
    /// # Errors
    ///
    /// Returns `DataLoss` if `ciphertext` is not hex or not a whole number
    /// of blocks.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>> {
        let mut buffer = hex::decode(ciphertext.trim())?;
        if buffer.len() % Self::BLOCK_SIZE != 0 {
            return Err(Error::data_loss(format!(
                "ciphertext of {} bytes is not block aligned",
                buffer.len()
            )));
        }

        for chunk in buffer.chunks_exact_mut(Self::BLOCK_SIZE) {
            self.decryptor
                .decrypt_block(GenericArray::from_mut_slice(chunk));
        }

        Ok(buffer)
    }

    /// Decrypts the server time returned by the partner login.
    ///
    /// # Errors
    ///
    /// Returns `DataLoss` if the ciphertext is malformed or holds no time.
    pub fn decrypt_sync_time(&self, ciphertext: &str) -> Result<u64> {
        let plaintext = self.decrypt(ciphertext)?;
        let digits: String = plaintext
            .iter()
            .skip(Self::SYNC_TIME_PREFIX)
            .take_while(|byte| byte.is_ascii_digit())
            .map(|&byte| char::from(byte))
            .collect();

        if digits.is_empty() {
            return Err(Error::data_loss("sync time holds no digits"));
        }

        Ok(digits.parse()?)
    }
}

impl fmt::Debug for Crypt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crypt").finish_non_exhaustive()
    }
}

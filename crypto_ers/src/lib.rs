/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! # Crypto ERS
//! The symmetric primitives the encrypted multi-map is built from: SHA-512,
//! HMAC-SHA-512, HKDF-SHA-512, PBKDF2, AES-CBC with PKCS#7 padding, and the
//! OS CSRNG. Every parameter is fixed here so the rest of the workspace
//! never names an algorithm.
//!
//! Key policy: a seed of 16, 24 or 32 bytes. [`hash_kdf`] derives sub-keys
//! of the same length as the seed, which in turn picks AES-128, AES-192 or
//! AES-256. Anything else is [`CryptoError::InvalidKey`].

pub mod errors;
pub use errors::{CryptoError, CryptoResult};

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Output width of SHA-512 and HMAC-SHA-512, and therefore of every label
/// in an encrypted index.
pub const DIGEST_LEN: usize = 64;

/// AES block width; also the length of the IV carried at the tail of each
/// ciphertext.
pub const IV_LEN: usize = 16;

/// PBKDF2 work factor for [`password_kdf`].
pub const PBKDF2_ITERATIONS: u32 = 100_000;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// The client's seed. Held by the client only; the server side of the
/// protocol never sees one. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> SecretKey {
        SecretKey { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SecretKey({} bytes)", self.bytes.len())
    }
}

/// Computes the SHA-512 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; DIGEST_LEN] {
    use sha2::Digest;
    let digest = Sha512::digest(data);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Computes the HMAC-SHA-512 of `data` under `key`. Use this for a keyed
/// hash rather than hashing a concatenation; plain concatenation leaks
/// under extension attacks.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(key).expect("hmac accepts keys of any length");
    mac.update(data);
    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&tag);
    out
}

/// Compares two MACs in constant time with respect to the number of
/// matching bytes.
pub fn hmac_equal(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Derives a purpose-separated sub-key from `key` via HKDF-SHA-512 with no
/// salt. The output has the same length as the input, so a valid seed
/// always derives a valid AES key.
pub fn hash_kdf(key: &[u8], purpose: &str) -> Vec<u8> {
    let hk = hkdf::Hkdf::<Sha512>::new(None, key);
    let mut okm = vec![0u8; key.len()];
    hk.expand(purpose.as_bytes(), &mut okm)
        .expect("output as long as the seed is within hkdf-sha512 bounds");
    okm
}

/// Stretches a password into `key_len` key bytes with
/// PBKDF2-HMAC-SHA-256. The salt should differ per user.
pub fn password_kdf(password: &str, salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; key_len];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

/// Encrypts `plaintext` under AES-CBC with PKCS#7 padding and a fresh
/// random IV. The IV rides as the last [`IV_LEN`] bytes of the returned
/// ciphertext.
pub fn symmetric_encrypt(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let iv = secure_random(IV_LEN);
    let mut ciphertext = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, &iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => Aes192CbcEnc::new_from_slices(key, &iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => Aes256CbcEnc::new_from_slices(key, &iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        len => return Err(CryptoError::InvalidKey(len)),
    };
    ciphertext.extend_from_slice(&iv);
    Ok(ciphertext)
}

/// Decrypts a ciphertext produced by [`symmetric_encrypt`]. A failed
/// padding check surfaces as [`CryptoError::DecryptFailed`], which is what
/// decrypting under the wrong key looks like.
pub fn symmetric_decrypt(key: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < IV_LEN + 16 || (ciphertext.len() - IV_LEN) % 16 != 0 {
        return Err(CryptoError::TruncatedCiphertext(ciphertext.len()));
    }
    let (body, iv) = ciphertext.split_at(ciphertext.len() - IV_LEN);
    match key.len() {
        16 => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| CryptoError::DecryptFailed),
        24 => Aes192CbcDec::new_from_slices(key, iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| CryptoError::DecryptFailed),
        32 => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| CryptoError::InvalidKey(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| CryptoError::DecryptFailed),
        len => Err(CryptoError::InvalidKey(len)),
    }
}

/// Draws `num_bytes` bytes from the OS CSRNG. Suitable for seeds and IVs.
pub fn secure_random(num_bytes: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; num_bytes];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let messages: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"p".to_vec(),
            b"sixteen byte msg".to_vec(),
            vec![7u8; 1 << 20],
        ];
        for key_len in [16usize, 24, 32] {
            let key = secure_random(key_len);
            for msg in &messages {
                let ct = symmetric_encrypt(&key, msg).unwrap();
                assert_eq!(ct.len() % 16, 0);
                assert!(ct.len() >= msg.len() + IV_LEN);
                assert_eq!(symmetric_decrypt(&key, &ct).unwrap(), *msg);
            }
        }
    }

    #[test]
    fn fresh_ivs_give_fresh_ciphertexts() {
        let key = secure_random(16);
        let a = symmetric_encrypt(&key, b"same message").unwrap();
        let b = symmetric_encrypt(&key, b"same message").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_decrypt_fails_or_garbles() {
        let k1 = secure_random(16);
        let k2 = secure_random(16);
        let ct = symmetric_encrypt(&k1, b"the plaintext").unwrap();
        // A wrong key almost always trips the padding check; on the rare
        // draw where stray padding validates, the plaintext is garbage.
        match symmetric_decrypt(&k2, &ct) {
            Err(CryptoError::DecryptFailed) => {}
            Ok(pt) => assert_ne!(pt, b"the plaintext".to_vec()),
            Err(e) => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn bad_key_lengths_are_rejected() {
        assert!(matches!(
            symmetric_encrypt(&[0u8; 15], b"x"),
            Err(CryptoError::InvalidKey(15))
        ));
        let ct = symmetric_encrypt(&[0u8; 16], b"x").unwrap();
        assert!(matches!(
            symmetric_decrypt(&[0u8; 17], &ct),
            Err(CryptoError::InvalidKey(17))
        ));
    }

    #[test]
    fn truncated_ciphertexts_are_rejected() {
        assert!(matches!(
            symmetric_decrypt(&[0u8; 16], &[0u8; 16]),
            Err(CryptoError::TruncatedCiphertext(16))
        ));
        assert!(matches!(
            symmetric_decrypt(&[0u8; 16], &[0u8; 33]),
            Err(CryptoError::TruncatedCiphertext(33))
        ));
    }

    #[test]
    fn kdf_purposes_separate() {
        let seed = secure_random(16);
        let hmac_key = hash_kdf(&seed, "hmac");
        let enc_key = hash_kdf(&seed, "encryption");
        assert_eq!(hmac_key.len(), seed.len());
        assert_eq!(enc_key.len(), seed.len());
        assert_ne!(hmac_key, enc_key);
        // Deterministic per seed and purpose.
        assert_eq!(hmac_key, hash_kdf(&seed, "hmac"));
    }

    #[test]
    fn hmac_is_keyed_and_deterministic() {
        let t1 = hmac_sha512(b"key one", b"data");
        let t2 = hmac_sha512(b"key two", b"data");
        assert_ne!(t1, t2);
        assert_eq!(t1, hmac_sha512(b"key one", b"data"));
        assert!(hmac_equal(&t1, &t1));
        assert!(!hmac_equal(&t1, &t2));
    }

    #[test]
    fn password_kdf_is_deterministic_per_salt() {
        let a = password_kdf("hunter2", b"salt-a", 32);
        let b = password_kdf("hunter2", b"salt-a", 32);
        let c = password_kdf("hunter2", b"salt-b", 32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn secure_random_draws_differ() {
        assert_eq!(secure_random(16).len(), 16);
        assert_ne!(secure_random(16), secure_random(16));
    }
}

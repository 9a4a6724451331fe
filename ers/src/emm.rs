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

//! # The encrypted multi-map engine
//! The one place labels meet keys. A scheme hands the engine a *modified*
//! multimap (cover bytes to payload lists, after its own cover expansion)
//! and gets back a flat map from 64-byte digests to ciphertexts that can be
//! handed to the server whole.
//!
//! Per label the engine computes `token = HMAC-SHA512(hmac_key, label)` and
//! stores the i-th payload under `Hash(token || byte(i))`. The chained
//! index byte keeps multi-payload labels flat without any per-label length
//! table: search just probes indices upward and stops at the first miss.
//! The miss is the termination signal, not an error. A chain longer than
//! 256 payloads cannot be addressed by one byte and is rejected at build
//! time.
//!
//! Whatever byte encoding a scheme uses for a cover at build time, its
//! trapdoors must reproduce bit for bit; a mismatch does not fail loudly,
//! it just never finds anything.

use hashbrown::HashMap;
use hashbrown::HashSet;
use log::debug;
use pbr::ProgressBar;
use rayon::prelude::*;
use std::fmt;

use crypto_ers::{
    hash, hash_kdf, hmac_sha512, secure_random, symmetric_decrypt, symmetric_encrypt, SecretKey,
    DIGEST_LEN,
};

use crate::errors::{ErsError, ErsResult};
use crate::structures::tree_height;

pub(crate) const PURPOSE_HMAC: &str = "hmac";
pub(crate) const PURPOSE_ENCRYPT: &str = "encryption";

/// Longest payload chain one label can carry.
pub const MAX_CHAIN: usize = 256;

/// An opaque payload as the data owner supplied it.
pub type Document = Vec<u8>;
/// An AES-CBC ciphertext with its IV riding in the last 16 bytes.
pub type Ciphertext = Vec<u8>;

/// A plaintext multimap from points to payload lists.
pub type PlaintextMultimap<P> = HashMap<P, Vec<Document>>;
/// A multimap after cover expansion: label bytes to payload lists.
pub type ModifiedMultimap = HashMap<Vec<u8>, Vec<Document>>;

/// What `search` returns and `resolve` consumes.
pub type CiphertextSet = HashSet<Ciphertext>;
/// What `resolve` returns.
pub type PlaintextSet = HashSet<Document>;
/// The trapdoor shape of the BRC and Linear schemes.
pub type TokenSet = HashSet<SearchToken>;

/// A lookup key of the encrypted index: a SHA-512 digest of a chained
/// token.
#[derive(Copy, Clone, PartialEq, Eq, std::hash::Hash)]
pub struct Label([u8; DIGEST_LEN]);

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Label({:02x}{:02x}{:02x}{:02x}..)", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// A server-opaque search token: the HMAC of one cover's label bytes.
#[derive(Copy, Clone, PartialEq, Eq, std::hash::Hash)]
pub struct SearchToken([u8; DIGEST_LEN]);

impl SearchToken {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Debug for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SearchToken({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// The server's share: a flat mapping from labels to ciphertexts. Built
/// once, read-only under search.
#[derive(Default)]
pub struct EncryptedIndex {
    entries: fxhash::FxHashMap<Label, Ciphertext>,
}

impl EncryptedIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &Label) -> Option<&Ciphertext> {
        self.entries.get(label)
    }
}

/// The engine every scheme delegates its cryptographic half to. Carries
/// the 2-D domain bounds; the 3-D schemes derive their z extent from the
/// x bound.
pub struct EmmEngine {
    max_x: u32,
    max_y: u32,
    verbosity: u32,
}

impl EmmEngine {
    pub fn new(max_x: u32, max_y: u32) -> EmmEngine {
        EmmEngine {
            max_x,
            max_y,
            verbosity: 0,
        }
    }

    /// Progress chatter on index builds. 0 is silent; above 1 draws a bar.
    pub fn set_verbosity(&mut self, x: u32) -> &mut Self {
        self.verbosity = x;
        self
    }

    pub fn max_x(&self) -> u32 {
        self.max_x
    }

    pub fn max_y(&self) -> u32 {
        self.max_y
    }

    /// Tree height covering the x extent of the domain.
    pub(crate) fn x_height(&self) -> u32 {
        tree_height(self.max_x)
    }

    /// Tree height covering the y extent of the domain.
    pub(crate) fn y_height(&self) -> u32 {
        tree_height(self.max_y)
    }

    /// Draws a fresh seed of `security_parameter` bytes. Valid sizes are
    /// 16, 24 and 32; the seed length fixes the AES variant downstream.
    pub fn setup(&self, security_parameter: usize) -> ErsResult<SecretKey> {
        match security_parameter {
            16 | 24 | 32 => Ok(SecretKey::new(secure_random(security_parameter))),
            n => Err(ErsError::Crypto(crypto_ers::CryptoError::InvalidKey(n))),
        }
    }

    /// Encrypts a cover-expanded multimap into the index the server holds.
    pub fn build_index(
        &self,
        key: &SecretKey,
        modified_mm: &ModifiedMultimap,
    ) -> ErsResult<EncryptedIndex> {
        let hmac_key = hash_kdf(key.as_bytes(), PURPOSE_HMAC);
        let enc_key = hash_kdf(key.as_bytes(), PURPOSE_ENCRYPT);

        debug!("encrypting {} labels", modified_mm.len());

        let chains: Vec<Vec<(Label, Ciphertext)>> = modified_mm
            .par_iter()
            .map(|(label, values)| {
                if values.len() > MAX_CHAIN {
                    return Err(ErsError::ChainOverflow(values.len()));
                }
                let token = hmac_sha512(&hmac_key, label);
                values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let ciphertext = symmetric_encrypt(&enc_key, value)?;
                        Ok((Label(chained_label(&token, index as u8)), ciphertext))
                    })
                    .collect()
            })
            .collect::<ErsResult<Vec<_>>>()?;

        let mut pb = ProgressBar::new(chains.len() as u64);
        let mut index = EncryptedIndex::default();
        for chain in chains {
            for (label, ciphertext) in chain {
                index.entries.insert(label, ciphertext);
            }
            if self.verbosity > 1 {
                pb.inc();
            }
        }
        debug!("encrypted index holds {} entries", index.len());
        Ok(index)
    }

    /// The trapdoor for one label: a pure function of the key and the
    /// label bytes.
    pub fn trapdoor(&self, key: &SecretKey, label: &[u8]) -> SearchToken {
        let hmac_key = hash_kdf(key.as_bytes(), PURPOSE_HMAC);
        SearchToken(hmac_sha512(&hmac_key, label))
    }

    /// Walks a token's chain until the first miss and returns whatever
    /// ciphertexts were on it.
    pub fn search(&self, token: &SearchToken, index: &EncryptedIndex) -> CiphertextSet {
        let mut results = CiphertextSet::new();
        for i in 0..MAX_CHAIN {
            match index.get(&Label(chained_label(&token.0, i as u8))) {
                Some(ciphertext) => {
                    results.insert(ciphertext.clone());
                }
                None => break,
            }
        }
        results
    }

    /// Decrypts a result set client-side. Fails on the first ciphertext
    /// that does not verify, which is what a wrong key looks like.
    pub fn resolve(&self, key: &SecretKey, results: &CiphertextSet) -> ErsResult<PlaintextSet> {
        let enc_key = hash_kdf(key.as_bytes(), PURPOSE_ENCRYPT);
        results
            .iter()
            .map(|ciphertext| symmetric_decrypt(&enc_key, ciphertext).map_err(ErsError::from))
            .collect()
    }
}

/// `Hash(token || byte(index))`, the storage label of one chain slot.
fn chained_label(token: &[u8; DIGEST_LEN], index: u8) -> [u8; DIGEST_LEN] {
    let mut buf = [0u8; DIGEST_LEN + 1];
    buf[..DIGEST_LEN].copy_from_slice(token);
    buf[DIGEST_LEN] = index;
    hash(&buf)
}

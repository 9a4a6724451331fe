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

//! The errors that can occur in the symmetric primitives.

use std::error::Error;
use std::fmt;

/// Helper type for a call that could go wrong.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Error type for the symmetric-crypto layer.
#[derive(Debug)]
pub enum CryptoError {
    /// A key whose length fits none of the supported AES variants.
    InvalidKey(usize),
    /// The padding check failed after decryption. This is what a wrong
    /// key looks like.
    DecryptFailed,
    /// A ciphertext too short (or misaligned) to hold the trailing IV and
    /// whole blocks.
    TruncatedCiphertext(usize),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CryptoError::InvalidKey(len) => {
                write!(f, "key of {} bytes fits no supported AES variant", len)
            }
            CryptoError::DecryptFailed => {
                write!(f, "padding check failed after decryption, likely a wrong key")
            }
            CryptoError::TruncatedCiphertext(len) => {
                write!(f, "ciphertext of {} bytes cannot hold an IV and whole blocks", len)
            }
        }
    }
}

impl Error for CryptoError {}

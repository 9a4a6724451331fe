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

//! The errors that can occur building an index or answering a query. Most
//! are floated up from the geometry and crypto layers. Every error is fatal
//! to the enclosing operation; nothing here retries. A missed search probe
//! is not an error, it terminates the probe loop.

use core_ers::CoreError;
use crypto_ers::CryptoError;
use std::error::Error;
use std::fmt;

/// Helper type for a call that could go wrong.
pub type ErsResult<T> = Result<T, ErsError>;

/// Error type for the scheme and engine layer. Mostly a wrapper around the
/// support crates' errors, as that is where things go wrong.
#[derive(Debug)]
pub enum ErsError {
    /// Geometry construction or wire decoding went wrong.
    Core(CoreError),
    /// A symmetric primitive rejected its input.
    Crypto(CryptoError),
    /// A query that no cover of the domain can answer. The public
    /// trapdoors normalize their corners, so this surfaces only when the
    /// query escapes the domain entirely.
    MalformedQuery,
    /// A multimap point outside the engine's domain bounds showed up at
    /// build time.
    PointOutsideDomain,
    /// More payloads under one label than the single-byte chain index can
    /// address.
    ChainOverflow(usize),
    /// A trapdoor was requested before `build_index` planted the trees.
    IndexNotBuilt,
}

impl fmt::Display for ErsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErsError::Core(ref e) => write!(f, "{}", e),
            ErsError::Crypto(ref e) => write!(f, "{}", e),
            ErsError::MalformedQuery => {
                write!(f, "no cover of the domain can answer this query")
            }
            ErsError::PointOutsideDomain => {
                write!(f, "a multimap point lies outside the domain bounds")
            }
            ErsError::ChainOverflow(n) => write!(
                f,
                "{} payloads under one label exceed the 256-entry chain",
                n
            ),
            ErsError::IndexNotBuilt => {
                write!(f, "build_index must run before trapdoors can be issued")
            }
        }
    }
}

impl Error for ErsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ErsError::Core(ref e) => Some(e),
            ErsError::Crypto(ref e) => Some(e),
            ErsError::MalformedQuery
            | ErsError::PointOutsideDomain
            | ErsError::ChainOverflow(..)
            | ErsError::IndexNotBuilt => None,
        }
    }
}

impl From<CoreError> for ErsError {
    fn from(err: CoreError) -> Self {
        ErsError::Core(err)
    }
}

impl From<CryptoError> for ErsError {
    fn from(err: CryptoError) -> Self {
        ErsError::Crypto(err)
    }
}

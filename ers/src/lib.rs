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

#![allow(dead_code)]

//! # ERS
//! Encrypted range search over 2-D and 3-D integer point databases. A data
//! owner holds a multimap from grid points to opaque payloads; a scheme
//! turns it into a secret key plus an encrypted index a semi-honest server
//! can hold, and answers axis-aligned range queries through trapdoors. The
//! server sees only HMAC-derived labels and AES ciphertexts; what it learns
//! is exactly the set of label lookups the chosen range cover induces.
//!
//! ## Picking a scheme
//! The schemes trade index size against query size. `Linear` issues one
//! token per grid cell of the query and keeps the index at one entry per
//! point. The BRC schemes (`RangeBrc`, `QuadBrc`, `QuadBrc3`) keep the
//! token count logarithmic by tagging every point with the tree nodes above
//! it. The SRC schemes (`TdagSrc`, `QdagSrc`, `QdagSrc3`) issue exactly one
//! token per query and pay for it with a larger index, since every point is
//! tagged with every cover that could ever be that token. SRC covers may
//! exceed the query, so expect (and post-filter) false positives there.
//!
//! Domain side lengths round up to the next power of two; coordinates are
//! non-negative integers.

pub mod errors;
pub use errors::{ErsError, ErsResult};

pub mod emm;
pub mod schemes;
pub mod structures;

pub use emm::*;
pub use schemes::*;

pub use core_ers::*;
pub use crypto_ers::SecretKey;

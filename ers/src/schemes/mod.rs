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

//! # The schemes
//! Each scheme binds one cover algorithm to the EMM engine: the cover
//! algorithm decides which labels a point is filed under at build time and
//! which labels a query probes, the engine does everything cryptographic.
//! The trapdoor type says which family a scheme belongs to: a whole
//! [`TokenSet`] for the BRC and Linear schemes, a single [`SearchToken`]
//! for the SRC schemes.

mod linear;
mod qdag_src;
mod qdag_src_3d;
mod quad_brc;
mod quad_brc_3d;
mod range_brc;
mod tdag_src;

pub use linear::{Linear, Linear3};
pub use qdag_src::QdagSrc;
pub use qdag_src_3d::QdagSrc3;
pub use quad_brc::QuadBrc;
pub use quad_brc_3d::QuadBrc3;
pub use range_brc::RangeBrc;
pub use tdag_src::TdagSrc;

use core_ers::wire::{object_to_bytes, Obj};
use core_ers::{Point, Point3};
use crypto_ers::SecretKey;

use crate::emm::{CiphertextSet, EmmEngine, PlaintextMultimap, PlaintextSet};
use crate::errors::ErsResult;
use crate::structures::Interval;

/// The scheme-level contract: `setup`, `build_index`, `trapdoor`,
/// `search`, `resolve`. An instance owns one encrypted index; queries are
/// issued against whatever `build_index` last planted.
pub trait RangeSearchScheme {
    /// `Point` for the 2-D schemes, `Point3` for their siblings.
    type Point;
    /// [`crate::emm::SearchToken`] for SRC schemes, [`crate::emm::TokenSet`]
    /// for BRC and Linear.
    type Trapdoor;

    /// The engine this scheme delegates its cryptographic half to.
    fn engine(&self) -> &EmmEngine;

    /// Draws a fresh secret key. Client-side.
    fn setup(&self, security_parameter: usize) -> ErsResult<SecretKey> {
        self.engine().setup(security_parameter)
    }

    /// Expands every point into its covers and encrypts the result into
    /// the index the server will hold.
    fn build_index(
        &mut self,
        key: &SecretKey,
        plaintext_mm: &PlaintextMultimap<Self::Point>,
    ) -> ErsResult<()>;

    /// Turns the closed query box `[p1, p2]` into server-opaque tokens.
    /// Corners are normalized componentwise, so the two points may come in
    /// any dominance order.
    fn trapdoor(
        &self,
        key: &SecretKey,
        p1: Self::Point,
        p2: Self::Point,
    ) -> ErsResult<Self::Trapdoor>;

    /// The server side: probe the index and hand back ciphertexts.
    fn search(&self, trapdoor: &Self::Trapdoor) -> CiphertextSet;

    /// Decrypts a result set. Client-side, needs the key.
    fn resolve(&self, key: &SecretKey, results: &CiphertextSet) -> ErsResult<PlaintextSet> {
        self.engine().resolve(key, results)
    }
}

/// Componentwise min/max of a query's corners.
pub(crate) fn normalize(p1: Point, p2: Point) -> (Point, Point) {
    (
        Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
        Point::new(p1.x.max(p2.x), p1.y.max(p2.y)),
    )
}

/// Componentwise min/max of a 3-D query's corners.
pub(crate) fn normalize3(p1: Point3, p2: Point3) -> (Point3, Point3) {
    (
        Point3::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
        Point3::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
    )
}

fn interval_obj(interval: Interval) -> Obj {
    Obj::List(vec![Obj::from(interval.0), Obj::from(interval.1)])
}

/// The label of an (x interval, y interval) cover pair: a two element list
/// of two element lists, the shared wire shape of the range-BRC and
/// TDAG-SRC schemes.
pub(crate) fn interval_pair_label(x: Interval, y: Interval) -> Vec<u8> {
    object_to_bytes(&Obj::List(vec![interval_obj(x), interval_obj(y)]))
}

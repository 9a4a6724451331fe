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

//! # Quad-BRC
//! The geometric BRC: a point is filed under the aligned square of every
//! size containing it (one per level), and a query decomposes into the
//! maximal tree squares it swallows. Labels are packed rect bytes rather
//! than JSON.

use core_ers::{Point, Rect};
use crypto_ers::SecretKey;

use super::{normalize, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, TokenSet,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::{tree_height, QuadTree};

/// The 2-D quad-BRC scheme.
pub struct QuadBrc {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    quad: Option<QuadTree>,
}

impl QuadBrc {
    pub fn new(engine: EmmEngine) -> QuadBrc {
        QuadBrc {
            engine,
            encrypted_db: EncryptedIndex::default(),
            quad: None,
        }
    }
}

impl RangeSearchScheme for QuadBrc {
    type Point = Point;
    type Trapdoor = TokenSet;

    fn engine(&self) -> &EmmEngine {
        &self.engine
    }

    fn build_index(
        &mut self,
        key: &SecretKey,
        plaintext_mm: &PlaintextMultimap<Point>,
    ) -> ErsResult<()> {
        let level = tree_height(self.engine.max_x().max(self.engine.max_y()));
        let top = (1u32 << level) - 1;
        let quad = QuadTree::new(
            Rect::new_unchecked(Point::new(0, 0), Point::new(top, top)),
            level,
        );

        let mut modified = ModifiedMultimap::new();
        for (point, files) in plaintext_mm {
            for cover in quad.find_containing_range_covers(*point) {
                modified
                    .entry(cover.packed().to_vec())
                    .or_insert_with(Vec::new)
                    .extend(files.iter().cloned());
            }
        }

        self.encrypted_db = self.engine.build_index(key, &modified)?;
        self.quad = Some(quad);
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point, p2: Point) -> ErsResult<TokenSet> {
        let quad = self.quad.as_ref().ok_or(ErsError::IndexNotBuilt)?;
        let (p1, p2) = normalize(p1, p2);
        let query = Rect::new_unchecked(p1, p2);

        let mut trapdoors = TokenSet::new();
        for cover in quad.get_brc_range_cover(&query) {
            trapdoors.insert(self.engine.trapdoor(key, &cover.packed()));
        }
        Ok(trapdoors)
    }

    fn search(&self, trapdoors: &TokenSet) -> CiphertextSet {
        let mut results = CiphertextSet::new();
        for trapdoor in trapdoors {
            results.extend(self.engine.search(trapdoor, &self.encrypted_db));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{mm2, payloads, run};
    use super::*;

    #[test]
    fn aligned_and_ragged_queries_resolve() {
        let mm = mm2(&[(3, 5, b"p"), (0, 0, b"q")]);

        // ragged query holding only (3,5)
        let got = run(
            &mut QuadBrc::new(EmmEngine::new(8, 8)),
            &mm,
            Point::new(2, 2),
            Point::new(5, 7),
        );
        assert_eq!(got, payloads(&[b"p"]));

        // aligned quadrant holding only (0,0)
        let got = run(
            &mut QuadBrc::new(EmmEngine::new(8, 8)),
            &mm,
            Point::new(0, 0),
            Point::new(3, 3),
        );
        assert_eq!(got, payloads(&[b"q"]));
    }

    #[test]
    fn index_expansion_is_one_cover_per_level() {
        let mut scheme = QuadBrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm2(&[(3, 5, b"p")])).unwrap();
        // levels 0..=3 in an 8x8 domain, one chain slot each
        assert_eq!(scheme.encrypted_db.len(), 4);
    }

    #[test]
    fn whole_domain_query_is_one_token() {
        let mut scheme = QuadBrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm2(&[(1, 1, b"p")])).unwrap();
        let trapdoors = scheme
            .trapdoor(&key, Point::new(0, 0), Point::new(7, 7))
            .unwrap();
        assert_eq!(trapdoors.len(), 1);
    }
}

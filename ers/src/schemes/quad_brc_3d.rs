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

//! The 3-D sibling of [`super::quad_brc`], over an oct tree. The cube
//! domain is sized from the x and y bounds; the z extent shares them.

use core_ers::{Point3, Rect3};
use crypto_ers::SecretKey;

use super::{normalize3, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, TokenSet,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::{tree_height, OctTree};

/// The 3-D quad-BRC scheme.
pub struct QuadBrc3 {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    oct: Option<OctTree>,
}

impl QuadBrc3 {
    pub fn new(engine: EmmEngine) -> QuadBrc3 {
        QuadBrc3 {
            engine,
            encrypted_db: EncryptedIndex::default(),
            oct: None,
        }
    }
}

impl RangeSearchScheme for QuadBrc3 {
    type Point = Point3;
    type Trapdoor = TokenSet;

    fn engine(&self) -> &EmmEngine {
        &self.engine
    }

    fn build_index(
        &mut self,
        key: &SecretKey,
        plaintext_mm: &PlaintextMultimap<Point3>,
    ) -> ErsResult<()> {
        let level = tree_height(self.engine.max_x().max(self.engine.max_y()));
        let top = (1u32 << level) - 1;
        let oct = OctTree::new(
            Rect3::new_unchecked(Point3::new(0, 0, 0), Point3::new(top, top, top)),
            level,
        );

        let mut modified = ModifiedMultimap::new();
        for (point, files) in plaintext_mm {
            for cover in oct.find_containing_range_covers(*point) {
                modified
                    .entry(cover.packed().to_vec())
                    .or_insert_with(Vec::new)
                    .extend(files.iter().cloned());
            }
        }

        self.encrypted_db = self.engine.build_index(key, &modified)?;
        self.oct = Some(oct);
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point3, p2: Point3) -> ErsResult<TokenSet> {
        let oct = self.oct.as_ref().ok_or(ErsError::IndexNotBuilt)?;
        let (p1, p2) = normalize3(p1, p2);
        let query = Rect3::new_unchecked(p1, p2);

        let mut trapdoors = TokenSet::new();
        for cover in oct.get_brc_range_cover(&query) {
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
    use super::super::tests::{mm3, payloads, run};
    use super::*;

    #[test]
    fn the_whole_domain_returns_the_point() {
        // 4x4x4 domain, point (1,2,3), full-domain query
        let mm = mm3(&[(1, 2, 3, b"z")]);
        let got = run(
            &mut QuadBrc3::new(EmmEngine::new(4, 4)),
            &mm,
            Point3::new(0, 0, 0),
            Point3::new(3, 3, 3),
        );
        assert_eq!(got, payloads(&[b"z"]));
    }

    #[test]
    fn octant_queries_stay_disjoint() {
        let mm = mm3(&[(0, 0, 0, b"low"), (3, 3, 3, b"high")]);
        let got = run(
            &mut QuadBrc3::new(EmmEngine::new(4, 4)),
            &mm,
            Point3::new(0, 0, 0),
            Point3::new(1, 1, 1),
        );
        assert_eq!(got, payloads(&[b"low"]));
        let got = run(
            &mut QuadBrc3::new(EmmEngine::new(4, 4)),
            &mm,
            Point3::new(2, 2, 2),
            Point3::new(3, 3, 3),
        );
        assert_eq!(got, payloads(&[b"high"]));
    }
}

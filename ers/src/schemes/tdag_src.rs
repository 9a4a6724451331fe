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

//! # TDAG-SRC
//! One TDAG per axis. Build time files a point under every (x cover,
//! y cover) pair of its middle-augmented descent paths; query time asks
//! each axis for its one single range cover and issues exactly one token.
//! The covers can overshoot the query, so the result may carry false
//! positives the client filters after resolve.

use core_ers::Point;
use crypto_ers::SecretKey;

use super::{interval_pair_label, normalize, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, SearchToken,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::Tdag;

/// The 2-D TDAG-SRC scheme.
pub struct TdagSrc {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    x_tree: Option<Tdag>,
    y_tree: Option<Tdag>,
}

impl TdagSrc {
    pub fn new(engine: EmmEngine) -> TdagSrc {
        TdagSrc {
            engine,
            encrypted_db: EncryptedIndex::default(),
            x_tree: None,
            y_tree: None,
        }
    }
}

impl RangeSearchScheme for TdagSrc {
    type Point = Point;
    type Trapdoor = SearchToken;

    fn engine(&self) -> &EmmEngine {
        &self.engine
    }

    fn build_index(
        &mut self,
        key: &SecretKey,
        plaintext_mm: &PlaintextMultimap<Point>,
    ) -> ErsResult<()> {
        let x_tree = Tdag::new(self.engine.x_height());
        let y_tree = Tdag::new(self.engine.y_height());

        let mut modified = ModifiedMultimap::new();
        for (point, vals) in plaintext_mm {
            if point.x > x_tree.domain().1 || point.y > y_tree.domain().1 {
                return Err(ErsError::PointOutsideDomain);
            }
            let y_covers = Tdag::descend_with_middles(point.y, y_tree.domain());
            for &x_cover in Tdag::descend_with_middles(point.x, x_tree.domain()).iter() {
                for &y_cover in y_covers.iter() {
                    modified
                        .entry(interval_pair_label(x_cover, y_cover))
                        .or_insert_with(Vec::new)
                        .extend(vals.iter().cloned());
                }
            }
        }

        self.encrypted_db = self.engine.build_index(key, &modified)?;
        self.x_tree = Some(x_tree);
        self.y_tree = Some(y_tree);
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point, p2: Point) -> ErsResult<SearchToken> {
        let (x_tree, y_tree) = match (&self.x_tree, &self.y_tree) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(ErsError::IndexNotBuilt),
        };
        let (p1, p2) = normalize(p1, p2);
        let x_cover = x_tree
            .get_single_range_cover((p1.x, p2.x))
            .ok_or(ErsError::MalformedQuery)?;
        let y_cover = y_tree
            .get_single_range_cover((p1.y, p2.y))
            .ok_or(ErsError::MalformedQuery)?;
        Ok(self
            .engine
            .trapdoor(key, &interval_pair_label(x_cover, y_cover)))
    }

    fn search(&self, trapdoor: &SearchToken) -> CiphertextSet {
        self.engine.search(trapdoor, &self.encrypted_db)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{mm2, payloads, run};
    use super::*;

    #[test]
    fn one_token_finds_the_straddling_point() {
        // point (3,4) under query (2,3)-(5,6): both axes straddle the
        // root midpoint, so only the middles (or the root) can answer
        let mm = mm2(&[(3, 4, b"m")]);
        let mut scheme = TdagSrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm).unwrap();
        let token = scheme
            .trapdoor(&key, Point::new(2, 3), Point::new(5, 6))
            .unwrap();
        let results = scheme.search(&token);
        assert_eq!(results.len(), 1);
        assert_eq!(scheme.resolve(&key, &results).unwrap(), payloads(&[b"m"]));
    }

    #[test]
    fn narrow_node_queries_resolve() {
        // a query exactly equal to a height-1 node's range has to come
        // back as that node, not its untagged middle
        let mm = mm2(&[(2, 2, b"a"), (3, 3, b"b")]);
        let got = run(
            &mut TdagSrc::new(EmmEngine::new(8, 8)),
            &mm,
            Point::new(2, 2),
            Point::new(3, 3),
        );
        assert!(got.is_superset(&payloads(&[b"a", b"b"])));
    }

    #[test]
    fn queries_outside_the_domain_are_malformed() {
        let mm = mm2(&[(0, 0, b"a")]);
        let mut scheme = TdagSrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm).unwrap();
        assert!(matches!(
            scheme.trapdoor(&key, Point::new(0, 0), Point::new(8, 3)),
            Err(ErsError::MalformedQuery)
        ));
    }
}

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

//! # Range-BRC
//! One range tree per axis. At build time a point is filed under every
//! (x node, y node) pair along its two root-to-leaf paths; on a balanced
//! tree the path *is* the set of nodes covering the value. At query time
//! the x and y best range covers cross-multiply into tokens, so a query
//! costs `O(log^2 n)` tokens and nothing more.

use core_ers::Point;
use crypto_ers::SecretKey;

use super::{interval_pair_label, normalize, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, TokenSet,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::RangeTree;

/// The 2-D range-BRC scheme.
pub struct RangeBrc {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    x_tree: Option<RangeTree>,
    y_tree: Option<RangeTree>,
}

impl RangeBrc {
    pub fn new(engine: EmmEngine) -> RangeBrc {
        RangeBrc {
            engine,
            encrypted_db: EncryptedIndex::default(),
            x_tree: None,
            y_tree: None,
        }
    }
}

impl RangeSearchScheme for RangeBrc {
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
        let x_tree = RangeTree::new(self.engine.x_height());
        let y_tree = RangeTree::new(self.engine.y_height());

        let mut modified = ModifiedMultimap::new();
        for (point, vals) in plaintext_mm {
            if point.x > x_tree.domain().1 || point.y > y_tree.domain().1 {
                return Err(ErsError::PointOutsideDomain);
            }
            let y_path = RangeTree::descend(point.y, y_tree.domain());
            for &x_node in RangeTree::descend(point.x, x_tree.domain()).iter() {
                for &y_node in y_path.iter() {
                    modified
                        .entry(interval_pair_label(x_node, y_node))
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

    fn trapdoor(&self, key: &SecretKey, p1: Point, p2: Point) -> ErsResult<TokenSet> {
        let (x_tree, y_tree) = match (&self.x_tree, &self.y_tree) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(ErsError::IndexNotBuilt),
        };
        let (p1, p2) = normalize(p1, p2);
        let x_covers = x_tree.get_brc_range_cover((p1.x, p2.x));
        let y_covers = y_tree.get_brc_range_cover((p1.y, p2.y));

        let mut trapdoors = TokenSet::new();
        for &x_cover in &x_covers {
            for &y_cover in &y_covers {
                trapdoors.insert(
                    self.engine
                        .trapdoor(key, &interval_pair_label(x_cover, y_cover)),
                );
            }
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

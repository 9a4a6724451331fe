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

//! # QDAG-SRC
//! The one-token geometric scheme. Build time files every payload under
//! every QDAG node containing its point; query time picks the one aligned
//! square guaranteed to be a DAG node and containing the query. The cover
//! can be up to twice the query's longest side, so expect false positives
//! in the result set.

use core_ers::{Point, Rect};
use crypto_ers::SecretKey;

use super::{normalize, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, SearchToken,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::Qdag;

/// The 2-D QDAG-SRC scheme.
pub struct QdagSrc {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    qdag: Option<Qdag>,
}

impl QdagSrc {
    pub fn new(engine: EmmEngine) -> QdagSrc {
        QdagSrc {
            engine,
            encrypted_db: EncryptedIndex::default(),
            qdag: None,
        }
    }
}

impl RangeSearchScheme for QdagSrc {
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
        let height = self.engine.x_height().max(self.engine.y_height());
        let qdag = Qdag::new(height);

        let mut modified = ModifiedMultimap::new();
        for (point, files) in plaintext_mm {
            let covers = qdag.find_containing_range_covers(*point);
            for file in files {
                for cover in &covers {
                    modified
                        .entry(cover.packed().to_vec())
                        .or_insert_with(Vec::new)
                        .push(file.clone());
                }
            }
        }

        self.encrypted_db = self.engine.build_index(key, &modified)?;
        self.qdag = Some(qdag);
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point, p2: Point) -> ErsResult<SearchToken> {
        let qdag = self.qdag.as_ref().ok_or(ErsError::IndexNotBuilt)?;
        let (p1, p2) = normalize(p1, p2);
        let cover = qdag.get_single_range_cover(&Rect::new_unchecked(p1, p2));
        Ok(self.engine.trapdoor(key, &cover.packed()))
    }

    fn search(&self, trapdoor: &SearchToken) -> CiphertextSet {
        self.engine.search(trapdoor, &self.encrypted_db)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{mm2, payloads};
    use super::*;

    #[test]
    fn one_token_one_ciphertext() {
        // point (3,3) under query (2,2)-(5,5): the centre intermediate
        // answers with a single probe chain
        let mm = mm2(&[(3, 3, b"c")]);
        let mut scheme = QdagSrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm).unwrap();

        let token = scheme
            .trapdoor(&key, Point::new(2, 2), Point::new(5, 5))
            .unwrap();
        let results = scheme.search(&token);
        assert_eq!(results.len(), 1);
        assert_eq!(scheme.resolve(&key, &results).unwrap(), payloads(&[b"c"]));
    }

    #[test]
    fn false_positives_stay_inside_the_cover() {
        let mm = mm2(&[(3, 3, b"inside"), (0, 0, b"outside")]);
        let mut scheme = QdagSrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm).unwrap();

        let token = scheme
            .trapdoor(&key, Point::new(3, 3), Point::new(4, 4))
            .unwrap();
        let got = scheme
            .resolve(&key, &scheme.search(&token))
            .unwrap();
        // must hold the queried point, must not hold (0,0) which no
        // bounded cover of (3,3)-(4,4) can reach
        assert!(got.contains(&b"inside".to_vec()));
        assert!(!got.contains(&b"outside".to_vec()));
    }

    #[test]
    fn single_cell_queries_probe_the_leaf() {
        let mm = mm2(&[(5, 1, b"leaf")]);
        let mut scheme = QdagSrc::new(EmmEngine::new(8, 8));
        let key = scheme.setup(16).unwrap();
        scheme.build_index(&key, &mm).unwrap();
        let token = scheme
            .trapdoor(&key, Point::new(5, 1), Point::new(5, 1))
            .unwrap();
        assert_eq!(
            scheme.resolve(&key, &scheme.search(&token)).unwrap(),
            payloads(&[b"leaf"])
        );
    }
}

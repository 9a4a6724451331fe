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

//! The 3-D sibling of [`super::qdag_src`], over the 27-child oct-QDAG.

use core_ers::{Point3, Rect3};
use crypto_ers::SecretKey;

use super::{normalize3, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, SearchToken,
};
use crate::errors::{ErsError, ErsResult};
use crate::structures::OctQdag;

/// The 3-D QDAG-SRC scheme.
pub struct QdagSrc3 {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
    qdag: Option<OctQdag>,
}

impl QdagSrc3 {
    pub fn new(engine: EmmEngine) -> QdagSrc3 {
        QdagSrc3 {
            engine,
            encrypted_db: EncryptedIndex::default(),
            qdag: None,
        }
    }
}

impl RangeSearchScheme for QdagSrc3 {
    type Point = Point3;
    type Trapdoor = SearchToken;

    fn engine(&self) -> &EmmEngine {
        &self.engine
    }

    fn build_index(
        &mut self,
        key: &SecretKey,
        plaintext_mm: &PlaintextMultimap<Point3>,
    ) -> ErsResult<()> {
        // the z extent shares the x bound
        let z_height = self.engine.x_height();
        let height = self
            .engine
            .x_height()
            .max(self.engine.y_height())
            .max(z_height);
        let qdag = OctQdag::new(height);

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

    fn trapdoor(&self, key: &SecretKey, p1: Point3, p2: Point3) -> ErsResult<SearchToken> {
        let qdag = self.qdag.as_ref().ok_or(ErsError::IndexNotBuilt)?;
        let (p1, p2) = normalize3(p1, p2);
        let cover = qdag.get_single_range_cover(&Rect3::new_unchecked(p1, p2));
        Ok(self.engine.trapdoor(key, &cover.packed()))
    }

    fn search(&self, trapdoor: &SearchToken) -> CiphertextSet {
        self.engine.search(trapdoor, &self.encrypted_db)
    }
}

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

//! The naive baseline: every payload is filed under the single cell it
//! lives at, and a query spends one token per cell it covers. No index
//! expansion, query cost proportional to the query area (or volume).

use core_ers::{Point, Point3};
use crypto_ers::SecretKey;

use super::{normalize, normalize3, RangeSearchScheme};
use crate::emm::{
    CiphertextSet, EmmEngine, EncryptedIndex, ModifiedMultimap, PlaintextMultimap, TokenSet,
};
use crate::errors::ErsResult;

/// The 2-D linear scheme.
pub struct Linear {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
}

impl Linear {
    pub fn new(engine: EmmEngine) -> Linear {
        Linear {
            engine,
            encrypted_db: EncryptedIndex::default(),
        }
    }
}

impl RangeSearchScheme for Linear {
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
        let mut modified = ModifiedMultimap::new();
        for (point, files) in plaintext_mm {
            modified
                .entry(point.to_bytes())
                .or_insert_with(Vec::new)
                .extend(files.iter().cloned());
        }
        self.encrypted_db = self.engine.build_index(key, &modified)?;
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point, p2: Point) -> ErsResult<TokenSet> {
        let (p1, p2) = normalize(p1, p2);
        let mut trapdoors = TokenSet::new();
        for x in p1.x..=p2.x {
            for y in p1.y..=p2.y {
                trapdoors.insert(self.engine.trapdoor(key, &Point::new(x, y).to_bytes()));
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

/// The 3-D linear scheme.
pub struct Linear3 {
    engine: EmmEngine,
    encrypted_db: EncryptedIndex,
}

impl Linear3 {
    pub fn new(engine: EmmEngine) -> Linear3 {
        Linear3 {
            engine,
            encrypted_db: EncryptedIndex::default(),
        }
    }
}

impl RangeSearchScheme for Linear3 {
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
        let mut modified = ModifiedMultimap::new();
        for (point, files) in plaintext_mm {
            modified
                .entry(point.to_bytes())
                .or_insert_with(Vec::new)
                .extend(files.iter().cloned());
        }
        self.encrypted_db = self.engine.build_index(key, &modified)?;
        Ok(())
    }

    fn trapdoor(&self, key: &SecretKey, p1: Point3, p2: Point3) -> ErsResult<TokenSet> {
        let (p1, p2) = normalize3(p1, p2);
        let mut trapdoors = TokenSet::new();
        for x in p1.x..=p2.x {
            for y in p1.y..=p2.y {
                for z in p1.z..=p2.z {
                    trapdoors
                        .insert(self.engine.trapdoor(key, &Point3::new(x, y, z).to_bytes()));
                }
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

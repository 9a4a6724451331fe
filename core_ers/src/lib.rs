//! Geometry primitives and the canonical byte encoding shared by every
//! encrypted-range-search scheme.
//!
//! Two rectangle conventions coexist in the library and this crate carries
//! both: the half-open `[start, end)` boxes the QDAG family subdivides, and
//! the inclusive `[start, end]` boxes the quad-BRC family splits with
//! `divide`. They are backed by the same types but are never mixed on one
//! tree; the containment methods are named after the convention they
//! implement.
//!
//! Everything that is ever hashed into a search label passes through
//! [`wire`], so the encoding there is the injective wire format of the
//! whole library.

pub mod errors;
mod plane;
mod space;
pub mod wire;

pub use errors::{CoreError, CoreResult};
pub use plane::{Point, Rect};
pub use space::{Point3, Rect3};

//! Construction of a CSG unit from regions bounded by surfaces.

mod intersect;
mod unit;

pub use intersect::{IntersectSurfaceBuilder, IntersectSurfaceState};
pub use unit::{CsgUnit, CsgUnitBuilder, Label, LocalVolumeId, Region, TransformId};

//! Construction of deduplicated, simplified constructive solid geometry.
//!
//! Regions are built as intersections of `(sense, surface)` pairs, stored as
//! nodes of a content-deduplicated [`tree::CsgTree`], annotated with
//! conservative [`zone::BoundingZone`]s, normalized so that negations only
//! apply to surfaces, and finally linearized into token streams.

pub mod builder;
pub mod demorgan;
mod error;
pub mod eval;
pub mod logic;
pub mod surface;
pub mod tree;
pub mod zone;

pub use error::CsgError;

/// Structs, traits, and constants.
pub mod prelude {
    pub use crate::CsgError;
    pub use crate::builder::{
        CsgUnit, CsgUnitBuilder, IntersectSurfaceBuilder, IntersectSurfaceState, Label,
        LocalVolumeId,
    };
    pub use crate::demorgan::{TransformedTree, transform_negated_joins};
    pub use crate::logic::{BuiltLogic, LogicNotation, build_logic};
    pub use crate::surface::{LocalSurfaceId, SurfaceType, VariantSurface};
    pub use crate::tree::{CsgTree, JoinOp, Node, NodeId};
    pub use crate::zone::BoundingZone;
}

#[cfg(test)]
mod tests;

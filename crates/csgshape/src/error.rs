use csgmath::{IndexOverflow, ToleranceError};

use crate::surface::SurfaceType;
use crate::tree::NodeId;

/// Error encountered while constructing CSG geometry.
#[allow(missing_docs)]
#[derive(thiserror::Error, Debug, Clone)]
pub enum CsgError {
    #[error("region '{0}' is bounded by no surfaces")]
    EmptyRegion(String),
    #[error("cannot access bounds for node {0}, which is not a region")]
    NotARegion(NodeId),
    #[error("exterior volume is inside out")]
    InsideOutExterior,
    #[error("expected exactly one volume but found {0}")]
    VolumeCount(usize),
    #[error("cannot apply transform {transform} to {surface_type} surface")]
    UnsupportedTransform {
        surface_type: SurfaceType,
        transform: String,
    },
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(#[from] ToleranceError),
    #[error(transparent)]
    IndexOverflow(#[from] IndexOverflow),
}

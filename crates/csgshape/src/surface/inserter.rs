use std::collections::HashMap;

use csgmath::collections::FloatBuckets;
use csgmath::{GenericVec, IndexOverflow, Tolerance};

use super::{LocalSurfaceId, SoftSurfaceEqual, VariantSurface};

/// Adds surfaces to a unit's surface list, merging approximate duplicates.
///
/// An exact duplicate returns the ID of the surface it duplicates. A surface
/// that is only soft-equal to an existing one is still appended to the list
/// (so that its exact value can be found later) but the ID of the original
/// is returned. Soft matches are only made against surfaces that were not
/// themselves merged, so a chain of nearly-equal surfaces cannot drift.
#[derive(Debug, Clone)]
pub struct LocalSurfaceInserter {
    soft_eq: SoftSurfaceEqual,
    buckets: FloatBuckets<LocalSurfaceId>,
    merged: HashMap<LocalSurfaceId, LocalSurfaceId>,
}

impl LocalSurfaceInserter {
    /// Constructs an inserter using a construction tolerance.
    pub fn new(tol: Tolerance) -> Self {
        Self {
            soft_eq: SoftSurfaceEqual::new(tol),
            buckets: FloatBuckets::new(),
            merged: HashMap::new(),
        }
    }

    /// Inserts a surface into `surfaces` and returns the ID to use for it.
    ///
    /// `surfaces` must only ever be modified by this inserter.
    pub fn insert(
        &mut self,
        surfaces: &mut GenericVec<LocalSurfaceId, VariantSurface>,
        surf: VariantSurface,
    ) -> Result<LocalSurfaceId, IndexOverflow> {
        let hash_point = surf.hash_point();
        let window = self.soft_eq.hash_window(hash_point);

        let mut soft_match = None;
        for &id in self.buckets.find_near(hash_point, window) {
            let existing = &surfaces[id];
            if *existing == surf {
                return Ok(self.merged.get(&id).copied().unwrap_or(id));
            }
            if soft_match.is_none()
                && !self.merged.contains_key(&id)
                && self.soft_eq.eq(existing, &surf)
            {
                soft_match = Some(id);
            }
        }

        let new_id = surfaces.push(surf)?;
        self.buckets.insert(hash_point, new_id);
        if let Some(original) = soft_match {
            tracing::debug!(
                "merged surface {new_id} ({surf}) into {original} ({})",
                surfaces[original],
            );
            self.merged.insert(new_id, original);
            return Ok(original);
        }
        Ok(new_id)
    }
}

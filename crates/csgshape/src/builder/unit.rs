use std::collections::{BTreeMap, BTreeSet, hash_map};
use std::fmt;

use csgmath::{ApproxHashMap, BBox, GenericVec, Tolerance, VariantTransform, bbox};
use itertools::Itertools;

use crate::demorgan::transform_negated_joins;
use crate::surface::{LocalSurfaceId, LocalSurfaceInserter, VariantSurface};
use crate::tree::{CsgTree, Node, NodeId};
use crate::zone::BoundingZone;
use crate::CsgError;

csgmath::idx_struct! {
    /// ID of a volume within a unit.
    pub struct LocalVolumeId(pub u32);
    /// ID of a deduplicated transform within a unit.
    pub struct TransformId(pub u32);
}

/// Human-readable name attached to a node, such as `shell@-sc`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    /// Name of the object that created the node
    pub name: String,
    /// Extension identifying a face or sub-part of the object
    pub ext: String,
}
impl Label {
    /// Constructs a label with an extension.
    pub fn new(name: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ext: ext.into(),
        }
    }
    /// Constructs a label without an extension.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ext.is_empty() {
            true => write!(f, "{}", self.name),
            false => write!(f, "{}@{}", self.name, self.ext),
        }
    }
}

/// Bounding zone and transform of a region node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Region {
    /// Bounds in the unit's coordinate system
    pub bounds: BoundingZone,
    /// Transform from the region's local coordinates to the unit
    pub transform_id: TransformId,
}

/// Surfaces, CSG tree, and per-node annotations of a single unit.
#[derive(Debug, Clone)]
pub struct CsgUnit {
    /// Deduplicated surfaces
    pub surfaces: GenericVec<LocalSurfaceId, VariantSurface>,
    /// Boolean expression tree
    pub tree: CsgTree,
    /// Labels for each node, indexed by node ID
    pub metadata: Vec<BTreeSet<Label>>,
    /// Bounds and transform of each region node
    pub regions: BTreeMap<NodeId, Region>,
    /// Deduplicated transforms
    pub transforms: GenericVec<TransformId, VariantTransform>,
    /// Box enclosing everything in the unit
    pub exterior: BBox,
}

impl Default for CsgUnit {
    fn default() -> Self {
        let tree = CsgTree::new();
        Self {
            surfaces: GenericVec::new(),
            metadata: vec![BTreeSet::new(); tree.len()],
            tree,
            regions: BTreeMap::new(),
            transforms: GenericVec::new(),
            exterior: BBox::INFINITE,
        }
    }
}

impl CsgUnit {
    /// Returns the labels attached to a node, joined for display.
    pub fn labels(&self, node: NodeId) -> String {
        self.metadata
            .get(node.0 as usize)
            .map(|md| md.iter().join("' = '"))
            .unwrap_or_default()
    }
}

/// Incrementally constructs a [`CsgUnit`].
///
/// Surfaces are canonicalized and deduplicated, transforms are simplified
/// and deduplicated, and every node gets a metadata slot.
#[derive(Debug)]
pub struct CsgUnitBuilder {
    unit: CsgUnit,
    tol: Tolerance,
    bbox: BBox,
    surface_inserter: LocalSurfaceInserter,
    transform_ids: ApproxHashMap<VariantTransform, TransformId>,
}

impl CsgUnitBuilder {
    /// Constructs a builder for an empty unit with a tolerance and a priori
    /// extents.
    pub fn new(tol: Tolerance, extents: BBox) -> Self {
        Self {
            unit: CsgUnit::default(),
            tol,
            bbox: extents,
            surface_inserter: LocalSurfaceInserter::new(tol),
            transform_ids: ApproxHashMap::with_epsilon(tol.abs),
        }
    }

    /// Returns the construction tolerance.
    pub fn tol(&self) -> Tolerance {
        self.tol
    }
    /// Returns the current extents of the unit.
    pub fn extents(&self) -> BBox {
        self.bbox
    }
    /// Returns the unit under construction.
    pub fn unit(&self) -> &CsgUnit {
        &self.unit
    }

    /// Finishes construction and returns the unit.
    pub fn finish(mut self) -> CsgUnit {
        self.unit.exterior = self.bbox;
        self.unit
    }

    /// Adds a surface and returns the node ID of its positive side, along
    /// with whether the node was newly inserted.
    pub fn insert_surface(&mut self, surf: VariantSurface) -> Result<(NodeId, bool), CsgError> {
        let id = self.surface_inserter.insert(&mut self.unit.surfaces, surf)?;
        self.insert_csg(Node::Surface(id))
    }

    /// Adds a node and returns its ID, along with whether it was newly
    /// inserted.
    pub fn insert_csg(&mut self, node: Node) -> Result<(NodeId, bool), CsgError> {
        let result = self.unit.tree.insert(node)?;
        self.unit.metadata.resize(self.unit.tree.len(), BTreeSet::new());
        Ok(result)
    }

    /// Returns the stored surface of a surface node, or `None` if the node
    /// is not a surface.
    pub fn surface(&self, node: NodeId) -> Option<&VariantSurface> {
        match self.unit.tree[node] {
            Node::Surface(id) => Some(&self.unit.surfaces[id]),
            _ => None,
        }
    }

    /// Attaches a label to a node.
    pub fn insert_md(&mut self, node: NodeId, label: Label) {
        self.unit.metadata[node.0 as usize].insert(label);
    }

    /// Adds a transform after simplifying it, and returns the ID of an
    /// existing transform equal to it within the absolute tolerance if there
    /// is one.
    pub fn insert_transform(&mut self, transform: &VariantTransform) -> Result<TransformId, CsgError> {
        let simplified = transform.simplify(self.tol.abs);
        match self.transform_ids.entry(simplified) {
            hash_map::Entry::Occupied(e) => Ok(*e.get()),
            hash_map::Entry::Vacant(e) => {
                let id = self.unit.transforms.push(simplified)?;
                e.insert(id);
                Ok(id)
            }
        }
    }
    /// Returns a transform by ID.
    pub fn transform(&self, id: TransformId) -> &VariantTransform {
        &self.unit.transforms[id]
    }

    /// Records the bounding zone and transform of a region.
    ///
    /// Re-inserting a region for the same node must give an equivalent zone.
    /// A different transform is allowed, since logically equal regions may be
    /// built from differently transformed shapes.
    pub fn insert_region(&mut self, node: NodeId, bounds: BoundingZone, transform_id: TransformId) {
        assert!((node.0 as usize) < self.unit.tree.len());
        assert!((transform_id.0 as usize) < self.unit.transforms.len());

        let Some(existing) = self.unit.regions.get(&node) else {
            self.unit.regions.insert(node, Region { bounds, transform_id });
            return;
        };
        let old = &existing.bounds;
        debug_assert_eq!(bounds.negated, old.negated);
        debug_assert_eq!(bounds.interior.is_null(), old.interior.is_null());
        debug_assert_eq!(bounds.exterior.is_null(), old.exterior.is_null());
        if existing.transform_id != transform_id {
            tracing::debug!(
                "while re-inserting logically equivalent region '{}': existing transform {} \
                 differs from new transform {}",
                self.unit.labels(node),
                self.transform(existing.transform_id),
                self.transform(transform_id),
            );
        }
    }

    /// Marks a node as a volume of real space.
    pub fn insert_volume(&mut self, node: NodeId) -> Result<LocalVolumeId, CsgError> {
        let id = u32::try_from(self.unit.tree.volumes().len()).map_err(|_| {
            csgmath::IndexOverflow {
                type_name: "LocalVolumeId",
                max_value: u32::MAX as u64,
            }
        })?;
        self.unit.tree.insert_volume(node);
        Ok(LocalVolumeId(id))
    }

    /// Returns the bounding zone of a region node.
    pub fn bounds(&self, node: NodeId) -> Result<&BoundingZone, CsgError> {
        self.unit
            .regions
            .get(&node)
            .map(|r| &r.bounds)
            .ok_or(CsgError::NotARegion(node))
    }

    /// Truncates the unit's extents to the exterior of the first volume.
    ///
    /// This must be called immediately after inserting that volume, which is
    /// the "outside" of the unit.
    pub fn fill_exterior(&mut self) -> Result<(), CsgError> {
        let volumes = self.unit.tree.volumes();
        let &[node] = volumes else {
            return Err(CsgError::VolumeCount(volumes.len()));
        };
        let bounds = self.bounds(node)?;
        if bounds.negated {
            return Err(CsgError::InsideOutExterior);
        }
        self.bbox = bbox::calc_intersection(&self.bbox, &bounds.exterior);
        Ok(())
    }

    /// Rewrites the tree so that negations only apply to surfaces, carrying
    /// metadata and regions over to the new node IDs.
    ///
    /// Any node ID obtained before this call is invalidated.
    pub fn simplify_regions(&mut self) -> Result<(), CsgError> {
        let transformed = transform_negated_joins(&self.unit.tree)?;
        debug_assert_eq!(transformed.new_nodes.len(), self.unit.tree.len());

        let mut metadata = vec![BTreeSet::new(); transformed.tree.len()];
        let mut regions = BTreeMap::new();
        let old_metadata = std::mem::take(&mut self.unit.metadata);
        let mut old_regions = std::mem::take(&mut self.unit.regions);

        for ((old_id, new_id), md) in self.unit.tree.node_ids().zip(&transformed.new_nodes).zip(old_metadata) {
            let region = old_regions.remove(&old_id);
            match new_id {
                Some(new_id) => {
                    metadata[new_id.0 as usize].extend(md);
                    if let Some(region) = region {
                        regions.entry(*new_id).or_insert(region);
                    }
                }
                None if region.is_some() || !md.is_empty() => {
                    tracing::warn!(
                        "while simplifying node {old_id}: has metadata or region \
                         but no equivalent node",
                    );
                }
                None => (),
            }
        }

        self.unit.metadata = metadata;
        self.unit.regions = regions;
        self.unit.tree = transformed.tree;
        Ok(())
    }
}

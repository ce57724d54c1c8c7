//! A shape placed inside a bounding world box.

use std::fmt::Write;

use csgmath::{BBox, Float, Tolerance, VariantTransform, real3};
use csgshape::builder::{CsgUnit, CsgUnitBuilder, Label, LocalVolumeId};
use csgshape::logic::{self, LogicNotation};
use csgshape::tree::{Node, NodeId};
use eyre::{Context, Result};

use crate::shapes::{Cuboid, IntersectRegion, build_region};

/// Unit with three volumes: the world box, the shape, and the rest of the
/// world.
#[derive(Debug)]
pub(crate) struct Scene {
    pub unit: CsgUnit,
    pub world: LocalVolumeId,
    pub shape: LocalVolumeId,
    pub fill: LocalVolumeId,
}

impl Scene {
    /// Returns the tree node of a volume.
    pub fn volume_node(&self, id: LocalVolumeId) -> NodeId {
        self.unit.tree.volumes()[id.0 as usize]
    }
}

/// Builds a scene and normalizes its tree.
#[tracing::instrument(skip(shape))]
pub(crate) fn build_scene(
    shape: &dyn IntersectRegion,
    name: &str,
    transform: VariantTransform,
    world_half_width: Float,
    tol: Tolerance,
) -> Result<Scene> {
    let mut ub = CsgUnitBuilder::new(tol, BBox::INFINITE);

    let world_box = Cuboid::new(real3(world_half_width, world_half_width, world_half_width))?;
    let world_node = build_region(&mut ub, "world", VariantTransform::default(), &world_box)
        .context("error building world")?;
    let world = ub.insert_volume(world_node)?;
    ub.fill_exterior()?;

    let shape_node = build_region(&mut ub, name, transform, shape)
        .wrap_err_with(|| format!("error building {name}"))?;
    let shape = ub.insert_volume(shape_node)?;
    if !csgmath::bbox::encloses(&ub.extents(), &ub.bounds(shape_node)?.exterior) {
        tracing::warn!("{name} extends outside the world");
    }

    let (not_shape, _) = ub.insert_csg(Node::Negated(shape_node))?;
    let (fill_node, _) = ub.insert_csg(Node::all([world_node, not_shape]))?;
    ub.insert_md(fill_node, Label::from_name("fill"));
    let fill = ub.insert_volume(fill_node)?;

    tracing::debug!(tree = %ub.unit().tree, "before normalization");
    ub.simplify_regions()?;

    Ok(Scene {
        unit: ub.finish(),
        world,
        shape,
        fill,
    })
}

/// Writes surfaces, tree, bounding zones, and per-volume logic.
pub(crate) fn write_report(scene: &Scene, notation: LogicNotation) -> Result<String> {
    let unit = &scene.unit;
    let mut out = String::new();

    writeln!(out, "surfaces:")?;
    for (id, surf) in unit.surfaces.iter() {
        writeln!(out, "  {id}: {surf}")?;
    }
    writeln!(out, "tree: {}", unit.tree)?;

    writeln!(out, "regions:")?;
    for (node, region) in &unit.regions {
        let transform = &unit.transforms[region.transform_id];
        writeln!(
            out,
            "  {node} '{}': {} (transform {transform})",
            unit.labels(*node),
            region.bounds,
        )?;
    }

    writeln!(out, "volumes:")?;
    for (name, vol) in [("world", scene.world), ("shape", scene.shape), ("fill", scene.fill)] {
        let node = scene.volume_node(vol);
        let built = logic::build_logic(&unit.tree, node, notation);
        writeln!(out, "  {name} = {node}: {built}")?;
    }
    writeln!(out, "exterior: {}", unit.exterior)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use csgmath::{Real3, SignedSense, Translation};
    use csgshape::eval::point_evaluator;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::shapes::{Cylinder, Sphere};

    fn tol() -> Tolerance {
        Tolerance::from_relative(1e-8, 1.0).unwrap()
    }

    fn classify(scene: &Scene, vol: LocalVolumeId, pos: Real3) -> SignedSense {
        point_evaluator(&scene.unit.tree, &scene.unit.surfaces, pos).eval(scene.volume_node(vol))
    }

    #[test]
    fn test_translated_sphere() {
        let sphere = Sphere::new(1.0).unwrap();
        let transform = Translation(real3(2.0, 0.0, 0.0)).into();
        let scene = build_scene(&sphere, "ball", transform, 5.0, tol()).unwrap();

        assert_eq!(scene.unit.exterior, BBox::from_half_widths(real3(5.0, 5.0, 5.0)));

        use SignedSense::{Inside, Outside};
        for (pos, shape, fill) in [
            (real3(2.0, 0.0, 0.0), Inside, Outside),
            (real3(0.0, 0.0, 0.0), Outside, Inside),
            (real3(2.5, 0.5, 0.0), Inside, Outside),
            (real3(4.5, 4.5, 4.5), Outside, Inside),
        ] {
            assert_eq!(classify(&scene, scene.shape, pos), shape, "{pos}");
            assert_eq!(classify(&scene, scene.fill, pos), fill, "{pos}");
            assert_eq!(classify(&scene, scene.world, pos), Inside, "{pos}");
        }

        let shape_node = scene.volume_node(scene.shape);
        assert_eq!(
            scene.unit.regions[&shape_node].bounds.exterior,
            BBox::new(real3(1.0, -1.0, -1.0), real3(3.0, 1.0, 1.0)),
        );
    }

    #[test]
    fn test_fill_is_labeled() {
        let cyl = Cylinder::new(1.0, 1.0).unwrap();
        let scene = build_scene(&cyl, "cyl", VariantTransform::default(), 2.0, tol()).unwrap();
        assert_eq!(scene.unit.labels(scene.volume_node(scene.fill)), "fill");
        assert_eq!(scene.unit.labels(scene.volume_node(scene.shape)), "cyl");
    }

    #[test]
    fn test_report() {
        let sphere = Sphere::new(1.0).unwrap();
        let scene = build_scene(&sphere, "ball", VariantTransform::default(), 2.0, tol()).unwrap();
        let report = write_report(&scene, LogicNotation::Infix).unwrap();

        assert!(report.contains("  6: sc: r^2=1\n"), "{report}");
        assert!(report.contains("'ball'"), "{report}");
        let shape_line = report
            .lines()
            .find(|line| line.starts_with("  shape = "))
            .unwrap();
        assert!(shape_line.ends_with("~ 0 (faces: 6)"), "{shape_line}");
    }
}

use csgmath::{Axis, BBox, Real3, Sense, SignedSense, Tolerance, VariantTransform, real3};
use pretty_assertions::assert_eq;

use crate::eval::point_evaluator;
use crate::logic::{LogicNotation, build_logic, eval_logic};
use crate::prelude::*;
use crate::surface::{PlaneAligned, SphereCentered};

fn build_box(ub: &mut CsgUnitBuilder, name: &str, half_width: f64) -> eyre::Result<NodeId> {
    let mut state = IntersectSurfaceState::new(name, VariantTransform::default());
    let mut isb = IntersectSurfaceBuilder::new(ub, &mut state);
    for ax in Axis::ALL {
        isb.insert(Sense::Outside, PlaneAligned::new(ax, -half_width))?;
        isb.insert(Sense::Inside, PlaneAligned::new(ax, half_width))?;
    }
    Ok(isb.finish()?)
}

fn build_shell(ub: &mut CsgUnitBuilder, inner: f64, outer: f64) -> eyre::Result<NodeId> {
    let mut state = IntersectSurfaceState::new("shell", VariantTransform::default());
    let mut isb = IntersectSurfaceBuilder::new(ub, &mut state);
    isb.insert(Sense::Inside, SphereCentered::new(outer))?;
    isb.insert(Sense::Outside, SphereCentered::new(inner))?;
    Ok(isb.finish()?)
}

/// Unit with an outer box, a hollow sphere, and the space left over.
struct ShellUnit {
    unit: CsgUnit,
    world: LocalVolumeId,
    shell: LocalVolumeId,
    fill: LocalVolumeId,
}

fn build_shell_unit() -> eyre::Result<ShellUnit> {
    let tol = Tolerance::from_relative(1e-5, 1.0)?;
    let mut ub = CsgUnitBuilder::new(tol, BBox::INFINITE);

    let world_node = build_box(&mut ub, "world", 3.0)?;
    let world = ub.insert_volume(world_node)?;
    ub.fill_exterior()?;
    assert_eq!(ub.extents(), BBox::from_half_widths(real3(3.0, 3.0, 3.0)));

    let shell_node = build_shell(&mut ub, 1.0, 2.0)?;
    let shell = ub.insert_volume(shell_node)?;

    let (not_shell, _) = ub.insert_csg(Node::Negated(shell_node))?;
    let (fill_node, _) = ub.insert_csg(Node::all([world_node, not_shell]))?;
    let fill = ub.insert_volume(fill_node)?;

    ub.simplify_regions()?;
    Ok(ShellUnit {
        unit: ub.finish(),
        world,
        shell,
        fill,
    })
}

impl ShellUnit {
    fn volume_node(&self, id: LocalVolumeId) -> NodeId {
        self.unit.tree.volumes()[id.0 as usize]
    }
    fn classify(&self, id: LocalVolumeId, pos: Real3) -> SignedSense {
        point_evaluator(&self.unit.tree, &self.unit.surfaces, pos).eval(self.volume_node(id))
    }
}

#[test]
fn test_shell_unit_classification() -> eyre::Result<()> {
    init_test_logging();

    let u = build_shell_unit()?;
    assert_eq!(u.unit.exterior, BBox::from_half_widths(real3(3.0, 3.0, 3.0)));

    use SignedSense::{Inside, On, Outside};
    let cases = [
        // (point, world, shell, fill)
        (real3(0.0, 0.0, 0.0), Inside, Outside, Inside),
        (real3(1.5, 0.0, 0.0), Inside, Inside, Outside),
        (real3(0.0, -2.5, 0.0), Inside, Outside, Inside),
        (real3(2.9, 2.9, 2.9), Inside, Outside, Inside),
        (real3(0.0, 0.0, 4.0), Outside, Outside, Outside),
        (real3(2.0, 0.0, 0.0), Inside, On, On),
    ];
    for (pos, world, shell, fill) in cases {
        assert_eq!(u.classify(u.world, pos), world, "world at {pos}");
        assert_eq!(u.classify(u.shell, pos), shell, "shell at {pos}");
        assert_eq!(u.classify(u.fill, pos), fill, "fill at {pos}");
    }
    Ok(())
}

#[test]
fn test_shell_unit_is_normalized() -> eyre::Result<()> {
    let u = build_shell_unit()?;
    for (id, node) in u.unit.tree.iter() {
        if let Node::Negated(target) = node {
            assert!(
                matches!(u.unit.tree[*target], Node::Surface(_) | Node::True),
                "node {id} negates a join: {}",
                u.unit.tree,
            );
        }
    }

    // Metadata and regions follow the nodes through normalization
    let shell = u.volume_node(u.shell);
    assert_eq!(u.unit.labels(shell), "shell");
    let region = u.unit.regions[&shell];
    assert!(region.bounds.interior.is_null());
    assert_eq!(region.bounds.exterior, BBox::from_half_widths(real3(2.0, 2.0, 2.0)));
    assert_eq!(u.unit.labels(u.volume_node(u.world)), "world");
    Ok(())
}

#[test]
fn test_shell_unit_zones_agree_with_points() -> eyre::Result<()> {
    let u = build_shell_unit()?;
    let points = [
        real3(0.0, 0.0, 0.0),
        real3(0.5, 0.25, 0.0),
        real3(1.5, 0.0, 0.0),
        real3(2.5, 2.5, 0.0),
        real3(0.0, 0.0, 3.5),
    ];
    for (&node, region) in &u.unit.regions {
        for pos in points {
            let Some(expected) = region.bounds.classify(pos) else {
                continue;
            };
            let actual = point_evaluator(&u.unit.tree, &u.unit.surfaces, pos).eval(node);
            let expected = match expected {
                true => SignedSense::Inside,
                false => SignedSense::Outside,
            };
            assert_eq!(actual, expected, "region {node} ({}) at {pos}", region.bounds);
        }
    }
    Ok(())
}

#[test]
fn test_shell_unit_logic() -> eyre::Result<()> {
    let u = build_shell_unit()?;
    let points = [
        real3(0.0, 0.0, 0.0),
        real3(1.5, 0.0, 0.0),
        real3(0.0, 2.5, 0.0),
        real3(0.0, 0.0, -3.5),
    ];
    for vol in [u.world, u.shell, u.fill] {
        let node = u.volume_node(vol);
        for notation in [LogicNotation::Postfix, LogicNotation::Infix] {
            let built = build_logic(&u.unit.tree, node, notation);
            assert!(built.faces.is_sorted());
            for pos in points {
                let face_value = |i: usize| {
                    u.unit.surfaces[built.faces[i]].calc_sense(pos) == SignedSense::Outside
                };
                let expected = u.classify(vol, pos) == SignedSense::Inside;
                assert_eq!(
                    eval_logic(&built.logic, notation, face_value),
                    Some(expected),
                    "{built} at {pos}",
                );
            }
        }
    }

    let shell = build_logic(&u.unit.tree, u.volume_node(u.shell), LogicNotation::Postfix);
    assert_eq!(shell.to_string(), "0 ~ 1 & (faces: 6, 7)");
    Ok(())
}

#[test]
fn test_exterior_must_be_first_volume() -> eyre::Result<()> {
    let tol = Tolerance::from_relative(1e-5, 1.0)?;
    let mut ub = CsgUnitBuilder::new(tol, BBox::INFINITE);
    let a = build_box(&mut ub, "a", 1.0)?;
    let b = build_box(&mut ub, "b", 2.0)?;
    ub.insert_volume(a)?;
    ub.insert_volume(b)?;
    assert!(matches!(ub.fill_exterior(), Err(CsgError::VolumeCount(2))));
    Ok(())
}

fn init_test_logging() {
    // Initialize tracing
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    // Other tests may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();

    // Initialize color_eyre.
    let _ = color_eyre::install();
}

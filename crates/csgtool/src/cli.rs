use csgmath::{Axis, Float, Matrix3, Tolerance, Transformation, Translation, VariantTransform, real3};
use csgshape::logic::LogicNotation;
use eyre::Result;

use crate::scene::{build_scene, write_report};
use crate::shapes::{Cone, Cuboid, Cylinder, IntersectRegion, Shell, Sphere};

/// Build a primitive shape inside a world box and print its CSG unit
///
/// The output lists the deduplicated surfaces, the normalized tree, the
/// bounding zone of each region, and the logic expression of each volume.
#[derive(Debug, clap::Parser)]
#[command(version)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub shape: Shape,

    /// Relative tolerance for deduplicating surfaces.
    #[arg(long, global = true, default_value_t = Tolerance::DEFAULT_RELATIVE)]
    pub rel_tol: Float,
    /// Characteristic length of the model, which scales the absolute
    /// tolerance.
    #[arg(long, global = true, default_value_t = 1.0)]
    pub length_scale: Float,
    /// Half-width of the world box.
    #[arg(long, global = true, default_value_t = 100.0)]
    pub world: Float,

    /// Translation applied to the shape.
    #[arg(long, global = true, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub translate: Option<Vec<Float>>,
    /// Axis to rotate the shape about.
    #[arg(long, global = true, value_enum, requires = "turns")]
    pub rotate: Option<AxisArg>,
    /// Rotation angle in turns (1 turn = 360 degrees).
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub turns: Option<Float>,

    /// Print logic in infix notation instead of postfix.
    #[arg(long, global = true)]
    pub infix: bool,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Shape {
    /// Axis-aligned box.
    Box {
        /// Half-widths along X, Y, and Z.
        #[arg(num_args = 3, value_names = ["HX", "HY", "HZ"])]
        half_widths: Vec<Float>,
    },
    /// Sphere.
    Sphere {
        radius: Float,
    },
    /// Hollow sphere.
    Shell {
        inner: Float,
        outer: Float,
    },
    /// Z-aligned cylinder.
    Cylinder {
        radius: Float,
        half_height: Float,
    },
    /// Truncated z-aligned cone.
    Cone {
        /// Radius at the bottom.
        lo: Float,
        /// Radius at the top.
        hi: Float,
        half_height: Float,
    },
}

#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AxisArg {
    X,
    Y,
    Z,
}
impl From<AxisArg> for Axis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Sphere { .. } => "sphere",
            Shape::Shell { .. } => "shell",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Cone { .. } => "cone",
        }
    }

    fn to_region(&self) -> Result<Box<dyn IntersectRegion>> {
        Ok(match *self {
            Shape::Box { ref half_widths } => {
                let &[x, y, z] = half_widths.as_slice() else {
                    eyre::bail!("expected 3 half-widths, got {}", half_widths.len());
                };
                Box::new(Cuboid::new(real3(x, y, z))?)
            }
            Shape::Sphere { radius } => Box::new(Sphere::new(radius)?),
            Shape::Shell { inner, outer } => Box::new(Shell::new(inner, outer)?),
            Shape::Cylinder {
                radius,
                half_height,
            } => Box::new(Cylinder::new(radius, half_height)?),
            Shape::Cone {
                lo,
                hi,
                half_height,
            } => Box::new(Cone::new(lo, hi, half_height)?),
        })
    }
}

impl Args {
    fn transform(&self) -> Result<VariantTransform> {
        let translation = match self.translate.as_deref() {
            None => real3(0.0, 0.0, 0.0),
            Some(&[x, y, z]) => real3(x, y, z),
            Some(other) => eyre::bail!("expected 3 translation components, got {}", other.len()),
        };
        Ok(match (self.rotate, self.turns) {
            (Some(axis), Some(turns)) => {
                let rot = Matrix3::from_axis_turns(axis.into(), turns);
                Transformation::new(rot, translation).into()
            }
            _ if self.translate.is_some() => Translation(translation).into(),
            _ => VariantTransform::default(),
        })
    }
}

pub(crate) fn exec(args: Args) -> Result<()> {
    let tol = Tolerance::from_relative(args.rel_tol, args.length_scale)?;
    let region = args.shape.to_region()?;
    let transform = args.transform()?;
    tracing::info!("building {} with transform {transform}", args.shape.name());

    let scene = build_scene(region.as_ref(), args.shape.name(), transform, args.world, tol)?;
    let notation = match args.infix {
        true => LogicNotation::Infix,
        false => LogicNotation::Postfix,
    };
    print!("{}", write_report(&scene, notation)?);
    Ok(())
}

//! Two-dimensional representations: Cartesian and polar.

use crate::base::VectorBase;
use crate::differentials::AbstractVectorDifferential;
use crate::error::Error;
use crate::kinds::{DifferentialRegistry, Kind};
use crate::quantity::Quantity;
use crate::transform::TransformTable;
use crate::units::Unit;
use crate::util::map_elements;
use crate::vectors::{AbstractVector, CartesianBase, SupportsAddition};
use nalgebra::{Matrix2, Vector2};

representation! {
    pub struct Cartesian2DVector as Cartesian2D in AnyVector {
        x,
        y,
    }
}

representation! {
    /// A point in the plane given by its distance from the origin and its angle from the
    /// positive x axis.
    ///
    /// Negation and scalar multiplication are only defined on the Cartesian form:
    ///
    /// ```compile_fail
    /// use coordinax::{PolarVector, Quantity};
    ///
    /// let p = PolarVector::new(
    ///     Quantity::scalar(1., "m".parse().unwrap()),
    ///     Quantity::scalar(90., "deg".parse().unwrap()),
    /// )
    /// .unwrap();
    /// let _ = p * 2.;
    /// ```
    pub struct PolarVector as Polar in AnyVector {
        /// Distance from the origin.
        r,
        /// Angle counterclockwise from the positive x axis.
        phi,
    }
}

representation! {
    pub struct CartesianDifferential2D as CartesianDifferential2D in AnyDifferential {
        d_x,
        d_y,
    }
}

representation! {
    pub struct PolarDifferential as PolarDifferential in AnyDifferential {
        d_r,
        d_phi,
    }
}

linear_ops!(Cartesian2DVector, CartesianDifferential2D, PolarDifferential);

impl AbstractVector for Cartesian2DVector {
    type Cartesian = Self;
    type Differential = CartesianDifferential2D;
}

impl AbstractVector for PolarVector {
    type Cartesian = Cartesian2DVector;
    type Differential = PolarDifferential;
}

impl AbstractVectorDifferential for CartesianDifferential2D {
    type Cartesian = Self;
    type Integral = Cartesian2DVector;
}

impl AbstractVectorDifferential for PolarDifferential {
    type Cartesian = CartesianDifferential2D;
    type Integral = PolarVector;
}

impl SupportsAddition for Cartesian2DVector {}
impl CartesianBase for Cartesian2DVector {}
impl SupportsAddition for CartesianDifferential2D {}
impl CartesianBase for CartesianDifferential2D {}

/// Columns are the local unit vectors `e_r` and `e_phi` expressed in Cartesian components.
fn polar_basis(phi: f64) -> Matrix2<f64> {
    let (sin, cos) = phi.sin_cos();
    Matrix2::new(cos, -sin, sin, cos)
}

pub(crate) fn polar_to_cartesian(v: PolarVector) -> Result<Cartesian2DVector, Error> {
    let unit = v.r.unit().clone();
    let phi = v.phi.value_in(&Unit::radian())?;
    let [x, y] = map_elements([v.r.value(), &phi], |[r, phi]| {
        let (sin, cos) = phi.sin_cos();
        [r * cos, r * sin]
    })?;
    Ok(Cartesian2DVector {
        x: Quantity::new(x, unit.clone()),
        y: Quantity::new(y, unit),
    })
}

/// `r` is in the unit of `x`; `phi` is in `(-π, π]`.
pub(crate) fn cartesian_to_polar(v: Cartesian2DVector) -> Result<PolarVector, Error> {
    let unit = v.x.unit().clone();
    let y = v.y.value_in(&unit)?;
    let [r, phi] = map_elements([v.x.value(), &y], |[x, y]| [x.hypot(y), y.atan2(x)])?;
    Ok(PolarVector {
        r: Quantity::new(r, unit),
        phi: Quantity::new(phi, Unit::radian()),
    })
}

pub(crate) fn polar_to_cartesian_differential(
    d: PolarDifferential,
    at: &PolarVector,
) -> Result<CartesianDifferential2D, Error> {
    let [d_x, d_y] = map_elements(
        [
            &at.r.si_value(),
            &at.phi.si_value(),
            &d.d_r.si_value(),
            &d.d_phi.si_value(),
        ],
        |[r, phi, d_r, d_phi]| {
            let v = polar_basis(phi) * Vector2::new(d_r, r * d_phi);
            [v.x, v.y]
        },
    )?;
    let unit = d.d_r.unit().clone();
    Ok(CartesianDifferential2D {
        d_x: Quantity::from_si(d_x, unit.clone()),
        d_y: Quantity::from_si(d_y, unit),
    })
}

/// At the origin the angular rate is undefined and is reported as zero.
pub(crate) fn cartesian_to_polar_differential(
    d: CartesianDifferential2D,
    at: &PolarVector,
) -> Result<PolarDifferential, Error> {
    let [d_r, d_phi] = map_elements(
        [
            &at.r.si_value(),
            &at.phi.si_value(),
            &d.d_x.si_value(),
            &d.d_y.si_value(),
        ],
        |[r, phi, d_x, d_y]| {
            let local = polar_basis(phi).transpose() * Vector2::new(d_x, d_y);
            let d_phi = if r == 0. { 0. } else { local.y / r };
            [local.x, d_phi]
        },
    )?;
    let unit = d.d_x.unit().clone();
    let angular = unit.angular_rate()?;
    Ok(PolarDifferential {
        d_r: Quantity::from_si(d_r, unit),
        d_phi: Quantity::from_si(d_phi, angular),
    })
}

pub(crate) fn register(table: &mut TransformTable) {
    table.register_position(polar_to_cartesian);
    table.register_position(cartesian_to_polar);
    table.register_differential(polar_to_cartesian_differential);
    table.register_differential(cartesian_to_polar_differential);
}

pub(crate) fn register_differentials(registry: &mut DifferentialRegistry) {
    registry.register(Kind::CartesianDifferential2D);
    registry.register(Kind::PolarDifferential);
}

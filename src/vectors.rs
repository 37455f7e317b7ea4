//! Position vectors and the traits shared by the Cartesian classes.

use crate::base::VectorBase;
use crate::d1::{Cartesian1DVector, RadialVector};
use crate::d2::{Cartesian2DVector, PolarVector};
use crate::d3::{Cartesian3DVector, CylindricalVector, SphericalVector};
use crate::differentials::AbstractVectorDifferential;
use crate::dn::CartesianNDVector;
use crate::error::Error;
use crate::kinds::Kind;
use crate::quantity::Quantity;
use crate::transform::TransformTable;
use ndarray::Axis;
use std::fmt::{self, Display, Formatter};

/// A position in some coordinate representation.
///
/// Every position knows its Cartesian counterpart of the same dimensionality and the
/// differential class describing its rates of change.
pub trait AbstractVector:
    VectorBase + Into<AnyVector> + TryFrom<AnyVector, Error = Error>
{
    type Cartesian: CartesianBase + AbstractVector;
    type Differential: AbstractVectorDifferential<Integral = Self>;

    /// Converts to the representation `T` using the builtin [`TransformTable`].
    ///
    /// Converting to the representation `self` already is moves `self` through untouched.
    ///
    /// ```
    /// use coordinax::{AbstractVector, Cartesian3DVector, ErrorKind, PolarVector, Quantity, SphericalVector, VectorBase};
    ///
    /// let v = Cartesian3DVector::from_stacked(&Quantity::from_vec(vec![0., 0., 2.], "m".parse().unwrap()))?;
    /// let s: SphericalVector = v.clone().represent_as()?;
    /// assert_eq!(s.r().value().sum(), 2.);
    ///
    /// let wrong = v.represent_as::<PolarVector>().unwrap_err();
    /// assert_eq!(wrong.kind(), ErrorKind::Dispatch);
    /// # Ok::<(), coordinax::Error>(())
    /// ```
    fn represent_as<T: AbstractVector>(self) -> Result<T, Error> {
        self.represent_as_in(TransformTable::builtin())
    }

    /// Like [`AbstractVector::represent_as`], resolving through `table`.
    fn represent_as_in<T: AbstractVector>(self, table: &TransformTable) -> Result<T, Error> {
        T::try_from(table.represent_position(self.into(), T::KIND)?)
    }

    /// Euclidean distance from the origin, in the unit of the first Cartesian component.
    fn norm(&self) -> Result<Quantity, Error> {
        self.clone().represent_as::<Self::Cartesian>()?.magnitude()
    }

    /// The Cartesian form of this position as a single quantity, components along the
    /// trailing axis.
    fn to_quantity(&self) -> Result<Quantity, Error> {
        CartesianBase::to_quantity(&self.clone().represent_as::<Self::Cartesian>()?)
    }
}

/// Component-wise addition and subtraction.
///
/// Only the Cartesian classes implement this: adding two spherical positions component by
/// component is not a meaningful operation. The right-hand side is converted into the
/// receiver's units.
pub trait SupportsAddition: VectorBase {
    fn add(&self, rhs: &Self) -> Result<Self, Error> {
        self.components_ref()
            .into_iter()
            .zip(rhs.components_ref())
            .map(|(a, b)| a.checked_add(b))
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::from_components)
    }

    fn sub(&self, rhs: &Self) -> Result<Self, Error> {
        self.components_ref()
            .into_iter()
            .zip(rhs.components_ref())
            .map(|(a, b)| a.checked_sub(b))
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::from_components)
    }
}

/// Behavior of the Cartesian classes, whose components all share one physical type.
pub trait CartesianBase: SupportsAddition {
    /// All components in the first component's unit, stacked along a trailing axis.
    fn to_quantity(&self) -> Result<Quantity, Error> {
        Quantity::stack(&self.components_ref())
    }

    /// Euclidean length, in the first component's unit.
    fn magnitude(&self) -> Result<Quantity, Error> {
        let stacked = self.to_quantity()?;
        let features = Axis(stacked.ndim() - 1);
        let norm = stacked
            .value()
            .map_axis(features, |lane| lane.dot(&lane).sqrt());
        Ok(stacked.with_value(norm))
    }
}

fn kind_of<V: VectorBase>(_: &V) -> Kind {
    V::KIND
}

/// Applies `$body` to whichever concrete vector `$any` holds.
macro_rules! each_vector {
    ($any:expr, $v:ident => $body:expr) => {
        match $any {
            AnyVector::Cartesian1D($v) => $body,
            AnyVector::Radial($v) => $body,
            AnyVector::Cartesian2D($v) => $body,
            AnyVector::Polar($v) => $body,
            AnyVector::Cartesian3D($v) => $body,
            AnyVector::Spherical($v) => $body,
            AnyVector::Cylindrical($v) => $body,
            AnyVector::CartesianND($v) => $body,
        }
    };
}

/// A position whose class is only known at runtime.
///
/// This is what the [`TransformTable`] routes between. Convert into and out of it with `From`
/// and `TryFrom`.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyVector {
    Cartesian1D(Cartesian1DVector),
    Radial(RadialVector),
    Cartesian2D(Cartesian2DVector),
    Polar(PolarVector),
    Cartesian3D(Cartesian3DVector),
    Spherical(SphericalVector),
    Cylindrical(CylindricalVector),
    CartesianND(CartesianNDVector),
}

macro_rules! checked_op {
    ($(#[$attr:meta])* $name:ident, $op:ident) => {
        $(#[$attr])*
        pub fn $name(&self, rhs: &Self) -> Result<Self, Error> {
            match (self, rhs) {
                (Self::Cartesian1D(a), Self::Cartesian1D(b)) => a.$op(b).map(Into::into),
                (Self::Cartesian2D(a), Self::Cartesian2D(b)) => a.$op(b).map(Into::into),
                (Self::Cartesian3D(a), Self::Cartesian3D(b)) => a.$op(b).map(Into::into),
                (Self::CartesianND(a), Self::CartesianND(b)) => a.$op(b).map(Into::into),
                _ => Err(Error::OperandType {
                    op: stringify!($op),
                    expected: self.kind().cartesian(),
                    found: rhs.kind(),
                }),
            }
        }
    };
}

impl AnyVector {
    #[must_use]
    pub fn kind(&self) -> Kind {
        each_vector!(self, v => kind_of(v))
    }

    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        each_vector!(self, v => v.shape())
    }

    #[must_use]
    pub fn asdict(&self) -> crate::base::ComponentMap<Quantity> {
        each_vector!(self, v => v.asdict())
    }

    checked_op!(
        /// Adds two Cartesian positions of the same class.
        ///
        /// Anything else, including two non-Cartesian positions of the same class, is a type
        /// error.
        checked_add,
        add
    );

    checked_op!(
        /// Subtracts two Cartesian positions of the same class.
        checked_sub,
        sub
    );
}

impl Display for AnyVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        each_vector!(self, v => Display::fmt(v, f))
    }
}

#[cfg(test)]
mod tests {
    use super::{AbstractVector, AnyVector, CartesianBase, SupportsAddition};
    use crate::base::VectorBase;
    use crate::d2::{Cartesian2DVector, PolarVector};
    use crate::d3::{Cartesian3DVector, SphericalVector};
    use crate::error::ErrorKind;
    use crate::kinds::Kind;
    use crate::quantity::Quantity;
    use crate::units::Unit;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn u(s: &str) -> Unit {
        s.parse().unwrap()
    }

    fn cart3(x: f64, y: f64, z: f64, unit: &str) -> Cartesian3DVector {
        Cartesian3DVector::from_stacked(&Quantity::from_vec(vec![x, y, z], u(unit))).unwrap()
    }

    #[test]
    fn addition_identities() {
        let d = cart3(1., -2., 3.5, "km");
        let zero = d.sub(&d).unwrap();
        assert!(zero.components_ref().iter().all(|c| c.value().sum() == 0.));
        assert_eq!(d.add(&d).unwrap(), d.clone() * 2.);
    }

    #[test]
    fn addition_converts_into_receiver_units() {
        let a = cart3(1., 1., 1., "km");
        let b = cart3(500., 0., 0., "m");
        let sum = a.add(&b).unwrap();
        assert!(sum.units().values().all(|unit| *unit == u("km")));
        assert_relative_eq!(sum.x().value().sum(), 1.5);
    }

    #[test]
    fn runtime_addition_checks_kinds() {
        let a: AnyVector = cart3(1., 2., 3., "m").into();
        let b: AnyVector = Cartesian2DVector::from_stacked(&Quantity::from_vec(vec![1., 2.], u("m")))
            .unwrap()
            .into();
        assert_eq!(a.checked_add(&b).unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(a.checked_sub(&a).unwrap().kind(), Kind::Cartesian3D);

        let p: AnyVector =
            PolarVector::new(Quantity::scalar(1., u("m")), Quantity::scalar(0., u("rad")))
                .unwrap()
                .into();
        assert_eq!(p.checked_add(&p).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn any_round_trips_through_try_from() {
        let v = cart3(1., 2., 3., "m");
        let any: AnyVector = v.clone().into();
        assert_eq!(any.kind(), Kind::Cartesian3D);
        assert_eq!(Cartesian3DVector::try_from(any.clone()).unwrap(), v);
        assert_eq!(
            SphericalVector::try_from(any).unwrap_err().kind(),
            ErrorKind::Type
        );
    }

    #[test]
    fn norm_and_to_quantity() {
        let v = cart3(3., 4., 12., "m");
        assert_relative_eq!(v.norm().unwrap().value().sum(), 13.);
        let s: SphericalVector = v.clone().represent_as().unwrap();
        assert_relative_eq!(s.norm().unwrap().value().sum(), 13., max_relative = 1e-12);
        assert_relative_eq!(
            s.to_quantity().unwrap().into_value(),
            arr1(&[3., 4., 12.]).into_dyn(),
            max_relative = 1e-12
        );
        assert_eq!(v.magnitude().unwrap().unit(), &u("m"));
    }
}

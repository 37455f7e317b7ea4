//! Differentials: rates of change of a position (velocities, accelerations, ...).
//!
//! A differential alone does not determine its components in another representation: the
//! local basis of a curvilinear representation depends on where you are. Every conversion
//! therefore takes the position at which the differential is evaluated.

use crate::base::VectorBase;
use crate::d1::{CartesianDifferential1D, RadialDifferential};
use crate::d2::{CartesianDifferential2D, PolarDifferential};
use crate::d3::{CartesianDifferential3D, CylindricalDifferential, SphericalDifferential};
use crate::dn::CartesianDifferentialND;
use crate::error::Error;
use crate::kinds::Kind;
use crate::quantity::Quantity;
use crate::transform::TransformTable;
use crate::vectors::{AbstractVector, CartesianBase};
use std::fmt::{self, Debug, Display, Formatter};

/// A differential in some coordinate representation.
pub trait AbstractVectorDifferential:
    VectorBase + Into<AnyDifferential> + TryFrom<AnyDifferential, Error = Error>
{
    type Cartesian: CartesianBase + AbstractVectorDifferential;

    /// The position class this is a differential of.
    type Integral: AbstractVector;

    /// Converts to the representation `T`, evaluated at `position`, using the builtin
    /// [`TransformTable`].
    ///
    /// `position` may be in any representation of the right dimensionality.
    ///
    /// ```
    /// use coordinax::{AbstractVectorDifferential, CartesianDifferential2D, PolarDifferential, PolarVector, Quantity};
    ///
    /// let q = |v: f64, u: &str| Quantity::scalar(v, u.parse().unwrap());
    /// let at = PolarVector::new(q(2., "m"), q(90., "deg"))?;
    /// let v = CartesianDifferential2D::new(q(-2., "m / s"), q(0., "m / s"))?;
    /// let p: PolarDifferential = v.represent_as(&at)?;
    /// assert!((p.d_phi().value().sum() - 1.).abs() < 1e-12);
    /// assert_eq!(p.d_phi().unit().to_string(), "rad / s");
    /// # Ok::<(), coordinax::Error>(())
    /// ```
    fn represent_as<T, P>(self, position: &P) -> Result<T, Error>
    where
        T: AbstractVectorDifferential,
        P: AbstractVector,
    {
        self.represent_as_in(TransformTable::builtin(), position)
    }

    /// Like [`AbstractVectorDifferential::represent_as`], but accepts extra arguments.
    ///
    /// They are not used; a warning is logged if any are given.
    fn represent_as_with_extra<T, P>(
        self,
        position: &P,
        extra: &[&dyn Debug],
    ) -> Result<T, Error>
    where
        T: AbstractVectorDifferential,
        P: AbstractVector,
    {
        if !extra.is_empty() {
            tracing::warn!(
                from = %Self::KIND,
                to = %T::KIND,
                ?extra,
                "ignoring extra arguments to differential represent_as"
            );
        }
        self.represent_as(position)
    }

    /// Like [`AbstractVectorDifferential::represent_as`], resolving through `table`.
    fn represent_as_in<T, P>(self, table: &TransformTable, position: &P) -> Result<T, Error>
    where
        T: AbstractVectorDifferential,
        P: AbstractVector,
    {
        let converted =
            table.represent_differential(self.into(), T::KIND, &position.clone().into())?;
        T::try_from(converted)
    }

    /// Euclidean magnitude at `position`, in the unit of the first Cartesian component.
    fn norm<P: AbstractVector>(&self, position: &P) -> Result<Quantity, Error> {
        self.clone()
            .represent_as::<Self::Cartesian, P>(position)?
            .magnitude()
    }

    /// Multiplies every component by `factor` and reinterprets the result as the integral
    /// class: a velocity times a time is a displacement.
    fn mul_quantity(&self, factor: &Quantity) -> Result<Self::Integral, Error> {
        let products = self
            .components_ref()
            .into_iter()
            .map(|c| c.checked_mul(factor))
            .collect::<Result<Vec<_>, _>>()?;
        let names = Self::COMPONENTS
            .iter()
            .map(|name| name.strip_prefix("d_").unwrap_or(name));
        Self::Integral::from_mapping(names.zip(products))
    }
}

fn kind_of<V: VectorBase>(_: &V) -> Kind {
    V::KIND
}

macro_rules! each_differential {
    ($any:expr, $d:ident => $body:expr) => {
        match $any {
            AnyDifferential::CartesianDifferential1D($d) => $body,
            AnyDifferential::RadialDifferential($d) => $body,
            AnyDifferential::CartesianDifferential2D($d) => $body,
            AnyDifferential::PolarDifferential($d) => $body,
            AnyDifferential::CartesianDifferential3D($d) => $body,
            AnyDifferential::SphericalDifferential($d) => $body,
            AnyDifferential::CylindricalDifferential($d) => $body,
            AnyDifferential::CartesianDifferentialND($d) => $body,
        }
    };
}

/// A differential whose class is only known at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyDifferential {
    CartesianDifferential1D(CartesianDifferential1D),
    RadialDifferential(RadialDifferential),
    CartesianDifferential2D(CartesianDifferential2D),
    PolarDifferential(PolarDifferential),
    CartesianDifferential3D(CartesianDifferential3D),
    SphericalDifferential(SphericalDifferential),
    CylindricalDifferential(CylindricalDifferential),
    CartesianDifferentialND(CartesianDifferentialND),
}

macro_rules! checked_op {
    ($(#[$attr:meta])* $name:ident, $op:ident) => {
        $(#[$attr])*
        pub fn $name(&self, rhs: &Self) -> Result<Self, Error> {
            use crate::vectors::SupportsAddition;
            match (self, rhs) {
                (Self::CartesianDifferential1D(a), Self::CartesianDifferential1D(b)) => {
                    a.$op(b).map(Into::into)
                }
                (Self::CartesianDifferential2D(a), Self::CartesianDifferential2D(b)) => {
                    a.$op(b).map(Into::into)
                }
                (Self::CartesianDifferential3D(a), Self::CartesianDifferential3D(b)) => {
                    a.$op(b).map(Into::into)
                }
                (Self::CartesianDifferentialND(a), Self::CartesianDifferentialND(b)) => {
                    a.$op(b).map(Into::into)
                }
                _ => Err(Error::OperandType {
                    op: stringify!($op),
                    expected: self.kind().cartesian(),
                    found: rhs.kind(),
                }),
            }
        }
    };
}

impl AnyDifferential {
    #[must_use]
    pub fn kind(&self) -> Kind {
        each_differential!(self, d => kind_of(d))
    }

    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        each_differential!(self, d => d.shape())
    }

    #[must_use]
    pub fn asdict(&self) -> crate::base::ComponentMap<Quantity> {
        each_differential!(self, d => d.asdict())
    }

    checked_op!(
        /// Adds two Cartesian differentials of the same class; anything else is a type error.
        checked_add,
        add
    );

    checked_op!(
        /// Subtracts two Cartesian differentials of the same class.
        checked_sub,
        sub
    );
}

impl Display for AnyDifferential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        each_differential!(self, d => Display::fmt(d, f))
    }
}

#[cfg(test)]
mod tests {
    use super::{AbstractVectorDifferential, AnyDifferential};
    use crate::base::VectorBase;
    use crate::d2::{CartesianDifferential2D, PolarDifferential, PolarVector};
    use crate::d3::{
        Cartesian3DVector, CartesianDifferential3D, SphericalDifferential, SphericalVector,
    };
    use crate::error::ErrorKind;
    use crate::kinds::Kind;
    use crate::quantity::Quantity;
    use crate::units::{PhysicalType, Unit};
    use crate::vectors::SupportsAddition;
    use crate::testing::capture_logs;
    use approx::assert_relative_eq;
    use tracing::Level;

    fn q(v: f64, unit: &str) -> Quantity {
        Quantity::scalar(v, unit.parse().unwrap())
    }

    fn velocity(x: f64, y: f64, z: f64) -> CartesianDifferential3D {
        CartesianDifferential3D::new(q(x, "km / s"), q(y, "km / s"), q(z, "km / s")).unwrap()
    }

    fn position() -> Cartesian3DVector {
        Cartesian3DVector::new(q(1., "kpc"), q(2., "kpc"), q(-1., "kpc")).unwrap()
    }

    #[test]
    fn addition_identities() {
        let d = velocity(1., -2., 3.);
        let zero = d.sub(&d).unwrap();
        assert!(zero.components_ref().iter().all(|c| c.value().sum() == 0.));
        assert_eq!(d.add(&d).unwrap(), d.scale(2.));
    }

    #[test]
    fn runtime_addition_requires_same_cartesian_class() {
        let a: AnyDifferential = velocity(1., 2., 3.).into();
        assert_eq!(
            a.checked_add(&a).unwrap().kind(),
            Kind::CartesianDifferential3D
        );

        let b: AnyDifferential = CartesianDifferential2D::new(q(1., "m / s"), q(1., "m / s"))
            .unwrap()
            .into();
        assert_eq!(a.checked_sub(&b).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn norm_is_representation_independent() {
        let d = velocity(3., 4., 12.);
        let at = position();
        assert_relative_eq!(d.norm(&at).unwrap().value().sum(), 13.);

        let s: SphericalDifferential = d.represent_as(&at).unwrap();
        let n = s.norm(&at).unwrap();
        assert_eq!(n.unit(), &"km / s".parse::<Unit>().unwrap());
        assert_relative_eq!(n.value().sum(), 13., max_relative = 1e-12);
    }

    #[test]
    fn multiplying_by_time_gives_a_position() {
        let v = PolarDifferential::new(q(2., "m / s"), q(0.5, "rad / s")).unwrap();
        let p: PolarVector = v.mul_quantity(&q(4., "s")).unwrap();
        assert_eq!(p.r().physical_type(), PhysicalType::LENGTH);
        assert_relative_eq!(p.r().to_units(&"m".parse().unwrap()).unwrap().value().sum(), 8.);
        assert_relative_eq!(
            p.phi()
                .to_units(&"rad".parse().unwrap())
                .unwrap()
                .value()
                .sum(),
            2.
        );
    }

    #[test]
    fn extra_arguments_warn_but_convert() {
        let at = position();
        let d = velocity(1., 0., 0.);

        let expected: SphericalDifferential = d.clone().represent_as(&at).unwrap();
        let (got, logs) = capture_logs(Level::WARN, || {
            d.represent_as_with_extra::<SphericalDifferential, _>(&at, &[&"unused", &42])
        });

        assert_relative_eq!(got.unwrap(), expected);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("WARN"));
        assert!(logs[0].contains("ignoring extra arguments"));
        assert!(logs[0].contains(r#"extra=["unused", 42]"#), "{}", logs[0]);
    }

    #[test]
    fn no_warning_without_extra_arguments() {
        let at = SphericalVector::new(q(1., "m"), q(1., "rad"), q(1., "rad")).unwrap();
        let d = velocity(1., 0., 0.);
        let (got, logs) = capture_logs(Level::WARN, || {
            d.represent_as_with_extra::<CartesianDifferential3D, _>(&at, &[])
        });
        assert!(got.is_ok());
        assert!(logs.is_empty(), "{logs:?}");
    }
}

//! One-dimensional representations: a signed Cartesian coordinate and a radial distance.

use crate::base::VectorBase;
use crate::differentials::AbstractVectorDifferential;
use crate::error::Error;
use crate::kinds::{DifferentialRegistry, Kind};
use crate::transform::TransformTable;
use crate::util::map_elements;
use crate::vectors::{AbstractVector, CartesianBase, SupportsAddition};

representation! {
    /// A point on a line.
    pub struct Cartesian1DVector as Cartesian1D in AnyVector {
        x,
    }
}

representation! {
    /// A distance from the origin, with no direction.
    pub struct RadialVector as Radial in AnyVector {
        r,
    }
}

representation! {
    /// The rate of change of a [`Cartesian1DVector`].
    pub struct CartesianDifferential1D as CartesianDifferential1D in AnyDifferential {
        d_x,
    }
}

representation! {
    /// The rate of change of a [`RadialVector`]. Converting it to Cartesian form needs the
    /// position's sign, since `r` does not keep it.
    pub struct RadialDifferential as RadialDifferential in AnyDifferential {
        d_r,
    }
}

linear_ops!(Cartesian1DVector, CartesianDifferential1D, RadialDifferential);

impl AbstractVector for Cartesian1DVector {
    type Cartesian = Self;
    type Differential = CartesianDifferential1D;
}

impl AbstractVector for RadialVector {
    type Cartesian = Cartesian1DVector;
    type Differential = RadialDifferential;
}

impl AbstractVectorDifferential for CartesianDifferential1D {
    type Cartesian = Self;
    type Integral = Cartesian1DVector;
}

impl AbstractVectorDifferential for RadialDifferential {
    type Cartesian = CartesianDifferential1D;
    type Integral = RadialVector;
}

impl SupportsAddition for Cartesian1DVector {}
impl CartesianBase for Cartesian1DVector {}
impl SupportsAddition for CartesianDifferential1D {}
impl CartesianBase for CartesianDifferential1D {}

/// The distance is `|x|`; the sign of `x` is lost.
pub(crate) fn cartesian_to_radial(v: Cartesian1DVector) -> Result<RadialVector, Error> {
    let x = v.x;
    Ok(RadialVector {
        r: x.with_value(x.value().mapv(f64::abs)),
    })
}

pub(crate) fn radial_to_cartesian(v: RadialVector) -> Result<Cartesian1DVector, Error> {
    Ok(Cartesian1DVector { x: v.r })
}

/// `d_r = sign(x) d_x`, taking `x = 0` as positive.
pub(crate) fn cartesian_to_radial_differential(
    d: CartesianDifferential1D,
    at: &Cartesian1DVector,
) -> Result<RadialDifferential, Error> {
    let [d_r] = map_elements([at.x.value(), d.d_x.value()], |[x, d_x]| {
        [if x < 0. { -d_x } else { d_x }]
    })?;
    Ok(RadialDifferential {
        d_r: d.d_x.with_value(d_r),
    })
}

/// A radial position always sits on the positive half-line, so `d_x = d_r`.
pub(crate) fn radial_to_cartesian_differential(
    d: RadialDifferential,
    _at: &RadialVector,
) -> Result<CartesianDifferential1D, Error> {
    Ok(CartesianDifferential1D { d_x: d.d_r })
}

pub(crate) fn register(table: &mut TransformTable) {
    table.register_position(cartesian_to_radial);
    table.register_position(radial_to_cartesian);
    table.register_differential(cartesian_to_radial_differential);
    table.register_differential(radial_to_cartesian_differential);
}

pub(crate) fn register_differentials(registry: &mut DifferentialRegistry) {
    registry.register(Kind::CartesianDifferential1D);
    registry.register(Kind::RadialDifferential);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::testing::{arbitrary_in, q, unit};
    use approx::assert_relative_eq;
    use ndarray::arr1;
    use quickcheck::quickcheck;

    #[derive(Clone, Debug)]
    struct Sample {
        r: f64,
        d_r: f64,
    }

    impl quickcheck::Arbitrary for Sample {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Self {
                r: arbitrary_in(g, 0., 1e6),
                d_r: arbitrary_in(g, -1e3, 1e3),
            }
        }
    }

    fn try_radial_roundtrip(sample: Sample) {
        let v = RadialVector::new(q(sample.r, "km")).unwrap();
        let back: RadialVector = v
            .clone()
            .represent_as::<Cartesian1DVector>()
            .unwrap()
            .represent_as()
            .unwrap();
        assert_relative_eq!(back, v);

        let d = RadialDifferential::new(q(sample.d_r, "km / s")).unwrap();
        let back: RadialDifferential = d
            .clone()
            .represent_as::<CartesianDifferential1D, _>(&v)
            .unwrap()
            .represent_as(&v)
            .unwrap();
        assert_relative_eq!(back, d);
    }

    quickcheck! {
        fn radial_roundtrip(sample: Sample) -> () {
            try_radial_roundtrip(sample);
        }
    }

    #[test]
    fn negative_x_has_positive_distance() {
        let x = Quantity::new(arr1(&[-2., 0., 3.]), unit("m"));
        let v = Cartesian1DVector::new(x).unwrap();
        let r: RadialVector = v.clone().represent_as().unwrap();
        assert_eq!(r.r().value(), &arr1(&[2., 0., 3.]).into_dyn());

        let d = CartesianDifferential1D::new(q(1., "m / s")).unwrap();
        let d_r: RadialDifferential = d.represent_as(&v).unwrap();
        assert_eq!(d_r.d_r().value(), &arr1(&[-1., 1., 1.]).into_dyn());
    }

    #[test]
    fn display() {
        let v = Cartesian1DVector::new(q(1., "kpc")).unwrap();
        insta::assert_snapshot!(v.to_string(), @r"
<Cartesian1DVector (x[kpc])
    [1.]>
");
        let d = RadialDifferential::new(Quantity::new(arr1(&[1., 2.5]), unit("km / s"))).unwrap();
        insta::assert_snapshot!(d.to_string(), @r"
<RadialDifferential (d_r[km / s])
    [[1. ]
     [2.5]]>
");
    }

    #[test]
    fn speed_times_time_is_distance() {
        let d = CartesianDifferential1D::new(q(3., "m / s")).unwrap();
        let x = d.mul_quantity(&q(2., "s")).unwrap();
        assert_eq!(x.x().unit(), &unit("m"));
        assert_eq!(x.x().value().sum(), 6.);
        assert_eq!(CartesianDifferential1D::components(), ["d_x"]);
    }
}

//! Three-dimensional representations: Cartesian, spherical, and cylindrical.
//!
//! Spherical coordinates use the physics convention: `theta` is the polar angle measured from
//! the positive z axis, and `phi` is the azimuth measured counterclockwise from the positive x
//! axis in the xy plane. Cylindrical coordinates share that azimuth.
//!
//! Differentials are converted through the local orthonormal basis at the given position. For
//! spherical coordinates that basis is
//!
//! ```text
//! e_r     = ( sinθ cosφ,  sinθ sinφ,  cosθ)
//! e_theta = ( cosθ cosφ,  cosθ sinφ, -sinθ)
//! e_phi   = (-sinφ,       cosφ,       0   )
//! ```
//!
//! and a velocity `(d_r, d_theta, d_phi)` has Cartesian components
//! `B · (d_r, r d_theta, r sinθ d_phi)` where `B` has the basis vectors as columns. Where the
//! angular rates are undefined (on the z axis, or at the origin) they are reported as zero.

use crate::base::VectorBase;
use crate::differentials::AbstractVectorDifferential;
use crate::error::Error;
use crate::kinds::{DifferentialRegistry, Kind};
use crate::quantity::Quantity;
use crate::transform::TransformTable;
use crate::units::Unit;
use crate::util::map_elements;
use crate::vectors::{AbstractVector, CartesianBase, SupportsAddition};
use nalgebra::{Matrix3, Vector3};

representation! {
    pub struct Cartesian3DVector as Cartesian3D in AnyVector {
        x,
        y,
        z,
    }
}

representation! {
    /// A point given by its distance from the origin and two angles.
    pub struct SphericalVector as Spherical in AnyVector {
        /// Distance from the origin.
        r,
        /// Polar angle from the positive z axis, in `[0, π]`.
        theta,
        /// Azimuth counterclockwise from the positive x axis.
        phi,
    }
}

representation! {
    /// A point given by its distance from the z axis, its azimuth, and its height.
    pub struct CylindricalVector as Cylindrical in AnyVector {
        /// Distance from the z axis.
        rho,
        /// Azimuth counterclockwise from the positive x axis.
        phi,
        z,
    }
}

representation! {
    pub struct CartesianDifferential3D as CartesianDifferential3D in AnyDifferential {
        d_x,
        d_y,
        d_z,
    }
}

representation! {
    pub struct SphericalDifferential as SphericalDifferential in AnyDifferential {
        d_r,
        d_theta,
        d_phi,
    }
}

representation! {
    pub struct CylindricalDifferential as CylindricalDifferential in AnyDifferential {
        d_rho,
        d_phi,
        d_z,
    }
}

linear_ops!(
    Cartesian3DVector,
    CartesianDifferential3D,
    SphericalDifferential,
    CylindricalDifferential,
);

impl AbstractVector for Cartesian3DVector {
    type Cartesian = Self;
    type Differential = CartesianDifferential3D;
}

impl AbstractVector for SphericalVector {
    type Cartesian = Cartesian3DVector;
    type Differential = SphericalDifferential;
}

impl AbstractVector for CylindricalVector {
    type Cartesian = Cartesian3DVector;
    type Differential = CylindricalDifferential;
}

impl AbstractVectorDifferential for CartesianDifferential3D {
    type Cartesian = Self;
    type Integral = Cartesian3DVector;
}

impl AbstractVectorDifferential for SphericalDifferential {
    type Cartesian = CartesianDifferential3D;
    type Integral = SphericalVector;
}

impl AbstractVectorDifferential for CylindricalDifferential {
    type Cartesian = CartesianDifferential3D;
    type Integral = CylindricalVector;
}

impl SupportsAddition for Cartesian3DVector {}
impl CartesianBase for Cartesian3DVector {}
impl SupportsAddition for CartesianDifferential3D {}
impl CartesianBase for CartesianDifferential3D {}

/// Columns are `e_r`, `e_theta` and `e_phi` in Cartesian components.
#[rustfmt::skip]
fn spherical_basis(theta: f64, phi: f64) -> Matrix3<f64> {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    Matrix3::new(
        sin_t * cos_p, cos_t * cos_p, -sin_p,
        sin_t * sin_p, cos_t * sin_p, cos_p,
        cos_t, -sin_t, 0.,
    )
}

#[rustfmt::skip]
fn cylindrical_basis(phi: f64) -> Matrix3<f64> {
    let (sin, cos) = phi.sin_cos();
    Matrix3::new(
        cos, -sin, 0.,
        sin, cos, 0.,
        0., 0., 1.,
    )
}

/// `rate / scale`, or zero where the scale vanishes.
fn per(rate: f64, scale: f64) -> f64 {
    if scale == 0. {
        0.
    } else {
        rate / scale
    }
}

pub(crate) fn spherical_to_cartesian(v: SphericalVector) -> Result<Cartesian3DVector, Error> {
    let unit = v.r.unit().clone();
    let theta = v.theta.value_in(&Unit::radian())?;
    let phi = v.phi.value_in(&Unit::radian())?;
    let [x, y, z] = map_elements([v.r.value(), &theta, &phi], |[r, theta, phi]| {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        [r * sin_t * cos_p, r * sin_t * sin_p, r * cos_t]
    })?;
    Ok(Cartesian3DVector {
        x: Quantity::new(x, unit.clone()),
        y: Quantity::new(y, unit.clone()),
        z: Quantity::new(z, unit),
    })
}

/// At the origin both angles are zero.
pub(crate) fn cartesian_to_spherical(v: Cartesian3DVector) -> Result<SphericalVector, Error> {
    let unit = v.x.unit().clone();
    let y = v.y.value_in(&unit)?;
    let z = v.z.value_in(&unit)?;
    let [r, theta, phi] = map_elements([v.x.value(), &y, &z], |[x, y, z]| {
        let rho = x.hypot(y);
        [rho.hypot(z), rho.atan2(z), y.atan2(x)]
    })?;
    Ok(SphericalVector {
        r: Quantity::new(r, unit),
        theta: Quantity::new(theta, Unit::radian()),
        phi: Quantity::new(phi, Unit::radian()),
    })
}

pub(crate) fn cylindrical_to_cartesian(v: CylindricalVector) -> Result<Cartesian3DVector, Error> {
    let unit = v.rho.unit().clone();
    let phi = v.phi.value_in(&Unit::radian())?;
    let [x, y] = map_elements([v.rho.value(), &phi], |[rho, phi]| {
        let (sin, cos) = phi.sin_cos();
        [rho * cos, rho * sin]
    })?;
    Ok(Cartesian3DVector {
        x: Quantity::new(x, unit.clone()),
        y: Quantity::new(y, unit),
        z: v.z,
    })
}

pub(crate) fn cartesian_to_cylindrical(v: Cartesian3DVector) -> Result<CylindricalVector, Error> {
    let unit = v.x.unit().clone();
    let y = v.y.value_in(&unit)?;
    let [rho, phi] = map_elements([v.x.value(), &y], |[x, y]| [x.hypot(y), y.atan2(x)])?;
    Ok(CylindricalVector {
        rho: Quantity::new(rho, unit),
        phi: Quantity::new(phi, Unit::radian()),
        z: v.z,
    })
}

pub(crate) fn spherical_to_cylindrical(v: SphericalVector) -> Result<CylindricalVector, Error> {
    let unit = v.r.unit().clone();
    let theta = v.theta.value_in(&Unit::radian())?;
    let [rho, z] = map_elements([v.r.value(), &theta], |[r, theta]| {
        let (sin, cos) = theta.sin_cos();
        [r * sin, r * cos]
    })?;
    Ok(CylindricalVector {
        rho: Quantity::new(rho, unit.clone()),
        phi: v.phi.to_units(&Unit::radian())?,
        z: Quantity::new(z, unit),
    })
}

pub(crate) fn cylindrical_to_spherical(v: CylindricalVector) -> Result<SphericalVector, Error> {
    let unit = v.rho.unit().clone();
    let z = v.z.value_in(&unit)?;
    let [r, theta] = map_elements([v.rho.value(), &z], |[rho, z]| {
        [rho.hypot(z), rho.atan2(z)]
    })?;
    Ok(SphericalVector {
        r: Quantity::new(r, unit),
        theta: Quantity::new(theta, Unit::radian()),
        phi: v.phi.to_units(&Unit::radian())?,
    })
}

pub(crate) fn spherical_to_cartesian_differential(
    d: SphericalDifferential,
    at: &SphericalVector,
) -> Result<CartesianDifferential3D, Error> {
    let [d_x, d_y, d_z] = map_elements(
        [
            &at.r.si_value(),
            &at.theta.si_value(),
            &at.phi.si_value(),
            &d.d_r.si_value(),
            &d.d_theta.si_value(),
            &d.d_phi.si_value(),
        ],
        |[r, theta, phi, d_r, d_theta, d_phi]| {
            let local = Vector3::new(d_r, r * d_theta, r * theta.sin() * d_phi);
            let v = spherical_basis(theta, phi) * local;
            [v.x, v.y, v.z]
        },
    )?;
    let unit = d.d_r.unit().clone();
    Ok(CartesianDifferential3D {
        d_x: Quantity::from_si(d_x, unit.clone()),
        d_y: Quantity::from_si(d_y, unit.clone()),
        d_z: Quantity::from_si(d_z, unit),
    })
}

pub(crate) fn cartesian_to_spherical_differential(
    d: CartesianDifferential3D,
    at: &SphericalVector,
) -> Result<SphericalDifferential, Error> {
    let [d_r, d_theta, d_phi] = map_elements(
        [
            &at.r.si_value(),
            &at.theta.si_value(),
            &at.phi.si_value(),
            &d.d_x.si_value(),
            &d.d_y.si_value(),
            &d.d_z.si_value(),
        ],
        |[r, theta, phi, d_x, d_y, d_z]| {
            let local = spherical_basis(theta, phi).transpose() * Vector3::new(d_x, d_y, d_z);
            [
                local.x,
                per(local.y, r),
                per(local.z, r * theta.sin()),
            ]
        },
    )?;
    let unit = d.d_x.unit().clone();
    let angular = unit.angular_rate()?;
    Ok(SphericalDifferential {
        d_r: Quantity::from_si(d_r, unit),
        d_theta: Quantity::from_si(d_theta, angular.clone()),
        d_phi: Quantity::from_si(d_phi, angular),
    })
}

pub(crate) fn cylindrical_to_cartesian_differential(
    d: CylindricalDifferential,
    at: &CylindricalVector,
) -> Result<CartesianDifferential3D, Error> {
    let [d_x, d_y, d_z] = map_elements(
        [
            &at.rho.si_value(),
            &at.phi.si_value(),
            &d.d_rho.si_value(),
            &d.d_phi.si_value(),
            &d.d_z.si_value(),
        ],
        |[rho, phi, d_rho, d_phi, d_z]| {
            let v = cylindrical_basis(phi) * Vector3::new(d_rho, rho * d_phi, d_z);
            [v.x, v.y, v.z]
        },
    )?;
    let unit = d.d_rho.unit().clone();
    Ok(CartesianDifferential3D {
        d_x: Quantity::from_si(d_x, unit.clone()),
        d_y: Quantity::from_si(d_y, unit.clone()),
        d_z: Quantity::from_si(d_z, unit),
    })
}

pub(crate) fn cartesian_to_cylindrical_differential(
    d: CartesianDifferential3D,
    at: &CylindricalVector,
) -> Result<CylindricalDifferential, Error> {
    let [d_rho, d_phi, d_z] = map_elements(
        [
            &at.rho.si_value(),
            &at.phi.si_value(),
            &d.d_x.si_value(),
            &d.d_y.si_value(),
            &d.d_z.si_value(),
        ],
        |[rho, phi, d_x, d_y, d_z]| {
            let local = cylindrical_basis(phi).transpose() * Vector3::new(d_x, d_y, d_z);
            [local.x, per(local.y, rho), local.z]
        },
    )?;
    let unit = d.d_x.unit().clone();
    let angular = unit.angular_rate()?;
    Ok(CylindricalDifferential {
        d_rho: Quantity::from_si(d_rho, unit.clone()),
        d_phi: Quantity::from_si(d_phi, angular),
        d_z: Quantity::from_si(d_z, unit),
    })
}

/// Within the meridian plane, `(rho, z)` is `(r, theta)` rotated by `theta`; the azimuthal rate
/// carries over unchanged.
pub(crate) fn spherical_to_cylindrical_differential(
    d: SphericalDifferential,
    at: &SphericalVector,
) -> Result<CylindricalDifferential, Error> {
    let [d_rho, d_z] = map_elements(
        [
            &at.r.si_value(),
            &at.theta.si_value(),
            &d.d_r.si_value(),
            &d.d_theta.si_value(),
        ],
        |[r, theta, d_r, d_theta]| {
            let (sin, cos) = theta.sin_cos();
            [d_r * sin + r * cos * d_theta, d_r * cos - r * sin * d_theta]
        },
    )?;
    let unit = d.d_r.unit().clone();
    Ok(CylindricalDifferential {
        d_rho: Quantity::from_si(d_rho, unit.clone()),
        d_phi: d.d_phi,
        d_z: Quantity::from_si(d_z, unit),
    })
}

pub(crate) fn cylindrical_to_spherical_differential(
    d: CylindricalDifferential,
    at: &CylindricalVector,
) -> Result<SphericalDifferential, Error> {
    let [d_r, d_theta] = map_elements(
        [
            &at.rho.si_value(),
            &at.z.si_value(),
            &d.d_rho.si_value(),
            &d.d_z.si_value(),
        ],
        |[rho, z, d_rho, d_z]| {
            let r = rho.hypot(z);
            let theta = rho.atan2(z);
            let (sin, cos) = theta.sin_cos();
            [d_rho * sin + d_z * cos, per(d_rho * cos - d_z * sin, r)]
        },
    )?;
    let unit = d.d_rho.unit().clone();
    let angular = unit.angular_rate()?;
    Ok(SphericalDifferential {
        d_r: Quantity::from_si(d_r, unit),
        d_theta: Quantity::from_si(d_theta, angular),
        d_phi: d.d_phi,
    })
}

pub(crate) fn register(table: &mut TransformTable) {
    table.register_position(spherical_to_cartesian);
    table.register_position(cartesian_to_spherical);
    table.register_position(cylindrical_to_cartesian);
    table.register_position(cartesian_to_cylindrical);
    table.register_position(spherical_to_cylindrical);
    table.register_position(cylindrical_to_spherical);

    table.register_differential(spherical_to_cartesian_differential);
    table.register_differential(cartesian_to_spherical_differential);
    table.register_differential(cylindrical_to_cartesian_differential);
    table.register_differential(cartesian_to_cylindrical_differential);
    table.register_differential(spherical_to_cylindrical_differential);
    table.register_differential(cylindrical_to_spherical_differential);
}

pub(crate) fn register_differentials(registry: &mut DifferentialRegistry) {
    registry.register(Kind::CartesianDifferential3D);
    registry.register(Kind::SphericalDifferential);
    registry.register(Kind::CylindricalDifferential);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{arbitrary_in, q, unit};
    use approx::assert_relative_eq;
    use ndarray::{arr1, s, Array, IxDyn};
    use quickcheck::quickcheck;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[derive(Clone, Debug)]
    struct Sample {
        r: f64,
        theta: f64,
        phi: f64,
        rates: [f64; 3],
    }

    impl quickcheck::Arbitrary for Sample {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Self {
                r: arbitrary_in(g, 1., 1e6),
                // keep away from the z axis, where the azimuthal rate is ill-conditioned
                theta: arbitrary_in(g, 0.1, PI - 0.1),
                phi: arbitrary_in(g, -3.14, 3.14),
                rates: [
                    arbitrary_in(g, -1e3, 1e3),
                    arbitrary_in(g, -1., 1.),
                    arbitrary_in(g, -1., 1.),
                ],
            }
        }
    }

    fn spherical(s: &Sample) -> (SphericalVector, SphericalDifferential) {
        let [d_r, d_theta, d_phi] = s.rates;
        (
            SphericalVector::new(q(s.r, "km"), q(s.theta, "rad"), q(s.phi, "rad")).unwrap(),
            SphericalDifferential::new(q(d_r, "km / s"), q(d_theta, "rad / s"), q(d_phi, "rad / s"))
                .unwrap(),
        )
    }

    fn try_spherical_roundtrip(s: Sample) {
        let (v, d) = spherical(&s);
        let back: SphericalVector = v
            .clone()
            .represent_as::<Cartesian3DVector>()
            .unwrap()
            .represent_as()
            .unwrap();
        assert_relative_eq!(back, v, epsilon = 1e-9, max_relative = 1e-9);

        let back: SphericalDifferential = d
            .clone()
            .represent_as::<CartesianDifferential3D, _>(&v)
            .unwrap()
            .represent_as(&v)
            .unwrap();
        assert_relative_eq!(back, d, epsilon = 1e-9, max_relative = 1e-9);
    }

    fn try_cylindrical_roundtrip(s: Sample) {
        let (sph, _) = spherical(&s);
        let v: CylindricalVector = sph.represent_as().unwrap();
        let [d_rho, d_phi, d_z] = s.rates;
        let d = CylindricalDifferential::new(
            q(d_rho, "km / s"),
            q(d_phi, "rad / s"),
            q(d_z, "km / s"),
        )
        .unwrap();

        let back: CylindricalVector = v
            .clone()
            .represent_as::<Cartesian3DVector>()
            .unwrap()
            .represent_as()
            .unwrap();
        assert_relative_eq!(back, v, epsilon = 1e-9, max_relative = 1e-9);

        let back: CylindricalDifferential = d
            .clone()
            .represent_as::<CartesianDifferential3D, _>(&v)
            .unwrap()
            .represent_as(&v)
            .unwrap();
        assert_relative_eq!(back, d, epsilon = 1e-9, max_relative = 1e-9);

        // and through the direct spherical rules
        let back: CylindricalDifferential = d
            .clone()
            .represent_as::<SphericalDifferential, _>(&v)
            .unwrap()
            .represent_as(&v)
            .unwrap();
        assert_relative_eq!(back, d, epsilon = 1e-9, max_relative = 1e-9);
    }

    fn try_direct_rule_matches_hop(s: Sample) {
        let (v, d) = spherical(&s);
        let direct: CylindricalDifferential = d.clone().represent_as(&v).unwrap();
        let hop: CylindricalDifferential = d
            .represent_as::<CartesianDifferential3D, _>(&v)
            .unwrap()
            .represent_as(&v)
            .unwrap();
        assert_relative_eq!(direct, hop, epsilon = 1e-6, max_relative = 1e-9);
    }

    quickcheck! {
        fn spherical_roundtrip(sample: Sample) -> () {
            try_spherical_roundtrip(sample);
        }

        fn cylindrical_roundtrip(sample: Sample) -> () {
            try_cylindrical_roundtrip(sample);
        }

        fn direct_rule_matches_hop(sample: Sample) -> () {
            try_direct_rule_matches_hop(sample);
        }
    }

    #[rstest]
    #[case([0., 0., 2.], [2., 0., 0.])]
    #[case([1., 0., 0.], [1., FRAC_PI_2, 0.])]
    #[case([0., 3., 0.], [3., FRAC_PI_2, FRAC_PI_2])]
    #[case([0., 0., -1.], [1., PI, 0.])]
    #[case([0., 0., 0.], [0., 0., 0.])]
    fn known_spherical(#[case] xyz: [f64; 3], #[case] expected: [f64; 3]) {
        let v = Cartesian3DVector::from_stacked(&Quantity::from_vec(xyz.to_vec(), unit("m")))
            .unwrap();
        let s: SphericalVector = v.represent_as().unwrap();
        let [r, theta, phi] = expected;
        assert_relative_eq!(s.r().value().sum(), r);
        assert_relative_eq!(s.theta().value().sum(), theta);
        assert_relative_eq!(s.phi().value().sum(), phi);
    }

    #[test]
    fn angles_in_degrees_convert() {
        let v = SphericalVector::new(q(2., "m"), q(90., "deg"), q(180., "deg")).unwrap();
        let c: Cartesian3DVector = v.represent_as().unwrap();
        assert_relative_eq!(c.x().value().sum(), -2., epsilon = 1e-12);
        assert_relative_eq!(c.y().value().sum(), 0., epsilon = 1e-12);
        assert_relative_eq!(c.z().value().sum(), 0., epsilon = 1e-12);
    }

    #[test]
    fn spherical_to_cylindrical_is_direct() {
        let v = SphericalVector::new(q(2., "kpc"), q(FRAC_PI_4, "rad"), q(30., "deg")).unwrap();
        let c: CylindricalVector = v.represent_as().unwrap();
        assert_eq!(c.rho().unit(), &unit("kpc"));
        assert_relative_eq!(c.rho().value().sum(), 2f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(c.z().value().sum(), 2f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(c.phi().value().sum(), PI / 6., max_relative = 1e-12);
    }

    #[test]
    fn rates_on_the_axis_are_zero() {
        let at = SphericalVector::new(q(1., "m"), q(0., "rad"), q(0., "rad")).unwrap();
        let d = CartesianDifferential3D::new(q(0., "m / s"), q(1., "m / s"), q(0., "m / s"))
            .unwrap();
        let s: SphericalDifferential = d.clone().represent_as(&at).unwrap();
        assert_eq!(s.d_phi().value().sum(), 0.);
        assert_eq!(s.d_theta().unit(), &unit("rad / s"));

        let origin = SphericalVector::new(q(0., "m"), q(1., "rad"), q(1., "rad")).unwrap();
        let s: SphericalDifferential = d.represent_as(&origin).unwrap();
        assert_eq!(s.d_theta().value().sum(), 0.);
        assert_eq!(s.d_phi().value().sum(), 0.);
    }

    #[test]
    fn acceleration_units_follow_the_source() {
        let at = Cartesian3DVector::new(q(1., "m"), q(1., "m"), q(0., "m")).unwrap();
        let a = CartesianDifferential3D::new(q(1., "m / s2"), q(0., "m / s2"), q(0., "m / s2"))
            .unwrap();
        let s: SphericalDifferential = a.represent_as(&at).unwrap();
        assert_eq!(s.d_r().unit(), &unit("m / s2"));
        assert_eq!(s.d_phi().unit(), &unit("rad / s2"));
    }

    #[test]
    fn batched_positions_and_velocities() {
        let values: Vec<f64> = (1..=12).map(f64::from).collect();
        let stacked = Quantity::new(
            Array::from_shape_vec(IxDyn(&[2, 2, 3]), values).unwrap(),
            unit("m"),
        );
        let v = Cartesian3DVector::from_stacked(&stacked).unwrap();
        assert_eq!(v.shape(), vec![2, 2]);

        let s: SphericalVector = v.clone().represent_as().unwrap();
        assert_eq!(s.shape(), vec![2, 2]);

        let d = CartesianDifferential3D::new(q(1., "m / s"), q(0., "m / s"), q(0., "m / s"))
            .unwrap();
        let sd: SphericalDifferential = d.represent_as(&v).unwrap();
        assert_eq!(sd.shape(), vec![2, 2]);

        let first = s.get(s![0, 0].as_ref()).unwrap();
        assert_relative_eq!(first.r().value().sum(), 14f64.sqrt());
    }

    #[test]
    fn cross_dimension_dispatch_fails() {
        let v = Cartesian3DVector::new(q(1., "m"), q(2., "m"), q(3., "m")).unwrap();
        let err = v.represent_as::<crate::d2::PolarVector>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dispatch);
    }

    #[test]
    fn display() {
        let v = Cartesian3DVector::new(q(1., "m"), q(2., "m"), q(3., "m")).unwrap();
        insta::assert_snapshot!(v.to_string(), @r"
<Cartesian3DVector (x[m], y[m], z[m])
    [1. 2. 3.]>
");

        let s = SphericalVector::new(
            Quantity::new(arr1(&[1., 2.]), unit("kpc")),
            q(0.5, "rad"),
            q(45., "deg"),
        )
        .unwrap();
        insta::assert_snapshot!(s.to_string(), @r"
<SphericalVector (r[kpc], theta[rad], phi[deg])
    [[ 1.   0.5 45. ]
     [ 2.   0.5 45. ]]>
");
    }
}

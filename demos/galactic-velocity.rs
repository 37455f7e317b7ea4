use coordinax::{
    AbstractVector, AbstractVectorDifferential, Cartesian3DVector, CartesianDifferential3D,
    CylindricalDifferential, CylindricalVector, Error, Quantity, SphericalDifferential,
    SphericalVector, SupportsAddition, Unit, UnitSystem, VectorBase,
};
use ndarray::arr1;

fn unit(s: &str) -> Unit {
    s.parse().expect("known unit")
}

fn main() -> Result<(), Error> {
    // three stars on a ring of radius 8 kpc in the galactic plane
    let at = CylindricalVector::new(
        Quantity::scalar(8., unit("kpc")),
        Quantity::new(arr1(&[0., 90., 180.]), unit("deg")),
        Quantity::scalar(0., unit("kpc")),
    )?;

    // all on circular orbits at 220 km/s
    let omega = Quantity::scalar(220., unit("km / s"))
        .checked_div(&Quantity::scalar(8., unit("kpc")))?
        .value_in(&unit("1 / s"))?;
    let velocity = CylindricalDifferential::new(
        Quantity::scalar(0., unit("km / s")),
        Quantity::new(omega, unit("rad / s")),
        Quantity::scalar(0., unit("km / s")),
    )?;

    let cartesian: CartesianDifferential3D = velocity.clone().represent_as(&at)?;
    println!("{cartesian}");

    // speed does not depend on the representation it is measured in
    for speed in velocity.norm(&at)?.value() {
        assert!((speed - 220.).abs() < 1e-6);
    }

    let spherical: SphericalVector = at.clone().represent_as()?;
    let d_spherical: SphericalDifferential = velocity.represent_as(&at)?;
    println!("{spherical}");
    println!("{d_spherical}");

    // one million years later, to first order
    let step = cartesian.mul_quantity(&Quantity::scalar(1., unit("Myr")))?;
    let start: Cartesian3DVector = at.represent_as()?;
    let later = start.add(&step)?;
    let galactic = UnitSystem::new(["kpc", "Myr", "rad"].map(unit))?;
    println!("{}", later.to_units(&galactic)?);

    let moved = later.sub(&start)?.norm()?;
    for distance in moved.to_units(&unit("pc"))?.value() {
        assert!((distance - 225.).abs() < 1.);
    }

    Ok(())
}

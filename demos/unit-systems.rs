use coordinax::{
    AbstractVector, Cartesian2DVector, Error, ErrorKind, PolarVector, Quantity, ToUnits,
    ToUnitsOptions, Unit, UnitSystem, VectorBase,
};

fn main() -> Result<(), Error> {
    let km: Unit = "km".parse()?;
    let m: Unit = "m".parse()?;
    let deg: Unit = "deg".parse()?;

    // components may carry different units of the same physical type
    let v = Cartesian2DVector::new(
        Quantity::scalar(1.5, km.clone()),
        Quantity::scalar(500., m.clone()),
    )?;
    let consistent = v.to_units(ToUnitsOptions::Consistent)?;
    assert_eq!(consistent.y().unit(), &km);
    println!("{consistent}");

    let polar: PolarVector = v.represent_as()?;
    let readable = polar.to_units(ToUnits::from_names([("length", "m"), ("angle", "deg")])?)?;
    assert_eq!(readable.phi().unit(), &deg);
    println!("{readable}");

    let si = polar.to_units(UnitSystem::si())?;
    println!("{si}");

    // a system lacking a base dimension cannot answer for it
    let lengths_only = UnitSystem::new([m])?;
    let err = polar.to_units(lengths_only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Key);

    // unit algebra is checked rather than wrapping
    let err = "m^100 m^100".parse::<Unit>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unit);
    println!("{err}");

    Ok(())
}

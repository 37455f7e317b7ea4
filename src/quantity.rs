//! Unit-tagged, dynamically shaped arrays.

use crate::error::Error;
use crate::units::{PhysicalType, Unit};
use crate::util::{broadcast_shapes, broadcast_view, stack_arrays, Device, DType};
use ndarray::{Array, ArrayD, Axis, Dimension, IxDyn, SliceInfoElem, Zip};
use std::fmt::{self, Display, Formatter};
use std::ops::{Mul, Neg};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

/// An `f64` array carrying a runtime [`Unit`].
///
/// This is the value type every vector component is made of. Arithmetic between quantities
/// broadcasts like numpy and is fallible: addition and subtraction require matching physical
/// types and convert the right-hand side into the left-hand side's unit.
///
/// ```
/// use coordinax::{Quantity, Unit};
/// use ndarray::arr1;
///
/// let a = Quantity::new(arr1(&[1., 2.]), "km".parse().unwrap());
/// let b = Quantity::scalar(500., "m".parse().unwrap());
/// let sum = a.checked_add(&b).unwrap();
/// assert_eq!(sum.unit().to_string(), "km");
/// assert_eq!(sum.value().as_slice().unwrap(), &[1.5, 2.5]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    value: ArrayD<f64>,
    unit: Unit,
    device: Device,
}

impl Quantity {
    #[must_use]
    pub fn new<D: Dimension>(value: Array<f64, D>, unit: Unit) -> Self {
        Self {
            value: value.into_dyn(),
            unit,
            device: Device::Cpu,
        }
    }

    /// A zero-dimensional quantity.
    #[must_use]
    pub fn scalar(value: f64, unit: Unit) -> Self {
        Self::new(ndarray::arr0(value), unit)
    }

    /// A one-dimensional quantity.
    #[must_use]
    pub fn from_vec(values: Vec<f64>, unit: Unit) -> Self {
        Self::new(ndarray::Array1::from(values), unit)
    }

    #[must_use]
    pub fn value(&self) -> &ArrayD<f64> {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> ArrayD<f64> {
        self.value
    }

    #[must_use]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    #[must_use]
    pub fn physical_type(&self) -> PhysicalType {
        self.unit.physical_type()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.value.ndim()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.value.len()
    }

    #[must_use]
    pub fn dtype(&self) -> DType {
        DType::Float64
    }

    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }

    #[must_use]
    pub fn to_device(self, device: Device) -> Self {
        Self { device, ..self }
    }

    /// Returns the values expressed in `unit`.
    pub fn value_in(&self, unit: &Unit) -> Result<ArrayD<f64>, Error> {
        let factor = self.unit.conversion_factor(unit)?;
        if factor == 1. {
            return Ok(self.value.clone());
        }
        Ok(&self.value * factor)
    }

    /// Converts to `unit`, which must be of the same physical type.
    pub fn to_units(&self, unit: &Unit) -> Result<Self, Error> {
        Ok(Self {
            value: self.value_in(unit)?,
            unit: unit.clone(),
            device: self.device,
        })
    }

    /// Values in SI base units (radians for angles).
    pub(crate) fn si_value(&self) -> ArrayD<f64> {
        let scale = self.unit.scale();
        if scale == 1. {
            return self.value.clone();
        }
        &self.value * scale
    }

    /// Builds a quantity in `unit` from values given in SI base units.
    pub(crate) fn from_si(value: ArrayD<f64>, unit: Unit) -> Self {
        let scale = unit.scale();
        let value = if scale == 1. { value } else { value / scale };
        Self::new(value, unit)
    }

    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, Error> {
        if self.shape() == shape {
            return Ok(self.clone());
        }
        Ok(self.with_value(broadcast_view(&self.value, shape)?.to_owned()))
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Self, Error> {
        let reshaped = self
            .value
            .to_shape(IxDyn(shape))
            .map_err(|_| Error::Reshape {
                size: self.size(),
                shape: shape.to_vec(),
            })?;
        Ok(self.with_value(reshaped.into_owned()))
    }

    #[must_use]
    pub fn flatten(&self) -> Self {
        let flat: Vec<f64> = self.value.iter().copied().collect();
        self.with_value(ndarray::Array1::from(flat).into_dyn())
    }

    /// Applies an index that has already been checked against this quantity's shape.
    ///
    /// Axes the index does not reach are taken whole.
    pub(crate) fn slice(&self, index: &[SliceInfoElem]) -> Self {
        let given = index
            .iter()
            .filter(|e| !matches!(e, SliceInfoElem::NewAxis))
            .count();
        let mut full = index.to_vec();
        full.extend((given..self.ndim()).map(|_| SliceInfoElem::from(..)));
        self.with_value(self.value.slice(full.as_slice()).to_owned())
    }

    pub(crate) fn permuted(&self, axes: &[usize]) -> Self {
        self.with_value(
            self.value
                .view()
                .permuted_axes(IxDyn(axes))
                .as_standard_layout()
                .into_owned(),
        )
    }

    pub(crate) fn index_last(&self, i: usize) -> Self {
        let last = Axis(self.ndim() - 1);
        self.with_value(self.value.index_axis(last, i).to_owned())
    }

    pub(crate) fn with_value(&self, value: ArrayD<f64>) -> Self {
        Self {
            value,
            unit: self.unit.clone(),
            device: self.device,
        }
    }

    /// Stacks `quantities` along a new trailing axis after broadcasting them together.
    ///
    /// All quantities are expressed in the unit of the first one.
    pub fn stack(quantities: &[&Quantity]) -> Result<Self, Error> {
        let Some(first) = quantities.first() else {
            return Err(Error::Broadcast {
                left: vec![],
                right: vec![],
            });
        };
        let converted = quantities
            .iter()
            .map(|q| q.value_in(&first.unit))
            .collect::<Result<Vec<_>, _>>()?;
        let stacked = stack_arrays(&converted.iter().collect::<Vec<_>>())?;
        Ok(first.with_value(stacked))
    }

    fn zip_with(
        &self,
        rhs: &ArrayD<f64>,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<ArrayD<f64>, Error> {
        let shape = broadcast_shapes([self.shape(), rhs.shape()])?;
        let lhs = broadcast_view(&self.value, &shape)?;
        let rhs = broadcast_view(rhs, &shape)?;
        Ok(Zip::from(lhs).and(rhs).map_collect(|&a, &b| f(a, b)))
    }

    pub fn checked_add(&self, rhs: &Quantity) -> Result<Self, Error> {
        let rhs = rhs.value_in(&self.unit)?;
        Ok(self.with_value(self.zip_with(&rhs, |a, b| a + b)?))
    }

    pub fn checked_sub(&self, rhs: &Quantity) -> Result<Self, Error> {
        let rhs = rhs.value_in(&self.unit)?;
        Ok(self.with_value(self.zip_with(&rhs, |a, b| a - b)?))
    }

    /// Multiplies values and units. Fails if the shapes do not broadcast or a unit exponent
    /// leaves the range `±127`.
    pub fn checked_mul(&self, rhs: &Quantity) -> Result<Self, Error> {
        let value = self.zip_with(&rhs.value, |a, b| a * b)?;
        Ok(Self::new(value, self.unit.checked_mul(&rhs.unit)?))
    }

    pub fn checked_div(&self, rhs: &Quantity) -> Result<Self, Error> {
        let value = self.zip_with(&rhs.value, |a, b| a / b)?;
        Ok(Self::new(value, self.unit.checked_div(&rhs.unit)?))
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Self::Output {
        Self {
            value: -self.value,
            ..self
        }
    }
}

impl Neg for &Quantity {
    type Output = Quantity;

    fn neg(self) -> Self::Output {
        self.with_value(-&self.value)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            value: self.value * rhs,
            ..self
        }
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Self::Output {
        self.with_value(&self.value * rhs)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

macro_rules! from_uom {
    ($($quantity:ident => $unit:ty, $symbol:expr;)*) => {
        $(
            impl From<uom::si::f64::$quantity> for Quantity {
                fn from(value: uom::si::f64::$quantity) -> Self {
                    Quantity::scalar(value.get::<$unit>(), $symbol)
                }
            }
        )*
    };
}

from_uom! {
    Length => uom::si::length::meter, Unit::named("m");
    Mass => uom::si::mass::kilogram, Unit::named("kg");
    Time => uom::si::time::second, Unit::named("s");
    Angle => uom::si::angle::radian, Unit::radian();
    Velocity => uom::si::velocity::meter_per_second, Unit::from_symbols(&[("m", 1), ("s", -1)]);
    Acceleration => uom::si::acceleration::meter_per_second_squared,
        Unit::from_symbols(&[("m", 1), ("s", -2)]);
    AngularVelocity => uom::si::angular_velocity::radian_per_second,
        Unit::from_symbols(&[("rad", 1), ("s", -1)]);
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq for Quantity {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        <f64 as AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        other
            .value_in(&self.unit)
            .is_ok_and(|other| self.value.abs_diff_eq(&other, epsilon))
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Quantity {
    fn default_max_relative() -> Self::Epsilon {
        <f64 as RelativeEq>::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        other
            .value_in(&self.unit)
            .is_ok_and(|other| self.value.relative_eq(&other, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::Quantity;
    use crate::error::ErrorKind;
    use crate::units::{PhysicalType, Unit};
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, s};
    use uom::si::f64::{Length, Velocity};
    use uom::si::{length::kilometer, velocity::kilometer_per_second};

    fn u(s: &str) -> Unit {
        s.parse().unwrap()
    }

    fn scalar(q: &Quantity) -> f64 {
        q.value().iter().copied().next().unwrap()
    }

    #[test]
    fn add_converts_into_lhs_unit() {
        let a = Quantity::from_vec(vec![1., 2.], u("m"));
        let b = Quantity::scalar(1., u("km"));
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.unit(), &u("m"));
        assert_eq!(sum.value(), &arr1(&[1001., 1002.]).into_dyn());
    }

    #[test]
    fn add_across_physical_types_fails() {
        let a = Quantity::scalar(1., u("m"));
        let b = Quantity::scalar(1., u("s"));
        assert_eq!(a.checked_add(&b).unwrap_err().kind(), ErrorKind::Unit);
    }

    #[test]
    fn mul_and_div_compose_units() {
        let d = Quantity::scalar(10., u("km"));
        let t = Quantity::scalar(2., u("s"));
        let v = d.checked_div(&t).unwrap();
        assert_eq!(v.physical_type(), PhysicalType::SPEED);
        assert_eq!(v.unit().to_string(), "km / s");
        assert_eq!(scalar(&v), 5.);
        let back = v.checked_mul(&t).unwrap();
        assert_eq!(back.unit(), &u("km"));
    }

    #[test]
    fn unit_exponent_overflow_is_a_unit_error() {
        let big = Quantity::scalar(2., u("m^100"));
        assert_eq!(big.checked_mul(&big).unwrap_err().kind(), ErrorKind::Unit);
        let small = Quantity::scalar(2., u("m^-100"));
        assert_eq!(small.checked_div(&big).unwrap_err().kind(), ErrorKind::Unit);
        assert_eq!(big.checked_div(&big).unwrap().unit(), &Unit::dimensionless());
    }

    #[test]
    fn broadcasting_mismatch_is_a_shape_error() {
        let a = Quantity::from_vec(vec![1., 2.], u("m"));
        let b = Quantity::from_vec(vec![1., 2., 3.], u("m"));
        assert_eq!(a.checked_sub(&b).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn unit_conversion() {
        let a = Quantity::scalar(1.5, u("km"));
        assert_relative_eq!(scalar(&a.to_units(&u("m")).unwrap()), 1500.);
        assert_relative_eq!(a, Quantity::scalar(1500., u("m")));
        assert!(a.to_units(&u("deg")).is_err());
    }

    #[test]
    fn stacking_broadcasts_and_converts() {
        let x = Quantity::from_vec(vec![1., 2.], u("m"));
        let y = Quantity::scalar(1., u("km"));
        let stacked = Quantity::stack(&[&x, &y]).unwrap();
        assert_eq!(stacked.shape(), &[2, 2]);
        assert_eq!(
            stacked.value(),
            &arr2(&[[1., 1000.], [2., 1000.]]).into_dyn()
        );
        assert_eq!(stacked.index_last(1).value(), &arr1(&[1000., 1000.]).into_dyn());
    }

    #[test]
    fn reshape_and_slice() {
        let q = Quantity::from_vec((0..6).map(f64::from).collect(), u("s"));
        let r = q.reshape(&[2, 3]).unwrap();
        assert_eq!(r.shape(), &[2, 3]);
        assert_eq!(r.slice(s![1, ..].as_ref()).value(), &arr1(&[3., 4., 5.]).into_dyn());
        assert_eq!(q.reshape(&[4]).unwrap_err().kind(), ErrorKind::Shape);
        assert_eq!(r.flatten(), q);
    }

    #[test]
    fn from_uom() {
        let l: Quantity = Length::new::<kilometer>(2.).into();
        assert_eq!(l.unit(), &u("m"));
        assert_relative_eq!(scalar(&l), 2000.);
        let v: Quantity = Velocity::new::<kilometer_per_second>(1.).into();
        assert_eq!(v.physical_type(), PhysicalType::SPEED);
        assert_relative_eq!(scalar(&v), 1000.);
    }

    #[test]
    fn negation_and_scaling() {
        let q = Quantity::from_vec(vec![1., -2.], u("m"));
        assert_eq!((-&q).value(), &arr1(&[-1., 2.]).into_dyn());
        assert_eq!((q * 2.).value(), &arr1(&[2., -4.]).into_dyn());
    }
}

//! Batched, unit-aware vectors in many coordinate representations, and the machinery to move
//! between them.
//!
//! Every vector in this crate is a _batched record_: a fixed set of named components, each a
//! [`Quantity`] (an `f64` array with a unit attached), which broadcast together to a common
//! batch shape. A single [`SphericalVector`] can therefore hold one point or a whole grid of
//! them, and each component carries its own unit (`r` in kpc next to `theta` in degrees is
//! fine).
//!
//! Positions implement [`AbstractVector`], and their rates of change implement
//! [`AbstractVectorDifferential`]. The classes come in four dimensionalities:
//!
//! | | positions | differentials |
//! |---|---|---|
//! | 1-D | [`Cartesian1DVector`], [`RadialVector`] | [`CartesianDifferential1D`], [`RadialDifferential`] |
//! | 2-D | [`Cartesian2DVector`], [`PolarVector`] | [`CartesianDifferential2D`], [`PolarDifferential`] |
//! | 3-D | [`Cartesian3DVector`], [`SphericalVector`], [`CylindricalVector`] | [`CartesianDifferential3D`], [`SphericalDifferential`], [`CylindricalDifferential`] |
//! | N-D | [`CartesianNDVector`] | [`CartesianDifferentialND`] |
//!
//! Converting between representations of the same dimensionality goes through
//! `represent_as`, which resolves a rule in the [`TransformTable`]. Differentials need to know
//! _where_ they are evaluated, so their `represent_as` also takes a position:
//!
//! ```
//! use coordinax::{
//!     AbstractVectorDifferential, CartesianDifferential3D, Quantity, SphericalDifferential,
//!     SphericalVector,
//! };
//!
//! let deg = "deg".parse().unwrap();
//! let at = SphericalVector::new(
//!     Quantity::scalar(8., "kpc".parse().unwrap()),
//!     Quantity::scalar(90., deg),
//!     Quantity::scalar(0., "rad".parse().unwrap()),
//! )?;
//!
//! // moving straight outwards along the x axis
//! let velocity = SphericalDifferential::new(
//!     Quantity::scalar(220., "km / s".parse().unwrap()),
//!     Quantity::scalar(0., "rad / s".parse().unwrap()),
//!     Quantity::scalar(0., "rad / s".parse().unwrap()),
//! )?;
//!
//! let cartesian: CartesianDifferential3D = velocity.represent_as(&at)?;
//! assert!((cartesian.d_x().value().sum() - 220.).abs() < 1e-9);
//! assert!(cartesian.d_z().value().sum().abs() < 1e-9);
//! # Ok::<(), coordinax::Error>(())
//! ```
//!
//! Asking for a representation of a different dimensionality is an [`Error`] of kind
//! [`ErrorKind::Dispatch`], never a silent projection.

#[macro_use]
mod macros;

mod base;
mod d1;
mod d2;
mod d3;
mod differentials;
mod dn;
mod error;
mod quantity;
mod transform;
mod util;
mod vectors;

pub mod kinds;
pub mod units;

#[cfg(test)]
mod testing;

pub use base::{ComponentMap, ToUnits, ToUnitsOptions, VectorBase};
pub use d1::{Cartesian1DVector, CartesianDifferential1D, RadialDifferential, RadialVector};
pub use d2::{Cartesian2DVector, CartesianDifferential2D, PolarDifferential, PolarVector};
pub use d3::{
    Cartesian3DVector, CartesianDifferential3D, CylindricalDifferential, CylindricalVector,
    SphericalDifferential, SphericalVector,
};
pub use differentials::{AbstractVectorDifferential, AnyDifferential};
pub use dn::{CartesianDifferentialND, CartesianNDVector};
pub use error::{Error, ErrorKind};
pub use kinds::{differential_classes, Kind};
pub use quantity::Quantity;
pub use transform::{Route, TransformTable};
pub use units::{PhysicalType, Unit, UnitSystem};
pub use util::{DType, Device};
pub use vectors::{AbstractVector, AnyVector, CartesianBase, SupportsAddition};

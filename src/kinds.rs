//! Runtime identity of every representation class.
//!
//! The static side of the class hierarchy lives in associated types (`Cartesian`,
//! `Differential`, `Integral`). The same relationships are mirrored here as plain data so that
//! the transform engine can route between classes it only knows at runtime.

use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;

/// One variant per concrete vector or differential class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Cartesian1D,
    Radial,
    Cartesian2D,
    Polar,
    Cartesian3D,
    Spherical,
    Cylindrical,
    CartesianND,
    CartesianDifferential1D,
    RadialDifferential,
    CartesianDifferential2D,
    PolarDifferential,
    CartesianDifferential3D,
    SphericalDifferential,
    CylindricalDifferential,
    CartesianDifferentialND,
}

/// Number of spatial dimensions a class describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    One,
    Two,
    Three,
    /// Any number of dimensions, fixed per instance by the length of its feature axis.
    N,
}

impl Kind {
    pub const ALL: [Kind; 16] = [
        Kind::Cartesian1D,
        Kind::Radial,
        Kind::Cartesian2D,
        Kind::Polar,
        Kind::Cartesian3D,
        Kind::Spherical,
        Kind::Cylindrical,
        Kind::CartesianND,
        Kind::CartesianDifferential1D,
        Kind::RadialDifferential,
        Kind::CartesianDifferential2D,
        Kind::PolarDifferential,
        Kind::CartesianDifferential3D,
        Kind::SphericalDifferential,
        Kind::CylindricalDifferential,
        Kind::CartesianDifferentialND,
    ];

    #[must_use]
    pub fn is_differential(self) -> bool {
        self.integral().is_some()
    }

    #[must_use]
    pub fn is_cartesian(self) -> bool {
        self.cartesian() == self
    }

    /// The Cartesian class of the same dimensionality and role.
    #[must_use]
    pub fn cartesian(self) -> Kind {
        use Kind::*;
        match self {
            Cartesian1D | Radial => Cartesian1D,
            Cartesian2D | Polar => Cartesian2D,
            Cartesian3D | Spherical | Cylindrical => Cartesian3D,
            CartesianND => CartesianND,
            CartesianDifferential1D | RadialDifferential => CartesianDifferential1D,
            CartesianDifferential2D | PolarDifferential => CartesianDifferential2D,
            CartesianDifferential3D | SphericalDifferential | CylindricalDifferential => {
                CartesianDifferential3D
            }
            CartesianDifferentialND => CartesianDifferentialND,
        }
    }

    /// The differential class of a position, or `None` for differentials.
    #[must_use]
    pub fn differential(self) -> Option<Kind> {
        use Kind::*;
        Some(match self {
            Cartesian1D => CartesianDifferential1D,
            Radial => RadialDifferential,
            Cartesian2D => CartesianDifferential2D,
            Polar => PolarDifferential,
            Cartesian3D => CartesianDifferential3D,
            Spherical => SphericalDifferential,
            Cylindrical => CylindricalDifferential,
            CartesianND => CartesianDifferentialND,
            _ => return None,
        })
    }

    /// The position class a differential integrates to, or `None` for positions.
    #[must_use]
    pub fn integral(self) -> Option<Kind> {
        Kind::ALL
            .into_iter()
            .find(|position| position.differential() == Some(self))
    }

    #[must_use]
    pub fn dimensionality(self) -> Dimensionality {
        match self.integral().unwrap_or(self).cartesian() {
            Kind::Cartesian1D => Dimensionality::One,
            Kind::Cartesian2D => Dimensionality::Two,
            Kind::Cartesian3D => Dimensionality::Three,
            _ => Dimensionality::N,
        }
    }

    /// Name of the Rust type implementing this class.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        use Kind::*;
        match self {
            Cartesian1D => "Cartesian1DVector",
            Radial => "RadialVector",
            Cartesian2D => "Cartesian2DVector",
            Polar => "PolarVector",
            Cartesian3D => "Cartesian3DVector",
            Spherical => "SphericalVector",
            Cylindrical => "CylindricalVector",
            CartesianND => "CartesianNDVector",
            CartesianDifferential1D => "CartesianDifferential1D",
            RadialDifferential => "RadialDifferential",
            CartesianDifferential2D => "CartesianDifferential2D",
            PolarDifferential => "PolarDifferential",
            CartesianDifferential3D => "CartesianDifferential3D",
            SphericalDifferential => "SphericalDifferential",
            CylindricalDifferential => "CylindricalDifferential",
            CartesianDifferentialND => "CartesianDifferentialND",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

static DIFFERENTIAL_CLASSES: LazyLock<Vec<Kind>> = LazyLock::new(|| {
    let mut registry = DifferentialRegistry(Vec::new());
    crate::d1::register_differentials(&mut registry);
    crate::d2::register_differentials(&mut registry);
    crate::d3::register_differentials(&mut registry);
    crate::dn::register_differentials(&mut registry);
    registry.0
});

/// Collects differential classes as each dimensionality module registers them.
pub(crate) struct DifferentialRegistry(Vec<Kind>);

impl DifferentialRegistry {
    pub(crate) fn register(&mut self, kind: Kind) {
        debug_assert!(kind.is_differential());
        if !self.0.contains(&kind) {
            tracing::trace!(%kind, "registered differential class");
            self.0.push(kind);
        }
    }
}

/// Every differential class known to the crate, in registration order.
///
/// The registry is filled once, on first access, by each dimensionality module.
#[must_use]
pub fn differential_classes() -> &'static [Kind] {
    &DIFFERENTIAL_CLASSES
}

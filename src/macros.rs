/// Declares a concrete representation class: a struct of named [`Quantity`](crate::Quantity)
/// components together with everything that follows mechanically from its component list.
///
/// ```rust,ignore
/// representation! {
///     /// Docs for the class.
///     pub struct PolarVector as Polar in AnyVector {
///         /// Radial distance.
///         r,
///         /// Azimuthal angle.
///         phi,
///     }
/// }
/// ```
///
/// `Polar` names the [`Kind`](crate::Kind) variant (and the matching variant of the `in` enum).
/// An optional trailing `overrides { ... }` block is spliced into the
/// [`VectorBase`](crate::VectorBase) impl, for classes whose shape semantics differ from the
/// default broadcast-of-components. Arithmetic comes separately from `linear_ops!`.
macro_rules! representation {
    {
        $(#[$attr:meta])*
        pub struct $name:ident as $kind:ident in $any:ident {
            $( $(#[$fattr:meta])* $field:ident ),+ $(,)?
        }
        $( overrides { $($overrides:tt)* } )?
    } => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $( $field: crate::Quantity, )+
        }

        impl $name {
            /// Constructs from components, which must broadcast against each other.
            pub fn new($($field: crate::Quantity),+) -> Result<Self, crate::Error> {
                <Self as crate::VectorBase>::from_components(vec![$($field),+])
            }

            $(
                $(#[$fattr])*
                #[must_use]
                pub fn $field(&self) -> &crate::Quantity {
                    &self.$field
                }
            )+
        }

        impl crate::VectorBase for $name {
            const KIND: crate::Kind = crate::Kind::$kind;
            const COMPONENTS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn components_ref(&self) -> Vec<&crate::Quantity> {
                vec![$(&self.$field),+]
            }

            fn into_components(self) -> Vec<crate::Quantity> {
                vec![$(self.$field),+]
            }

            fn from_components_unchecked(components: Vec<crate::Quantity>) -> Self {
                let mut components = components.into_iter();
                Self {
                    $(
                        $field: components.next().unwrap_or_else(|| {
                            crate::Quantity::scalar(f64::NAN, crate::Unit::dimensionless())
                        }),
                    )+
                }
            }

            $( $($overrides)* )?
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                crate::base::fmt_vector(self, f)
            }
        }

        impl From<$name> for crate::$any {
            fn from(v: $name) -> Self {
                Self::$kind(v)
            }
        }

        impl TryFrom<crate::$any> for $name {
            type Error = crate::Error;

            fn try_from(any: crate::$any) -> Result<Self, Self::Error> {
                match any {
                    crate::$any::$kind(v) => Ok(v),
                    other => Err(crate::Error::KindMismatch {
                        expected: crate::Kind::$kind,
                        found: other.kind(),
                    }),
                }
            }
        }

        #[cfg(any(test, feature = "approx"))]
        impl approx::AbsDiffEq for $name {
            type Epsilon = f64;

            fn default_epsilon() -> f64 {
                <f64 as approx::AbsDiffEq>::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
                $( approx::AbsDiffEq::abs_diff_eq(&self.$field, &other.$field, epsilon) )&&+
            }
        }

        #[cfg(any(test, feature = "approx"))]
        impl approx::RelativeEq for $name {
            fn default_max_relative() -> f64 {
                <f64 as approx::RelativeEq>::default_max_relative()
            }

            fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
                $(
                    approx::RelativeEq::relative_eq(
                        &self.$field,
                        &other.$field,
                        epsilon,
                        max_relative,
                    )
                )&&+
            }
        }
    };
}

/// Implements `Neg` and `Mul<f64>` component-wise.
///
/// Only valid where every component is linear in the vector: Cartesian positions and all
/// differentials. Scaling the angle of a curvilinear position is not scaling the position.
macro_rules! linear_ops {
    ($($name:ident),+ $(,)?) => {
        $(
            impl std::ops::Neg for $name {
                type Output = Self;

                fn neg(self) -> Self {
                    -&self
                }
            }

            impl std::ops::Neg for &$name {
                type Output = $name;

                fn neg(self) -> $name {
                    <$name as crate::VectorBase>::map_components(self, |c| -c)
                }
            }

            impl std::ops::Mul<f64> for $name {
                type Output = Self;

                fn mul(self, rhs: f64) -> Self {
                    <Self as crate::VectorBase>::map_components(&self, |c| c * rhs)
                }
            }
        )+
    };
}

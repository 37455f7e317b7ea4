//! N-dimensional Cartesian vectors.
//!
//! Unlike the fixed-dimensional classes these keep a single stacked quantity whose trailing
//! axis enumerates the coordinates, so the number of dimensions is a property of the data
//! rather than of the class. Every shape operation acts on the batch axes in front of it.

use crate::base::VectorBase;
use crate::differentials::AbstractVectorDifferential;
use crate::error::Error;
use crate::kinds::{DifferentialRegistry, Kind};
use crate::quantity::Quantity;
use crate::transform::TransformTable;
use crate::util::check_index;
use crate::vectors::{AbstractVector, CartesianBase, SupportsAddition};
use ndarray::{ArrayD, SliceInfoElem};

/// Shape-operation overrides shared by both stacked classes, written against the single
/// component held by `$field`.
macro_rules! stacked_overrides {
    ($field:ident) => {
        fn from_components(components: Vec<Quantity>) -> Result<Self, Error> {
            if !matches!(components.as_slice(), [stacked] if stacked.ndim() >= 1) {
                return Err(Error::StackedShape {
                    target: Self::KIND.type_name(),
                    shape: components
                        .first()
                        .map(|c| c.shape().to_vec())
                        .unwrap_or_default(),
                    expected: 1,
                });
            }
            Ok(Self::from_components_unchecked(components))
        }

        fn shape(&self) -> Vec<usize> {
            let shape = self.$field.shape();
            shape[..shape.len().saturating_sub(1)].to_vec()
        }

        fn full_shaped(&self) -> Self {
            self.clone()
        }

        fn stacked_values(&self) -> ArrayD<f64> {
            self.$field.value().clone()
        }

        fn get(&self, index: &[SliceInfoElem]) -> Result<Self, Error> {
            check_index(&self.shape(), index)?;
            Ok(Self {
                $field: self.$field.slice(index),
            })
        }

        fn flatten(&self) -> Self {
            let features = self.$field.shape().last().copied().unwrap_or(1);
            // batch size times features is the element count, so the reshape cannot fail
            let flat = self.$field.reshape(&[self.size(), features]);
            debug_assert!(flat.is_ok(), "flattening {:?}", self.$field.shape());
            Self {
                $field: flat.unwrap_or_else(|_| self.$field.clone()),
            }
        }

        fn reshape(&self, shape: &[usize]) -> Result<Self, Error> {
            let features = self.$field.shape().last().copied().unwrap_or(1);
            let mut target = shape.to_vec();
            target.push(features);
            Ok(Self {
                $field: self.$field.reshape(&target).map_err(|_| Error::Reshape {
                    size: self.size(),
                    shape: shape.to_vec(),
                })?,
            })
        }

        /// Swaps the first two batch axes; with fewer than two this is the identity.
        fn transpose(&self) -> Self {
            let mut axes: Vec<usize> = (0..self.$field.ndim()).collect();
            if self.ndim() >= 2 {
                axes.swap(0, 1);
            }
            Self {
                $field: self.$field.permuted(&axes),
            }
        }

        fn matrix_transpose(&self) -> Result<Self, Error> {
            let ndim = self.ndim();
            if ndim < 2 {
                return Err(Error::MatrixTranspose { ndim });
            }
            let mut axes: Vec<usize> = (0..=ndim).collect();
            axes.swap(ndim - 2, ndim - 1);
            Ok(Self {
                $field: self.$field.permuted(&axes),
            })
        }

        fn from_stacked(stacked: &Quantity) -> Result<Self, Error> {
            Self::from_components(vec![stacked.clone()])
        }
    };
}

representation! {
    /// A Cartesian position in any number of dimensions.
    ///
    /// ```
    /// use coordinax::{CartesianNDVector, Quantity, VectorBase};
    /// use ndarray::Array;
    ///
    /// let q = Array::from_shape_vec((2, 4), (0..8).map(f64::from).collect()).unwrap();
    /// let v = CartesianNDVector::new(Quantity::new(q, "m".parse().unwrap())).unwrap();
    /// assert_eq!(v.shape(), vec![2]);
    /// assert_eq!(v.q().shape(), &[2, 4]);
    /// ```
    pub struct CartesianNDVector as CartesianND in AnyVector {
        /// Coordinates, enumerated along the trailing axis.
        q,
    }
    overrides {
        stacked_overrides!(q);
    }
}

representation! {
    pub struct CartesianDifferentialND as CartesianDifferentialND in AnyDifferential {
        d_q,
    }
    overrides {
        stacked_overrides!(d_q);
    }
}

linear_ops!(CartesianNDVector, CartesianDifferentialND);

impl AbstractVector for CartesianNDVector {
    type Cartesian = Self;
    type Differential = CartesianDifferentialND;
}

impl AbstractVectorDifferential for CartesianDifferentialND {
    type Cartesian = Self;
    type Integral = CartesianNDVector;
}

impl SupportsAddition for CartesianNDVector {}
impl SupportsAddition for CartesianDifferentialND {}

impl CartesianBase for CartesianNDVector {
    fn to_quantity(&self) -> Result<Quantity, Error> {
        Ok(self.q.clone())
    }
}

impl CartesianBase for CartesianDifferentialND {
    fn to_quantity(&self) -> Result<Quantity, Error> {
        Ok(self.d_q.clone())
    }
}

/// There is only one N-dimensional class, so the identity is the only transform.
pub(crate) fn register(_table: &mut TransformTable) {}

pub(crate) fn register_differentials(registry: &mut DifferentialRegistry) {
    registry.register(Kind::CartesianDifferentialND);
}

//! Batched-record semantics shared by every vector and differential.
//!
//! A concrete class is a fixed, ordered set of named [`Quantity`] components which broadcast to
//! a common shape. Everything in [`VectorBase`] is written purely in terms of those components,
//! so a class only has to say how to take itself apart and put itself back together.

use crate::error::Error;
use crate::kinds::Kind;
use crate::quantity::Quantity;
use crate::units::{PhysicalType, Unit, UnitSystem};
use crate::util::{broadcast_shapes, check_index, stack_arrays, DType, Device};
use ndarray::{ArrayD, IxDyn, SliceInfoElem};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::ops::{Index, Mul};

/// An ordered name→value mapping with one entry per component, in declared order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentMap<T>(Vec<(&'static str, T)>);

impl<T> ComponentMap<T> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(n, _)| *n)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter().map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Index<&str> for ComponentMap<T> {
    type Output = T;

    /// # Panics
    ///
    /// If there is no component called `name`.
    fn index(&self, name: &str) -> &T {
        match self.get(name) {
            Some(v) => v,
            None => panic!("no component named '{name}'"),
        }
    }
}

impl<T> IntoIterator for ComponentMap<T> {
    type Item = (&'static str, T);
    type IntoIter = std::vec::IntoIter<(&'static str, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T> FromIterator<(&'static str, T)> for ComponentMap<T> {
    fn from_iter<I: IntoIterator<Item = (&'static str, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Options for [`VectorBase::to_units`] that are not themselves a set of units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToUnitsOptions {
    /// Every component is converted to the first unit seen for its physical type, in declared
    /// component order.
    Consistent,
}

/// What [`VectorBase::to_units`] should convert to.
///
/// Usually built through one of the `From` impls:
///
/// ```
/// use coordinax::{Cartesian2DVector, Quantity, ToUnitsOptions, Unit, VectorBase};
///
/// let m: Unit = "m".parse().unwrap();
/// let km: Unit = "km".parse().unwrap();
/// let v = Cartesian2DVector::new(Quantity::scalar(1., m.clone()), Quantity::scalar(2., km)).unwrap();
/// let v = v.to_units(ToUnitsOptions::Consistent).unwrap();
/// assert_eq!(v.y().unit(), &m);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ToUnits {
    System(UnitSystem),
    Mapping(HashMap<PhysicalType, Unit>),
    Consistent,
}

impl ToUnits {
    /// Builds a mapping from physical-type names to unit strings, e.g. `("length", "km")`.
    pub fn from_names<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, Error> {
        entries
            .into_iter()
            .map(|(pt, unit)| Ok((pt.parse::<PhysicalType>()?, Unit::parse(unit)?)))
            .collect::<Result<HashMap<_, _>, Error>>()
            .map(Self::Mapping)
    }
}

impl From<UnitSystem> for ToUnits {
    fn from(system: UnitSystem) -> Self {
        Self::System(system)
    }
}

impl From<&UnitSystem> for ToUnits {
    fn from(system: &UnitSystem) -> Self {
        Self::System(system.clone())
    }
}

impl From<HashMap<PhysicalType, Unit>> for ToUnits {
    fn from(mapping: HashMap<PhysicalType, Unit>) -> Self {
        Self::Mapping(mapping)
    }
}

impl<const N: usize> From<[(PhysicalType, Unit); N]> for ToUnits {
    fn from(mapping: [(PhysicalType, Unit); N]) -> Self {
        Self::Mapping(mapping.into_iter().collect())
    }
}

impl From<ToUnitsOptions> for ToUnits {
    fn from(option: ToUnitsOptions) -> Self {
        match option {
            ToUnitsOptions::Consistent => Self::Consistent,
        }
    }
}

/// Array-collection behavior of a batched record of named [`Quantity`] components.
///
/// Every operation either inspects the components or rebuilds the same class from transformed
/// components. Instances are never mutated in place.
pub trait VectorBase: Clone + Debug + Sized {
    /// The runtime identity of this class.
    const KIND: Kind;

    /// Declared component names, in order.
    const COMPONENTS: &'static [&'static str];

    fn components_ref(&self) -> Vec<&Quantity>;

    fn into_components(self) -> Vec<Quantity>;

    /// Rebuilds the class from components in declared order without checking their shapes.
    ///
    /// The components must broadcast against each other. Every shape operation relies on it,
    /// and every public constructor checks it before calling this.
    #[doc(hidden)]
    fn from_components_unchecked(components: Vec<Quantity>) -> Self;

    /// Declared component names, in order.
    #[must_use]
    fn components() -> &'static [&'static str] {
        Self::COMPONENTS
    }

    /// Rebuilds the class from components in declared order, checking that they broadcast.
    fn from_components(components: Vec<Quantity>) -> Result<Self, Error> {
        if components.len() != Self::COMPONENTS.len() {
            return Err(Error::StackedShape {
                target: Self::KIND.type_name(),
                shape: vec![components.len()],
                expected: Self::COMPONENTS.len(),
            });
        }
        broadcast_shapes(components.iter().map(Quantity::shape))?;
        Ok(Self::from_components_unchecked(components))
    }

    /// The broadcast shape of all components.
    ///
    /// Infallible because construction only succeeds for components that broadcast, and every
    /// shape operation maps broadcastable components to broadcastable components.
    #[must_use]
    fn shape(&self) -> Vec<usize> {
        let shape = broadcast_shapes(self.components_ref().into_iter().map(Quantity::shape));
        debug_assert!(shape.is_ok(), "components of {} do not broadcast", Self::KIND);
        shape.unwrap_or_default()
    }

    #[must_use]
    fn ndim(&self) -> usize {
        self.shape().len()
    }

    #[must_use]
    fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Materializes every component at the broadcast shape.
    #[must_use]
    fn full_shaped(&self) -> Self {
        let shape = self.shape();
        // each component broadcasts to the shape it contributed to
        self.map_components(|c| {
            let full = c.broadcast_to(&shape);
            debug_assert!(full.is_ok(), "{} component does not broadcast", Self::KIND);
            full.unwrap_or_else(|_| c.clone())
        })
    }

    /// Component values in their own units, broadcast and stacked along a trailing axis.
    #[must_use]
    fn stacked_values(&self) -> ArrayD<f64> {
        let values: Vec<&ArrayD<f64>> =
            self.components_ref().into_iter().map(Quantity::value).collect();
        let stacked = stack_arrays(&values);
        debug_assert!(stacked.is_ok(), "components of {} do not broadcast", Self::KIND);
        stacked.unwrap_or_else(|_| ArrayD::zeros(IxDyn(&[0])))
    }

    #[must_use]
    fn units(&self) -> ComponentMap<Unit> {
        self.component_map(|c| c.unit().clone())
    }

    #[must_use]
    fn dtypes(&self) -> ComponentMap<DType> {
        self.component_map(Quantity::dtype)
    }

    #[must_use]
    fn devices(&self) -> ComponentMap<Device> {
        self.component_map(Quantity::device)
    }

    #[must_use]
    fn shapes(&self) -> ComponentMap<Vec<usize>> {
        self.component_map(|c| c.shape().to_vec())
    }

    #[must_use]
    fn sizes(&self) -> ComponentMap<usize> {
        self.component_map(Quantity::size)
    }

    #[must_use]
    fn asdict(&self) -> ComponentMap<Quantity> {
        self.component_map(Quantity::clone)
    }

    #[doc(hidden)]
    fn component_map<T>(&self, f: impl Fn(&Quantity) -> T) -> ComponentMap<T> {
        Self::COMPONENTS
            .iter()
            .copied()
            .zip(self.components_ref().into_iter().map(f))
            .collect()
    }

    /// Applies `f` to every component and rebuilds the same class.
    #[must_use]
    fn map_components(&self, f: impl FnMut(&Quantity) -> Quantity) -> Self {
        Self::from_components_unchecked(self.components_ref().into_iter().map(f).collect())
    }

    fn try_map_components(
        &self,
        f: impl FnMut(&Quantity) -> Result<Quantity, Error>,
    ) -> Result<Self, Error> {
        self.components_ref()
            .into_iter()
            .map(f)
            .collect::<Result<Vec<_>, _>>()
            .and_then(Self::from_components)
    }

    /// Indexes the batch axes of every component.
    ///
    /// ```
    /// use coordinax::{Cartesian1DVector, Quantity, VectorBase};
    /// use ndarray::s;
    ///
    /// let v = Cartesian1DVector::new(Quantity::from_vec(vec![1., 2., 3.], "m".parse().unwrap())).unwrap();
    /// assert_eq!(v.get(s![1..].as_ref()).unwrap().shape(), vec![2]);
    /// assert!(v.get(s![3].as_ref()).is_err());
    /// ```
    fn get(&self, index: &[SliceInfoElem]) -> Result<Self, Error> {
        let full = self.full_shaped();
        check_index(&full.shape(), index)?;
        Ok(full.map_components(|c| c.slice(index)))
    }

    #[must_use]
    fn flatten(&self) -> Self {
        self.full_shaped().map_components(Quantity::flatten)
    }

    fn reshape(&self, shape: &[usize]) -> Result<Self, Error> {
        self.full_shaped().try_map_components(|c| c.reshape(shape))
    }

    /// Reverses the order of the batch axes.
    #[must_use]
    fn transpose(&self) -> Self {
        let axes: Vec<usize> = (0..self.ndim()).rev().collect();
        self.full_shaped().map_components(|c| c.permuted(&axes))
    }

    /// Swaps the last two batch axes.
    fn matrix_transpose(&self) -> Result<Self, Error> {
        let ndim = self.ndim();
        if ndim < 2 {
            return Err(Error::MatrixTranspose { ndim });
        }
        let mut axes: Vec<usize> = (0..ndim).collect();
        axes.swap(ndim - 2, ndim - 1);
        Ok(self.full_shaped().map_components(|c| c.permuted(&axes)))
    }

    #[must_use]
    fn to_device(self, device: Device) -> Self {
        Self::from_components_unchecked(
            self.into_components()
                .into_iter()
                .map(|c| c.to_device(device))
                .collect(),
        )
    }

    /// Converts every component according to `units`.
    ///
    /// Fails with a key error if a mapping or unit system has no unit for one of the components'
    /// physical types.
    fn to_units(&self, units: impl Into<ToUnits>) -> Result<Self, Error> {
        let units = units.into();
        let mut seen: Vec<(PhysicalType, Unit)> = Vec::new();
        let mut converted = Vec::with_capacity(Self::COMPONENTS.len());
        for component in self.components_ref() {
            let physical_type = component.physical_type();
            let target = match &units {
                ToUnits::System(system) => system.get(physical_type)?,
                ToUnits::Mapping(mapping) => mapping
                    .get(&physical_type)
                    .cloned()
                    .ok_or(Error::MissingPhysicalType(physical_type))?,
                ToUnits::Consistent => {
                    match seen.iter().find(|(pt, _)| *pt == physical_type) {
                        Some((_, unit)) => unit.clone(),
                        None => {
                            seen.push((physical_type, component.unit().clone()));
                            component.unit().clone()
                        }
                    }
                }
            };
            converted.push(component.to_units(&target)?);
        }
        Ok(Self::from_components_unchecked(converted))
    }

    /// Builds the class from a name→quantity mapping holding exactly its components.
    fn from_mapping<S: AsRef<str>>(
        mapping: impl IntoIterator<Item = (S, Quantity)>,
    ) -> Result<Self, Error> {
        let mut slots: Vec<Option<Quantity>> = vec![None; Self::COMPONENTS.len()];
        for (name, quantity) in mapping {
            let name = name.as_ref();
            let at = Self::COMPONENTS
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| Error::UnexpectedComponent {
                    target: Self::KIND.type_name(),
                    component: name.to_owned(),
                })?;
            slots[at] = Some(quantity);
        }
        let components = Self::COMPONENTS
            .iter()
            .zip(slots)
            .map(|(&name, slot)| {
                slot.ok_or(Error::MissingComponent {
                    target: Self::KIND.type_name(),
                    component: name,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_components(components)
    }

    /// Builds the class from a quantity whose trailing axis enumerates the components in
    /// declared order.
    fn from_stacked(stacked: &Quantity) -> Result<Self, Error> {
        let n = Self::COMPONENTS.len();
        if stacked.shape().last() != Some(&n) {
            return Err(Error::StackedShape {
                target: Self::KIND.type_name(),
                shape: stacked.shape().to_vec(),
                expected: n,
            });
        }
        Ok(Self::from_components_unchecked(
            (0..n).map(|i| stacked.index_last(i)).collect(),
        ))
    }

    /// Copy-constructs from another vector of the very same class.
    ///
    /// The components are moved, not copied. Any other class is a type error; use
    /// `represent_as` to change representation.
    fn from_vector<V: VectorBase>(other: V) -> Result<Self, Error> {
        if V::KIND != Self::KIND {
            return Err(Error::Construct {
                target: Self::KIND,
                found: V::KIND,
            });
        }
        Ok(Self::from_components_unchecked(other.into_components()))
    }

    /// Multiplies the vector by `factor`. Curvilinear positions have no such operation.
    #[must_use]
    fn scale(&self, factor: f64) -> Self
    where
        Self: Mul<f64, Output = Self>,
    {
        self.clone() * factor
    }
}

/// Writes `<ClassName (c1[u1], c2[u2])\n    values>`.
pub(crate) fn fmt_vector<V: VectorBase>(v: &V, f: &mut Formatter<'_>) -> fmt::Result {
    const INDENT: &str = "    ";
    let fields: Vec<String> = v
        .units()
        .iter()
        .map(|(name, unit)| format!("{name}[{unit}]"))
        .collect();
    write!(
        f,
        "<{} ({})\n{INDENT}{}>",
        V::KIND,
        fields.join(", "),
        crate::util::format_array(&v.stacked_values(), INDENT)
    )
}

#[cfg(test)]
mod tests {
    use super::{ToUnits, ToUnitsOptions, VectorBase};
    use crate::d2::PolarVector;
    use crate::d3::Cartesian3DVector;
    use crate::error::ErrorKind;
    use crate::quantity::Quantity;
    use crate::units::{PhysicalType, Unit, UnitSystem};
    use crate::util::{DType, Device};
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, s, Array, IxDyn};
    use rstest::rstest;

    fn u(s: &str) -> Unit {
        s.parse().unwrap()
    }

    fn grid() -> Cartesian3DVector {
        // x varies along the last axis, y is a scalar, z is full-shaped
        let z = Array::from_shape_vec(IxDyn(&[2, 3]), (0..6).map(f64::from).collect()).unwrap();
        Cartesian3DVector::new(
            Quantity::new(arr1(&[1., 2., 3.]), u("m")),
            Quantity::scalar(5., u("km")),
            Quantity::new(z, u("m")),
        )
        .unwrap()
    }

    #[test]
    fn shape_is_broadcast_of_components() {
        let v = grid();
        assert_eq!(v.shape(), vec![2, 3]);
        assert_eq!(v.ndim(), 2);
        assert_eq!(v.size(), 6);
        assert_eq!(v.shapes()["x"], vec![3]);
        assert_eq!(v.shapes()["y"], Vec::<usize>::new());
        assert_eq!(v.sizes()["z"], 6);
        assert_eq!(v.units().keys().collect::<Vec<_>>(), ["x", "y", "z"]);
        assert!(v.devices().values().all(|d| *d == Device::Cpu));
    }

    #[test]
    fn dtypes_and_asdict() {
        let v = grid();
        assert!(v.dtypes().values().all(|d| *d == DType::Float64));
        assert_eq!(v.dtypes()["x"].to_string(), "float64");

        let dict = v.asdict();
        assert_eq!(dict.keys().collect::<Vec<_>>(), ["x", "y", "z"]);
        assert_eq!(&dict["y"], v.y());
        assert_eq!(dict["z"].shape(), &[2, 3]);
        assert_eq!(Cartesian3DVector::from_mapping(dict).unwrap(), v);
    }

    #[test]
    fn to_device_keeps_values() {
        let v = grid();
        let moved = v.clone().to_device(Device::Cpu);
        assert_eq!(moved, v);
        assert_eq!(moved.devices()["z"].to_string(), "cpu");
    }

    #[test]
    fn shape_operations_keep_components_broadcastable() {
        let v = grid();
        let chained = v
            .transpose()
            .flatten()
            .reshape(&[3, 2])
            .unwrap()
            .matrix_transpose()
            .unwrap()
            .get(s![.., 2..].as_ref())
            .unwrap();
        assert_eq!(chained.shape(), vec![2, 1]);
        assert!(chained.shapes().values().all(|s| s == &[2, 1]));
        assert_eq!(chained.stacked_values().shape(), &[2, 1, 3]);

        let empty = v.get(s![.., 0..0].as_ref()).unwrap();
        assert_eq!(empty.shape(), vec![2, 0]);
        assert_eq!(empty.flatten().shape(), vec![0]);
    }

    #[test]
    fn construction_rejects_unbroadcastable() {
        let err = Cartesian3DVector::new(
            Quantity::from_vec(vec![1., 2.], u("m")),
            Quantity::from_vec(vec![1., 2., 3.], u("m")),
            Quantity::scalar(0., u("m")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[rstest]
    #[case(&[6])]
    #[case(&[3, 2])]
    #[case(&[1, 6, 1])]
    fn reshape_yields_requested_shape(#[case] shape: &[usize]) {
        let v = grid().reshape(shape).unwrap();
        assert_eq!(v.shape(), shape);
        assert!(v.shapes().values().all(|s| s == shape));
    }

    #[test]
    fn reshape_size_mismatch() {
        assert_eq!(grid().reshape(&[4]).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn flatten_and_transposes() {
        let v = grid();
        assert_eq!(v.flatten().shape(), vec![6]);
        let t = v.transpose();
        assert_eq!(t.shape(), vec![3, 2]);
        assert_eq!(t.z().value(), &arr2(&[[0., 3.], [1., 4.], [2., 5.]]).into_dyn());
        assert_eq!(v.matrix_transpose().unwrap().shape(), vec![3, 2]);
        assert_eq!(
            v.flatten().matrix_transpose().unwrap_err().kind(),
            ErrorKind::Shape
        );
    }

    #[test]
    fn indexing() {
        let v = grid();
        let row = v.get(s![1, ..].as_ref()).unwrap();
        assert_eq!(row.shape(), vec![3]);
        assert_eq!(row.z().value(), &arr1(&[3., 4., 5.]).into_dyn());
        assert_eq!(row.y().value(), &arr1(&[5., 5., 5.]).into_dyn());
        assert_eq!(
            v.get(s![2, ..].as_ref()).unwrap_err().kind(),
            ErrorKind::Shape
        );
    }

    #[test]
    fn consistent_units() {
        let v = Cartesian3DVector::new(
            Quantity::scalar(1., u("m")),
            Quantity::scalar(2., u("km")),
            Quantity::scalar(3., u("cm")),
        )
        .unwrap()
        .to_units(ToUnitsOptions::Consistent)
        .unwrap();
        assert!(v.units().values().all(|unit| *unit == u("m")));
        assert_relative_eq!(v.y().value().sum(), 2000.);
        assert_relative_eq!(v.z().value().sum(), 0.03);
    }

    #[test]
    fn units_from_mapping_and_system() {
        let p = PolarVector::new(Quantity::scalar(1., u("kpc")), Quantity::scalar(90., u("deg")))
            .unwrap();

        let mapped = p
            .to_units(ToUnits::from_names([("length", "pc"), ("angle", "rad")]).unwrap())
            .unwrap();
        assert_eq!(mapped.r().unit(), &u("pc"));
        assert_relative_eq!(mapped.r().value().sum(), 1000., max_relative = 1e-12);
        assert_relative_eq!(mapped.phi().value().sum(), std::f64::consts::FRAC_PI_2);

        let si = p.to_units(UnitSystem::si()).unwrap();
        assert_eq!(si.r().unit(), &u("m"));

        let missing = p.to_units([(PhysicalType::LENGTH, u("km"))]).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Key);
    }

    #[test]
    fn construction_paths_agree() {
        let from_mapping = Cartesian3DVector::from_mapping([
            ("x", Quantity::scalar(1., u("m"))),
            ("y", Quantity::scalar(2., u("m"))),
            ("z", Quantity::scalar(3., u("m"))),
        ])
        .unwrap();
        let from_stacked =
            Cartesian3DVector::from_stacked(&Quantity::from_vec(vec![1., 2., 3.], u("m"))).unwrap();
        assert_eq!(from_mapping, from_stacked);
        assert_eq!(
            Cartesian3DVector::from_vector(from_mapping.clone()).unwrap(),
            from_stacked
        );
    }

    #[test]
    fn construction_errors() {
        let bad_stack = Cartesian3DVector::from_stacked(&Quantity::from_vec(vec![1., 2.], u("m")));
        assert_eq!(bad_stack.unwrap_err().kind(), ErrorKind::Shape);

        let missing = Cartesian3DVector::from_mapping([
            ("x", Quantity::scalar(1., u("m"))),
            ("y", Quantity::scalar(2., u("m"))),
        ]);
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::Key);

        let extra = Cartesian3DVector::from_mapping([
            ("x", Quantity::scalar(1., u("m"))),
            ("y", Quantity::scalar(2., u("m"))),
            ("z", Quantity::scalar(3., u("m"))),
            ("w", Quantity::scalar(4., u("m"))),
        ]);
        assert_eq!(extra.unwrap_err().kind(), ErrorKind::Key);

        let polar =
            PolarVector::new(Quantity::scalar(1., u("m")), Quantity::scalar(0., u("rad"))).unwrap();
        assert_eq!(
            Cartesian3DVector::from_vector(polar).unwrap_err().kind(),
            ErrorKind::Type
        );
    }

    #[test]
    fn scaling_and_negation() {
        let v = Cartesian3DVector::from_stacked(&Quantity::from_vec(vec![1., -2., 3.], u("m")))
            .unwrap();
        let w = -(v.clone() * 2.);
        assert_eq!(w, v.scale(-2.));
        assert_eq!(w.y().value().sum(), 4.);
    }
}

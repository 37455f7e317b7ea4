use crate::kinds::Kind;
use crate::units::PhysicalType;
use thiserror::Error;

/// Broad category of an [`Error`].
///
/// Every error produced by this crate is a contract violation on the caller's side (bad shape,
/// bad type, missing mapping entry, or an unrepresentable transform); there are no transient
/// failures to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Shapes that do not fit: construction, broadcasting, reshaping, indexing.
    Shape,
    /// An operand or target of the wrong representation class.
    Type,
    /// A missing or unknown component, or a physical type with no unit to map to.
    Key,
    /// No route between two representations.
    Dispatch,
    /// Unit parsing and conversion, including exponents that overflow.
    Unit,
}

/// Everything that can go wrong in this crate. Use [`Error::kind`] to match on categories.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A stacked array whose trailing axis does not hold one entry per component.
    #[error("cannot construct {target} from array with shape {shape:?}: expected {expected} components along the last axis")]
    StackedShape {
        target: &'static str,
        shape: Vec<usize>,
        expected: usize,
    },

    /// Components, or operands, whose shapes do not broadcast.
    #[error("shapes {left:?} and {right:?} cannot be broadcast together")]
    Broadcast { left: Vec<usize>, right: Vec<usize> },

    #[error("cannot reshape array of size {size} into shape {shape:?}")]
    Reshape { size: usize, shape: Vec<usize> },

    /// `matrix_transpose` on fewer than two batch axes.
    #[error("matrix transpose needs at least two batch axes; got {ndim}")]
    MatrixTranspose { ndim: usize },

    #[error("index {index} is out of bounds for axis {axis} with size {len}")]
    IndexOutOfBounds { index: isize, axis: usize, len: usize },

    #[error("slice step along axis {axis} must be nonzero")]
    ZeroStep { axis: usize },

    #[error("too many indices: {given} given for {ndim} batch axes")]
    TooManyIndices { given: usize, ndim: usize },

    /// Addition or subtraction across classes, or on a class without Cartesian arithmetic.
    #[error("cannot {op} {found} and {expected}")]
    OperandType {
        op: &'static str,
        expected: Kind,
        found: Kind,
    },

    /// Copy construction from a different class, e.g. `from_vector`.
    #[error("cannot construct {target} from {found}")]
    Construct { target: Kind, found: Kind },

    /// Downcasting an `AnyVector` or `AnyDifferential` to the wrong class.
    #[error("expected a {expected}, found a {found}")]
    KindMismatch { expected: Kind, found: Kind },

    /// A unit system or mapping lacks a unit for this physical type.
    #[error("no unit for physical type '{0}'")]
    MissingPhysicalType(PhysicalType),

    #[error("missing component '{component}' for {target}")]
    MissingComponent {
        target: &'static str,
        component: &'static str,
    },

    #[error("{target} has no component named '{component}'")]
    UnexpectedComponent {
        target: &'static str,
        component: String,
    },

    /// Neither a direct rule nor a Cartesian hop connects the two classes.
    #[error("no transform from {from} to {to}")]
    Dispatch { from: Kind, to: Kind },

    /// Converting between units of different physical types.
    #[error("'{from}' ({from_type}) and '{to}' ({to_type}) are not convertible")]
    UnitConversion {
        from: String,
        from_type: PhysicalType,
        to: String,
        to_type: PhysicalType,
    },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("cannot parse unit '{unit}': {reason}")]
    UnitSyntax { unit: String, reason: &'static str },

    #[error("unknown physical type '{0}'")]
    UnknownPhysicalType(String),

    /// Two units of one physical type passed to `UnitSystem::new`.
    #[error("unit system already has a unit for physical type '{0}'")]
    DuplicateBaseUnit(PhysicalType),

    /// A unit exponent, or an exponent of its physical type, outside `±127`.
    #[error("exponent out of range in unit '{0}'")]
    ExponentOverflow(String),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StackedShape { .. }
            | Self::Broadcast { .. }
            | Self::Reshape { .. }
            | Self::MatrixTranspose { .. }
            | Self::IndexOutOfBounds { .. }
            | Self::ZeroStep { .. }
            | Self::TooManyIndices { .. } => ErrorKind::Shape,
            Self::OperandType { .. } | Self::Construct { .. } | Self::KindMismatch { .. } => {
                ErrorKind::Type
            }
            Self::MissingPhysicalType(_)
            | Self::MissingComponent { .. }
            | Self::UnexpectedComponent { .. } => ErrorKind::Key,
            Self::Dispatch { .. } => ErrorKind::Dispatch,
            Self::UnitConversion { .. }
            | Self::UnknownUnit(_)
            | Self::UnitSyntax { .. }
            | Self::UnknownPhysicalType(_)
            | Self::DuplicateBaseUnit(_)
            | Self::ExponentOverflow(_) => ErrorKind::Unit,
        }
    }
}

//! The representation transform engine.
//!
//! Transforms are registered as typed functions between two concrete classes and stored keyed
//! by the `(source, target)` [`Kind`] pair. Resolution tries, in order:
//!
//! 1. the identity, which hands the input back without touching it;
//! 2. a rule registered for exactly `(source, target)`;
//! 3. a hop through the Cartesian class of the source, when both legs are registered.
//!
//! Anything else (in particular any request across dimensionalities) is a dispatch error.

use crate::differentials::{AbstractVectorDifferential, AnyDifferential};
use crate::error::Error;
use crate::kinds::Kind;
use crate::vectors::{AbstractVector, AnyVector};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, LazyLock};

type PositionRule = Arc<dyn Fn(AnyVector) -> Result<AnyVector, Error> + Send + Sync>;
type DifferentialFn =
    Arc<dyn Fn(AnyDifferential, AnyVector) -> Result<AnyDifferential, Error> + Send + Sync>;

#[derive(Clone)]
struct DifferentialRule {
    /// The position class `apply` expects to be handed.
    position: Kind,
    apply: DifferentialFn,
}

/// How a transform between two classes is carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Identity,
    Direct,
    /// Via the Cartesian class of the source.
    ViaCartesian,
}

/// A registry of representation transforms.
///
/// [`TransformTable::builtin`] holds every transform this crate ships with. To add your own,
/// clone it, register more rules, and resolve through the clone with
/// [`AbstractVector::represent_as_in`].
#[derive(Clone, Default)]
pub struct TransformTable {
    positions: HashMap<(Kind, Kind), PositionRule>,
    differentials: HashMap<(Kind, Kind), DifferentialRule>,
}

static BUILTIN: LazyLock<TransformTable> = LazyLock::new(|| {
    let mut table = TransformTable::new();
    crate::d1::register(&mut table);
    crate::d2::register(&mut table);
    crate::d3::register(&mut table);
    crate::dn::register(&mut table);
    table
});

impl TransformTable {
    /// An empty table, which can only resolve identity transforms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of builtin transforms, built on first use.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Registers a transform between two position classes, replacing any earlier one.
    pub fn register_position<F, T>(&mut self, rule: fn(F) -> Result<T, Error>)
    where
        F: AbstractVector + 'static,
        T: AbstractVector + 'static,
    {
        tracing::trace!(from = %F::KIND, to = %T::KIND, "registered position transform");
        self.positions.insert(
            (F::KIND, T::KIND),
            Arc::new(move |v: AnyVector| -> Result<AnyVector, Error> {
                Ok(rule(F::try_from(v)?)?.into())
            }),
        );
    }

    /// Registers a transform between two differential classes that is evaluated at a position
    /// of class `P`, replacing any earlier one.
    ///
    /// The engine converts whatever position the caller supplies into `P` before calling
    /// `rule`.
    pub fn register_differential<F, P, T>(&mut self, rule: fn(F, &P) -> Result<T, Error>)
    where
        F: AbstractVectorDifferential + 'static,
        P: AbstractVector + 'static,
        T: AbstractVectorDifferential + 'static,
    {
        tracing::trace!(
            from = %F::KIND,
            to = %T::KIND,
            at = %P::KIND,
            "registered differential transform"
        );
        self.differentials.insert(
            (F::KIND, T::KIND),
            DifferentialRule {
                position: P::KIND,
                apply: Arc::new(
                    move |d: AnyDifferential, position: AnyVector| -> Result<AnyDifferential, Error> {
                        let position = P::try_from(position)?;
                        Ok(rule(F::try_from(d)?, &position)?.into())
                    },
                ),
            },
        );
    }

    /// Decides how a transform from `from` to `to` would be carried out, without running it.
    pub fn route(&self, from: Kind, to: Kind) -> Result<Route, Error> {
        let has = |key: (Kind, Kind)| {
            if key.0.is_differential() {
                self.differentials.contains_key(&key)
            } else {
                self.positions.contains_key(&key)
            }
        };
        if from == to {
            return Ok(Route::Identity);
        }
        if has((from, to)) {
            return Ok(Route::Direct);
        }
        let via = from.cartesian();
        if via != to && has((from, via)) && has((via, to)) {
            return Ok(Route::ViaCartesian);
        }
        Err(Error::Dispatch { from, to })
    }

    /// Converts `vector` into the position class `to`.
    pub fn represent_position(&self, vector: AnyVector, to: Kind) -> Result<AnyVector, Error> {
        let from = vector.kind();
        match self.route(from, to)? {
            Route::Identity => Ok(vector),
            Route::Direct => self.apply_position(vector, to),
            Route::ViaCartesian => {
                let via = from.cartesian();
                tracing::debug!(%from, %to, %via, "no direct position transform; going through Cartesian");
                let cartesian = self.apply_position(vector, via)?;
                self.apply_position(cartesian, to)
            }
        }
    }

    /// Converts `differential` into the differential class `to`, evaluated at `position`.
    ///
    /// `position` may be of any position class that converts into the ones the individual
    /// rules need.
    pub fn represent_differential(
        &self,
        differential: AnyDifferential,
        to: Kind,
        position: &AnyVector,
    ) -> Result<AnyDifferential, Error> {
        let from = differential.kind();
        match self.route(from, to)? {
            Route::Identity => Ok(differential),
            Route::Direct => self.apply_differential(differential, to, position),
            Route::ViaCartesian => {
                let via = from.cartesian();
                tracing::debug!(%from, %to, %via, "no direct differential transform; going through Cartesian");
                let cartesian = self.apply_differential(differential, via, position)?;
                self.apply_differential(cartesian, to, position)
            }
        }
    }

    fn apply_position(&self, vector: AnyVector, to: Kind) -> Result<AnyVector, Error> {
        let from = vector.kind();
        let rule = self
            .positions
            .get(&(from, to))
            .ok_or(Error::Dispatch { from, to })?;
        rule(vector)
    }

    fn apply_differential(
        &self,
        differential: AnyDifferential,
        to: Kind,
        position: &AnyVector,
    ) -> Result<AnyDifferential, Error> {
        let from = differential.kind();
        let rule = self
            .differentials
            .get(&(from, to))
            .ok_or(Error::Dispatch { from, to })?;
        let position = if position.kind() == rule.position {
            position.clone()
        } else {
            self.represent_position(position.clone(), rule.position)?
        };
        (rule.apply)(differential, position)
    }
}

impl Debug for TransformTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut positions: Vec<_> = self.positions.keys().collect();
        positions.sort();
        let mut differentials: Vec<_> = self
            .differentials
            .iter()
            .map(|(key, rule)| (key, rule.position))
            .collect();
        differentials.sort();
        f.debug_struct("TransformTable")
            .field("positions", &positions)
            .field("differentials", &differentials)
            .finish()
    }
}

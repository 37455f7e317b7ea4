//! Runtime units and physical types.
//!
//! Components of a vector carry their unit at runtime (two components of the same vector may
//! well be in `m` and `km`), so this module models a [`Unit`] as a product of powers of named
//! units. The scale of every named unit is taken from [`uom`]'s SI definitions, which remain
//! the single source of truth for what a kilometer or an arcsecond is.
//!
//! A [`PhysicalType`] is the dimensional category of a unit (length, speed, angle, ...). Angle is
//! treated as its own base dimension so that angular components are never silently mixed with
//! dimensionless ones.

use crate::error::Error;
use std::fmt::{self, Display, Formatter};
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::LazyLock;
use uom::si::f64::{Angle, Length, Mass, Time};
use uom::si::{angle, length, mass, time};

/// The dimensional category of a [`Unit`].
///
/// Stored as integer exponents of the four base dimensions this crate knows about: length,
/// mass, time, and angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhysicalType {
    length: i8,
    mass: i8,
    time: i8,
    angle: i8,
}

impl PhysicalType {
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(1, 0, 0, 0);
    pub const MASS: Self = Self::new(0, 1, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    pub const ANGLE: Self = Self::new(0, 0, 0, 1);
    pub const SPEED: Self = Self::new(1, 0, -1, 0);
    pub const ACCELERATION: Self = Self::new(1, 0, -2, 0);
    pub const ANGULAR_SPEED: Self = Self::new(0, 0, -1, 1);
    pub const ANGULAR_ACCELERATION: Self = Self::new(0, 0, -2, 1);
    pub const FREQUENCY: Self = Self::new(0, 0, -1, 0);
    pub const AREA: Self = Self::new(2, 0, 0, 0);
    pub const SOLID_ANGLE: Self = Self::new(0, 0, 0, 2);

    const fn new(length: i8, mass: i8, time: i8, angle: i8) -> Self {
        Self {
            length,
            mass,
            time,
            angle,
        }
    }

    /// Raises the physical type to the `n`th power, or `None` if an exponent leaves the range
    /// `±127`.
    #[must_use]
    pub fn checked_powi(self, n: i8) -> Option<Self> {
        self.zip_exponents(self, |a, _| a.checked_mul(n))
    }

    /// The physical type of a product, or `None` if an exponent leaves the range `±127`.
    #[must_use]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.zip_exponents(rhs, i8::checked_add)
    }

    #[must_use]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.checked_mul(rhs.checked_powi(-1)?)
    }

    fn zip_exponents(self, rhs: Self, f: impl Fn(i8, i8) -> Option<i8>) -> Option<Self> {
        // i8::MIN has no negation, which would make the reciprocal unrepresentable
        let e = |a, b| f(a, b).filter(|e| *e != i8::MIN);
        Some(Self::new(
            e(self.length, rhs.length)?,
            e(self.mass, rhs.mass)?,
            e(self.time, rhs.time)?,
            e(self.angle, rhs.angle)?,
        ))
    }

    /// Returns this physical type with the angle dimension removed.
    ///
    /// Used where radians are dimensionless in practice, such as `r * dθ/dt` being a speed.
    #[must_use]
    pub fn without_angle(self) -> Self {
        Self { angle: 0, ..self }
    }

    /// The exponent of each base dimension, in the order length, mass, time, angle.
    fn exponents(self) -> [(Self, i8); 4] {
        [
            (Self::LENGTH, self.length),
            (Self::MASS, self.mass),
            (Self::TIME, self.time),
            (Self::ANGLE, self.angle),
        ]
    }

    /// The conventional name of this physical type, if it has one.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        PHYSICAL_TYPE_NAMES
            .iter()
            .find(|(pt, _)| *pt == self)
            .map(|(_, name)| *name)
    }
}

// first entry for a given type is its canonical name; later ones are accepted aliases
const PHYSICAL_TYPE_NAMES: &[(PhysicalType, &str)] = &[
    (PhysicalType::DIMENSIONLESS, "dimensionless"),
    (PhysicalType::LENGTH, "length"),
    (PhysicalType::MASS, "mass"),
    (PhysicalType::TIME, "time"),
    (PhysicalType::ANGLE, "angle"),
    (PhysicalType::SPEED, "speed"),
    (PhysicalType::SPEED, "velocity"),
    (PhysicalType::ACCELERATION, "acceleration"),
    (PhysicalType::ANGULAR_SPEED, "angular speed"),
    (PhysicalType::ANGULAR_SPEED, "angular velocity"),
    (PhysicalType::ANGULAR_SPEED, "angular frequency"),
    (PhysicalType::ANGULAR_ACCELERATION, "angular acceleration"),
    (PhysicalType::FREQUENCY, "frequency"),
    (PhysicalType::AREA, "area"),
    (PhysicalType::SOLID_ANGLE, "solid angle"),
];

impl Display for PhysicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        let mut first = true;
        for (base, exp) in self.exponents() {
            if exp == 0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let name = base.name().unwrap_or("?");
            if exp == 1 {
                write!(f, "{name}")?;
            } else {
                write!(f, "{name}^{exp}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for PhysicalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PHYSICAL_TYPE_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(wanted))
            .map(|(pt, _)| *pt)
            .ok_or_else(|| Error::UnknownPhysicalType(s.to_owned()))
    }
}

struct NamedUnit {
    symbol: &'static str,
    aliases: &'static [&'static str],
    physical_type: PhysicalType,
    /// Multiplier into the SI (or radian, for angles) value.
    scale: f64,
}

fn meters(l: Length) -> f64 {
    l.get::<length::meter>()
}

fn kilograms(m: Mass) -> f64 {
    m.get::<mass::kilogram>()
}

fn seconds(t: Time) -> f64 {
    t.get::<time::second>()
}

fn radians(a: Angle) -> f64 {
    a.get::<angle::radian>()
}

// the order of this table is also the order in which terms of a composite unit are printed
static NAMED_UNITS: LazyLock<Vec<NamedUnit>> = LazyLock::new(|| {
    fn named(
        symbol: &'static str,
        aliases: &'static [&'static str],
        physical_type: PhysicalType,
        scale: f64,
    ) -> NamedUnit {
        NamedUnit {
            symbol,
            aliases,
            physical_type,
            scale,
        }
    }

    let julian_year = Time::new::<time::day>(365.25);
    vec![
        named(
            "m",
            &["meter", "metre"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::meter>(1.)),
        ),
        named(
            "cm",
            &["centimeter"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::centimeter>(1.)),
        ),
        named(
            "mm",
            &["millimeter"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::millimeter>(1.)),
        ),
        named(
            "km",
            &["kilometer"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::kilometer>(1.)),
        ),
        named(
            "AU",
            &["au"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::astronomical_unit>(1.)),
        ),
        named(
            "pc",
            &["parsec"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::parsec>(1.)),
        ),
        named(
            "kpc",
            &["kiloparsec"],
            PhysicalType::LENGTH,
            meters(Length::new::<length::parsec>(1e3)),
        ),
        named(
            "g",
            &["gram"],
            PhysicalType::MASS,
            kilograms(Mass::new::<mass::gram>(1.)),
        ),
        named(
            "kg",
            &["kilogram"],
            PhysicalType::MASS,
            kilograms(Mass::new::<mass::kilogram>(1.)),
        ),
        named(
            "s",
            &["second", "sec"],
            PhysicalType::TIME,
            seconds(Time::new::<time::second>(1.)),
        ),
        named(
            "min",
            &["minute"],
            PhysicalType::TIME,
            seconds(Time::new::<time::minute>(1.)),
        ),
        named(
            "h",
            &["hr", "hour"],
            PhysicalType::TIME,
            seconds(Time::new::<time::hour>(1.)),
        ),
        named(
            "d",
            &["day"],
            PhysicalType::TIME,
            seconds(Time::new::<time::day>(1.)),
        ),
        named("yr", &["year", "a"], PhysicalType::TIME, seconds(julian_year)),
        named("Myr", &["Ma"], PhysicalType::TIME, seconds(julian_year) * 1e6),
        named(
            "rad",
            &["radian"],
            PhysicalType::ANGLE,
            radians(Angle::new::<angle::radian>(1.)),
        ),
        named(
            "deg",
            &["degree"],
            PhysicalType::ANGLE,
            radians(Angle::new::<angle::degree>(1.)),
        ),
        named(
            "arcmin",
            &[],
            PhysicalType::ANGLE,
            radians(Angle::new::<angle::minute>(1.)),
        ),
        named(
            "arcsec",
            &[],
            PhysicalType::ANGLE,
            radians(Angle::new::<angle::second>(1.)),
        ),
        named(
            "mas",
            &[],
            PhysicalType::ANGLE,
            radians(Angle::new::<angle::second>(1e-3)),
        ),
    ]
});

/// Index into [`NAMED_UNITS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Named(u8);

impl Named {
    fn lookup(symbol: &str) -> Option<Self> {
        let exact = NAMED_UNITS.iter().position(|u| u.symbol == symbol);
        let index = exact.or_else(|| {
            NAMED_UNITS
                .iter()
                .position(|u| u.aliases.contains(&symbol))
        })?;
        u8::try_from(index).ok().map(Self)
    }

    fn info(self) -> &'static NamedUnit {
        &NAMED_UNITS[usize::from(self.0)]
    }
}

/// A physical unit: a product of integer powers of named units such as `km` or `yr`.
///
/// Units are normalized on construction, so `km / s * s` is exactly `km`. Two units compare
/// equal only if they are written with the same named units; `1000 m` and `1 km` are equal
/// _quantities_ but `m` and `km` are different units.
///
/// ```
/// use coordinax::Unit;
///
/// let speed: Unit = "km / s".parse().unwrap();
/// let time: Unit = "s".parse().unwrap();
/// assert_eq!(speed.checked_mul(&time).unwrap(), "km".parse().unwrap());
/// assert_eq!(speed.to_string(), "km / s");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Unit {
    terms: Vec<(Named, i8)>,
    /// Computed once when the terms are normalized; every exponent is within `±127`.
    physical_type: PhysicalType,
}

impl Unit {
    /// The unit of plain numbers.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub(crate) fn radian() -> Self {
        Self::named("rad")
    }

    pub(crate) fn named(symbol: &str) -> Self {
        Self::from_symbols(&[(symbol, 1)])
    }

    /// Builds a unit from distinct table symbols with exponents of magnitude at most 3. That
    /// keeps every exponent far inside `±127`, so no range check is needed.
    pub(crate) fn from_symbols(symbols: &[(&str, i8)]) -> Self {
        let mut terms: Vec<(Named, i8)> = symbols
            .iter()
            .filter_map(|(symbol, exp)| Named::lookup(symbol).map(|n| (n, *exp)))
            .collect();
        debug_assert!(terms.iter().all(|(_, exp)| exp.abs() <= 3));
        terms.sort_by_key(|(u, _)| *u);
        let physical_type = terms
            .iter()
            .fold(PhysicalType::DIMENSIONLESS, |acc, (n, exp)| {
                let pt = n.info().physical_type;
                PhysicalType::new(
                    acc.length + pt.length * exp,
                    acc.mass + pt.mass * exp,
                    acc.time + pt.time * exp,
                    acc.angle + pt.angle * exp,
                )
            });
        Self {
            terms,
            physical_type,
        }
    }

    fn single(n: Named) -> Self {
        Self {
            terms: vec![(n, 1)],
            physical_type: n.info().physical_type,
        }
    }

    /// Parses a unit such as `m`, `km / s`, `mas/yr`, `m s^-2`, or `km / (m s)`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let tokens = tokenize(s)?;
        let mut parser = Parser {
            src: s,
            tokens: &tokens,
            at: 0,
        };
        let unit = parser.expression()?;
        if parser.at != tokens.len() {
            return Err(parser.syntax("unexpected trailing input"));
        }
        Ok(unit)
    }

    #[must_use]
    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    /// Multiplier taking a value in this unit to SI base units (radians for angles).
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.terms
            .iter()
            .map(|(n, exp)| n.info().scale.powi(i32::from(*exp)))
            .product()
    }

    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the factor by which a value in `self` must be multiplied to be expressed in `to`.
    ///
    /// Fails if the two units are of different physical types.
    pub fn conversion_factor(&self, to: &Unit) -> Result<f64, Error> {
        if self == to {
            return Ok(1.);
        }
        let (from_type, to_type) = (self.physical_type(), to.physical_type());
        if from_type != to_type {
            return Err(Error::UnitConversion {
                from: self.to_string(),
                from_type,
                to: to.to_string(),
                to_type,
            });
        }
        Ok(self.scale() / to.scale())
    }

    /// Raises the unit to the `n`th power.
    ///
    /// Fails if an exponent of the result, or of its physical type, leaves the range `±127`.
    pub fn checked_powi(&self, n: i8) -> Result<Self, Error> {
        let terms = self
            .terms
            .iter()
            .map(|(u, exp)| exp.checked_mul(n).map(|exp| (*u, exp)))
            .collect::<Option<Vec<_>>>();
        terms
            .and_then(Self::normalized)
            .ok_or_else(|| exponent_overflow(format!("({self})^{n}")))
    }

    /// The unit of a product, with the same range check as [`Unit::checked_powi`].
    pub fn checked_mul(&self, rhs: &Unit) -> Result<Self, Error> {
        Self::normalized(self.terms.iter().chain(&rhs.terms).copied())
            .ok_or_else(|| exponent_overflow(format!("({self}) ({rhs})")))
    }

    pub fn checked_div(&self, rhs: &Unit) -> Result<Self, Error> {
        self.checked_mul(&rhs.checked_powi(-1)?)
    }

    /// The SI unit of the angular rate matching this linear rate, e.g. `rad / s` for `km / s`.
    pub(crate) fn angular_rate(&self) -> Result<Unit, Error> {
        let angular = self
            .physical_type
            .checked_div(PhysicalType::LENGTH)
            .and_then(|pt| pt.checked_mul(PhysicalType::ANGLE))
            .ok_or_else(|| exponent_overflow(self.to_string()))?;
        UnitSystem::si().get(angular)
    }

    /// Merges repeated named units and drops cancelled ones. `None` if any exponent, of a term
    /// or of the resulting physical type, leaves the range `±127`.
    fn normalized(terms: impl IntoIterator<Item = (Named, i8)>) -> Option<Self> {
        let mut merged: Vec<(Named, i8)> = Vec::new();
        for (unit, exp) in terms {
            match merged.iter_mut().find(|(u, _)| *u == unit) {
                Some((_, e)) => *e = e.checked_add(exp)?,
                None => merged.push((unit, exp)),
            }
        }
        merged.retain(|(_, exp)| *exp != 0);
        if merged.iter().any(|(_, exp)| *exp == i8::MIN) {
            return None;
        }
        merged.sort_by_key(|(u, _)| *u);
        let physical_type = merged
            .iter()
            .try_fold(PhysicalType::DIMENSIONLESS, |acc, (n, exp)| {
                acc.checked_mul(n.info().physical_type.checked_powi(*exp)?)
            })?;
        Some(Self {
            terms: merged,
            physical_type,
        })
    }
}

fn exponent_overflow(unit: String) -> Error {
    Error::ExponentOverflow(unit)
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn term(n: Named, exp: i8) -> String {
            let symbol = n.info().symbol;
            if exp == 1 {
                symbol.to_owned()
            } else {
                format!("{symbol}{exp}")
            }
        }

        let numerator: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, exp)| *exp > 0)
            .map(|(n, exp)| term(*n, *exp))
            .collect();
        let denominator: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, exp)| *exp < 0)
            .map(|(n, exp)| term(*n, -exp))
            .collect();

        match (numerator.is_empty(), denominator.len()) {
            (_, 0) => f.write_str(&numerator.join(" ")),
            (true, 1) => write!(f, "1 / {}", denominator[0]),
            (true, _) => write!(f, "1 / ({})", denominator.join(" ")),
            (false, 1) => write!(f, "{} / {}", numerator.join(" "), denominator[0]),
            (false, _) => write!(f, "{} / ({})", numerator.join(" "), denominator.join(" ")),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Unit {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Symbol(String),
    Int(i8),
    Star,
    Slash,
    Caret,
    Open,
    Close,
}

fn tokenize(s: &str) -> Result<Vec<Token>, Error> {
    let syntax = |reason| Error::UnitSyntax {
        unit: s.to_owned(),
        reason,
    };
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_alphabetic() => {
                let mut symbol = String::new();
                while let Some(&c) = chars.peek().filter(|c| c.is_alphabetic()) {
                    symbol.push(c);
                    chars.next();
                }
                tokens.push(Token::Symbol(symbol));
                // `s2` and `s-2` are shorthand for `s^2` and `s^-2`
                if chars
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || *c == '-')
                {
                    tokens.push(Token::Caret);
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let mut digits = String::from(c);
                chars.next();
                while let Some(&c) = chars.peek().filter(|c| c.is_ascii_digit()) {
                    digits.push(c);
                    chars.next();
                }
                let value = digits.parse::<i8>().map_err(|e| match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                        Error::ExponentOverflow(s.to_owned())
                    }
                    _ => syntax("invalid exponent"),
                })?;
                tokens.push(Token::Int(value));
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            _ => return Err(syntax("unexpected character")),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    at: usize,
}

impl<'a> Parser<'a> {
    fn syntax(&self, reason: &'static str) -> Error {
        Error::UnitSyntax {
            unit: self.src.to_owned(),
            reason,
        }
    }

    /// Reports an overflowing exponent against the whole input rather than the partial unit.
    fn within_range(&self, unit: Result<Unit, Error>) -> Result<Unit, Error> {
        unit.map_err(|_| Error::ExponentOverflow(self.src.to_owned()))
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.at)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.at);
        self.at += 1;
        token
    }

    fn expression(&mut self) -> Result<Unit, Error> {
        let mut unit = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.at += 1;
                    let rhs = self.term()?;
                    unit = self.within_range(unit.checked_mul(&rhs))?;
                }
                Some(Token::Slash) => {
                    self.at += 1;
                    let rhs = self.term()?;
                    unit = self.within_range(unit.checked_div(&rhs))?;
                }
                // juxtaposition is multiplication: `m s` is `m * s`
                Some(Token::Symbol(_) | Token::Open) => {
                    let rhs = self.term()?;
                    unit = self.within_range(unit.checked_mul(&rhs))?;
                }
                _ => return Ok(unit),
            }
        }
    }

    fn term(&mut self) -> Result<Unit, Error> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.at += 1;
            match self.next() {
                Some(Token::Int(exp)) => return self.within_range(base.checked_powi(*exp)),
                _ => return Err(self.syntax("expected an integer exponent")),
            }
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Unit, Error> {
        match self.next().cloned() {
            Some(Token::Symbol(symbol)) => Named::lookup(&symbol)
                .map(Unit::single)
                .ok_or(Error::UnknownUnit(symbol)),
            Some(Token::Int(1)) => Ok(Unit::dimensionless()),
            Some(Token::Open) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(self.syntax("unbalanced parenthesis")),
                }
            }
            _ => Err(self.syntax("expected a unit")),
        }
    }
}

/// Maps every [`PhysicalType`] to a canonical unit, given one unit per base dimension.
///
/// Lookups of derived physical types are composed from the base units, so a system built from
/// `km` and `s` answers `km / s` for [`PhysicalType::SPEED`]. A system may also contain units
/// for derived physical types directly, in which case those take precedence.
///
/// ```
/// use coordinax::{units::PhysicalType, Unit, UnitSystem};
///
/// let usys = UnitSystem::new(["kpc", "Myr", "rad"].map(|u| u.parse::<Unit>().unwrap())).unwrap();
/// assert_eq!(usys.get(PhysicalType::SPEED).unwrap().to_string(), "kpc / Myr");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSystem {
    units: Vec<Unit>,
}

impl UnitSystem {
    /// Constructs a unit system from units of pairwise-distinct physical types.
    pub fn new(units: impl IntoIterator<Item = Unit>) -> Result<Self, Error> {
        let mut collected: Vec<Unit> = Vec::new();
        for unit in units {
            let pt = unit.physical_type();
            if collected.iter().any(|u| u.physical_type() == pt) {
                return Err(Error::DuplicateBaseUnit(pt));
            }
            collected.push(unit);
        }
        Ok(Self { units: collected })
    }

    /// Meters, kilograms, seconds, and radians.
    #[must_use]
    pub fn si() -> Self {
        Self {
            units: ["m", "kg", "s", "rad"].map(Unit::named).into(),
        }
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Returns the unit this system uses for `physical_type`.
    ///
    /// Fails with a key error if the system lacks a unit for one of the base dimensions
    /// `physical_type` is built from.
    pub fn get(&self, physical_type: PhysicalType) -> Result<Unit, Error> {
        if let Some(unit) = self
            .units
            .iter()
            .find(|u| u.physical_type() == physical_type)
        {
            return Ok(unit.clone());
        }
        let mut composed = Unit::dimensionless();
        for (base, exp) in physical_type.exponents() {
            if exp == 0 {
                continue;
            }
            let unit = self
                .units
                .iter()
                .find(|u| u.physical_type() == base)
                .ok_or(Error::MissingPhysicalType(physical_type))?;
            composed = composed.checked_mul(&unit.checked_powi(exp)?)?;
        }
        Ok(composed)
    }
}

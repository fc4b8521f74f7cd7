//! Enumerations: unit enums stored by symbolic name.
//!
//! A constant marshals to its name. Reading one back accepts the name or,
//! when the stored value is a number, the constant's ordinal; which of the
//! two is honoured is set by [`EnumResolution`](crate::EnumResolution).
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{enumeration, Grammar, Value};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Blob {
//!     Foo,
//!     Bar,
//!     Baz = 10,
//! }
//!
//! enumeration!(Blob { Foo = "FOO", Bar = "BAR", Baz = "BAZ" });
//!
//! let grammar = Grammar::new();
//! assert_eq!(grammar.deconstruct(&Blob::Bar).unwrap(), Value::from("BAR"));
//! assert_eq!(grammar.construct::<Blob>(&Value::from("BAZ")).unwrap(), Blob::Baz);
//! // ordinals count declaration order, not discriminants
//! assert_eq!(grammar.construct::<Blob>(&Value::from(2)).unwrap(), Blob::Baz);
//! ```

use crate::{Context, Error, Result, Value};

/// A closed set of named constants.
pub trait Enumeration: Copy + Send + Sync + 'static {
    /// Name of the enumeration, used in error messages.
    const NAME: &'static str;

    /// Every constant, in declaration order.
    fn constants() -> &'static [Self];

    /// The symbolic name of this constant.
    fn name(&self) -> &'static str;

    /// Position of this constant in [`constants`](Self::constants).
    fn ordinal(&self) -> usize {
        let name = self.name();
        Self::constants()
            .iter()
            .position(|constant| constant.name() == name)
            .unwrap_or_default()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::constants()
            .iter()
            .copied()
            .find(|constant| constant.name() == name)
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::constants().get(ordinal).copied()
    }
}

/// Marshals a constant to its name.
pub fn deconstruct<E: Enumeration>(constant: &E) -> Value {
    Value::String(constant.name().to_string())
}

/// Resolves a stored value to a constant.
///
/// Strings match names exactly; numbers select by ordinal, floats being
/// truncated first.
pub fn construct<E: Enumeration>(value: &Value, cx: Context<'_>) -> Result<E> {
    let resolution = cx.options().enum_resolution;
    match value {
        Value::String(name) if resolution.accepts_name() => {
            E::from_name(name).ok_or_else(|| Error::no_such_constant(E::NAME, name))
        }
        Value::Number(number) if resolution.accepts_ordinal() => usize::try_from(number.truncate())
            .ok()
            .and_then(E::from_ordinal)
            .ok_or_else(|| Error::no_such_constant(E::NAME, &number.to_string())),
        other => Err(cx.mismatch(E::NAME, other)),
    }
}

//! Conversion of single values to and from the generic tree.
//!
//! Every type that can appear as a field value implements [`Convert`]. The
//! crate implements it for primitives, strings, collections, maps, arrays,
//! `Option`, the generic [`Value`] itself and a few scalar-like types with
//! canonical string forms (`Uuid`, `DateTime<Utc>`, `BigInt`). Object types
//! opt in with [`impl_convert!`](crate::impl_convert), enumerations with
//! [`enumeration!`](crate::enumeration).
//!
//! ## Conversion Rules
//!
//! | Rust type | Value |
//! |-----------|-------|
//! | `bool` | `Bool` |
//! | integers, `f32`, `f64` | `Number` (narrowed with `as` when read back) |
//! | `char`, `String` | `String` |
//! | `Option<T>` | `Null` or the value of `T` |
//! | `Vec`, `VecDeque`, `LinkedList`, sets, `[T; N]`, `Box<[T]>` | `Array` |
//! | `HashMap`, `BTreeMap`, `IndexMap`, `ValueMap` | `Object` |
//! | `Uuid`, `DateTime<Utc>`, `BigInt` | `String` |
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{Grammar, Value};
//! use std::collections::BTreeSet;
//!
//! let grammar = Grammar::new();
//! let value = grammar.deconstruct(&vec![3u8, 1, 2]).unwrap();
//! let set: BTreeSet<u8> = grammar.construct(&value).unwrap();
//! assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
//!
//! // floats are truncated when narrowed into an integer slot
//! let narrowed: i16 = grammar.construct(&Value::from(41.9)).unwrap();
//! assert_eq!(narrowed, 41);
//! ```

use crate::{Error, Grammar, GrammarOptions, Number, Result, Value, ValueMap};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use uuid::Uuid;

/// The shape of value a type is built from.
///
/// Used to pick the first permitted subtype able to take a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Integer,
    Float,
    Char,
    String,
    /// A type with a canonical string form, like `Uuid`
    Scalar,
    Enumeration,
    Sequence,
    Array,
    Mapping,
    Object,
    Any,
}

impl Kind {
    /// Returns `true` if a type of this kind can be constructed from `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::{Kind, Value};
    ///
    /// assert!(Kind::Integer.accepts(&Value::from(3)));
    /// assert!(!Kind::Integer.accepts(&Value::from(3.5)));
    /// assert!(Kind::Float.accepts(&Value::from(3)));
    /// assert!(Kind::Enumeration.accepts(&Value::from("RED")));
    /// ```
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Kind::Bool => value.is_bool(),
            Kind::Integer => matches!(
                value,
                Value::Number(Number::Integer(_) | Number::Unsigned(_))
            ),
            Kind::Float => value.is_number(),
            Kind::Char | Kind::String | Kind::Scalar => value.is_string(),
            Kind::Enumeration => value.is_string() || value.is_number(),
            Kind::Sequence | Kind::Array => value.is_array(),
            Kind::Mapping | Kind::Object => value.is_object(),
            Kind::Any => true,
        }
    }
}

/// What a conversion knows about where it happens.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    grammar: &'a Grammar,
    field: &'a str,
    any: bool,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn new(grammar: &'a Grammar, field: &'a str) -> Self {
        Context {
            grammar,
            field,
            any: false,
        }
    }

    /// Sets the any-marker: nested objects use their runtime type.
    #[must_use]
    pub fn with_any(mut self, any: bool) -> Self {
        self.any = any;
        self
    }

    #[must_use]
    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    /// Name of the field being converted.
    #[must_use]
    pub fn field(&self) -> &'a str {
        self.field
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        self.any
    }

    #[must_use]
    pub fn options(&self) -> &'a GrammarOptions {
        self.grammar.options()
    }

    /// Builds the type mismatch error for this field.
    #[must_use]
    pub fn mismatch(&self, expected: &str, found: &Value) -> Error {
        Error::type_mismatch(self.field, expected, found.type_name())
    }
}

/// Conversion of one type to and from a [`Value`].
pub trait Convert: Sized + Send + Sync + 'static {
    /// The shape of value this type is built from.
    const KIND: Kind;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value>;

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self>;

    /// Writes `value` into an existing instance.
    ///
    /// The default replaces the instance with a constructed one; objects
    /// merge and collections are cleared and refilled instead.
    fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
        *self = Self::construct(value, cx)?;
        Ok(())
    }

    /// The value a record component takes when its key is missing.
    ///
    /// `None` means the component is constructed from `Null` instead.
    fn absent() -> Option<Self> {
        None
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl Convert for $ty {
                const KIND: Kind = Kind::Integer;

                fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
                    Ok(Value::from(*self))
                }

                fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
                    match value {
                        Value::Number(Number::Integer(i)) => Ok(*i as $ty),
                        Value::Number(Number::Unsigned(u)) => Ok(*u as $ty),
                        Value::Number(Number::Float(f)) => Ok(*f as $ty),
                        other => Err(cx.mismatch(stringify!($ty), other)),
                    }
                }

                fn absent() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Convert for $ty {
                const KIND: Kind = Kind::Float;

                fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
                    Ok(Value::from(*self))
                }

                fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
                    match value {
                        Value::Number(n) => Ok(n.as_f64() as $ty),
                        other => Err(cx.mismatch(stringify!($ty), other)),
                    }
                }

                fn absent() -> Option<Self> {
                    Some(0.0)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl Convert for bool {
    const KIND: Kind = Kind::Bool;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        value.as_bool().ok_or_else(|| cx.mismatch("bool", value))
    }

    fn absent() -> Option<Self> {
        Some(false)
    }
}

impl Convert for char {
    const KIND: Kind = Kind::Char;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        match value {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::invalid_scalar("char", s, "expected exactly one character")),
                }
            }
            other => Err(cx.mismatch("char", other)),
        }
    }

    fn absent() -> Option<Self> {
        Some('\0')
    }
}

impl Convert for String {
    const KIND: Kind = Kind::String;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(cx.mismatch("String", other)),
        }
    }
}

impl Convert for Value {
    const KIND: Kind = Kind::Any;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(self.clone())
    }

    fn construct(value: &Value, _cx: Context<'_>) -> Result<Self> {
        Ok(value.clone())
    }
}

impl Convert for ValueMap {
    const KIND: Kind = Kind::Mapping;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::Object(self.clone()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(cx.mismatch("ValueMap", other)),
        }
    }

    fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
        match value {
            Value::Object(map) => {
                self.clear();
                self.merge(map);
                Ok(())
            }
            other => Err(cx.mismatch("ValueMap", other)),
        }
    }
}

impl<T: Convert> Convert for Option<T> {
    const KIND: Kind = T::KIND;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
        match self {
            Some(value) => value.deconstruct(cx),
            None => Ok(Value::Null),
        }
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::construct(value, cx).map(Some),
        }
    }

    fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(current) => current.commit(value, cx),
            None => {
                *self = Some(T::construct(value, cx)?);
                Ok(())
            }
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

fn elements<'v>(value: &'v Value, cx: Context<'_>, expected: &str) -> Result<&'v [Value]> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(cx.mismatch(expected, other)),
    }
}

fn construct_elements<T: Convert, C: FromIterator<T>>(
    value: &Value,
    cx: Context<'_>,
    expected: &str,
) -> Result<C> {
    elements(value, cx, expected)?
        .iter()
        .map(|item| T::construct(item, cx))
        .collect()
}

macro_rules! impl_collection {
    ($($collection:ident [$($bound:tt)*]),* $(,)?) => {
        $(
            impl<T: Convert $($bound)*> Convert for $collection<T> {
                const KIND: Kind = Kind::Sequence;

                fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
                    self.iter()
                        .map(|item| item.deconstruct(cx))
                        .collect::<Result<Vec<_>>>()
                        .map(Value::Array)
                }

                fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
                    construct_elements(value, cx, stringify!($collection))
                }

                fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
                    let items: Vec<T> = construct_elements(value, cx, stringify!($collection))?;
                    self.clear();
                    self.extend(items);
                    Ok(())
                }
            }
        )*
    };
}

impl_collection!(
    Vec [],
    VecDeque [],
    LinkedList [],
    HashSet [+ Eq + Hash],
    BTreeSet [+ Ord],
    IndexSet [+ Eq + Hash],
);

impl<T: Convert> Convert for Box<[T]> {
    const KIND: Kind = Kind::Array;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
        self.iter()
            .map(|item| item.deconstruct(cx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        construct_elements::<T, Vec<T>>(value, cx, "array").map(Vec::into_boxed_slice)
    }
}

impl<T: Convert, const N: usize> Convert for [T; N] {
    const KIND: Kind = Kind::Array;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
        self.iter()
            .map(|item| item.deconstruct(cx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        let items: Vec<T> = construct_elements(value, cx, "array")?;
        let found = items.len();
        <[T; N]>::try_from(items).map_err(|_| {
            Error::type_mismatch(
                cx.field(),
                &format!("array of length {}", N),
                &format!("sequence of length {}", found),
            )
        })
    }
}

/// A type usable as the key of a converted map.
///
/// # Examples
///
/// ```rust
/// use grammar::Grammar;
/// use std::collections::BTreeMap;
///
/// let mut scores = BTreeMap::new();
/// scores.insert(1u32, "one".to_string());
///
/// let grammar = Grammar::new();
/// let value = grammar.deconstruct(&scores).unwrap();
/// assert_eq!(value.as_object().unwrap().get("1").and_then(|v| v.as_str()), Some("one"));
///
/// let back: BTreeMap<u32, String> = grammar.construct(&value).unwrap();
/// assert_eq!(back, scores);
/// ```
pub trait MapKey: Sized + Send + Sync + 'static {
    fn to_key(&self) -> String;

    fn from_key(key: &str) -> Result<Self>;
}

impl MapKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str) -> Result<Self> {
        Ok(key.to_string())
    }
}

macro_rules! impl_parsed_key {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn to_key(&self) -> String {
                    self.to_string()
                }

                fn from_key(key: &str) -> Result<Self> {
                    key.parse()
                        .map_err(|e| Error::invalid_scalar(stringify!($ty), key, e))
                }
            }
        )*
    };
}

impl_parsed_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char, Uuid);

macro_rules! impl_map {
    ($($map:ident [$($bound:tt)*]),* $(,)?) => {
        $(
            impl<K: MapKey $($bound)*, V: Convert> Convert for $map<K, V> {
                const KIND: Kind = Kind::Mapping;

                fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
                    let mut map = ValueMap::with_capacity(self.len());
                    for (key, value) in self {
                        map.insert(key.to_key(), value.deconstruct(cx)?);
                    }
                    Ok(Value::Object(map))
                }

                fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
                    match value {
                        Value::Object(map) => map
                            .iter()
                            .map(|(key, value)| Ok((K::from_key(key)?, V::construct(value, cx)?)))
                            .collect(),
                        other => Err(cx.mismatch(stringify!($map), other)),
                    }
                }

                fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
                    let entries: Vec<(K, V)> = match value {
                        Value::Object(map) => map
                            .iter()
                            .map(|(key, value)| Ok((K::from_key(key)?, V::construct(value, cx)?)))
                            .collect::<Result<_>>()?,
                        other => return Err(cx.mismatch(stringify!($map), other)),
                    };
                    self.clear();
                    self.extend(entries);
                    Ok(())
                }
            }
        )*
    };
}

impl_map!(
    HashMap [+ Eq + Hash],
    BTreeMap [+ Ord],
    IndexMap [+ Eq + Hash],
);

fn scalar_text<'v>(value: &'v Value, cx: Context<'_>, expected: &str) -> Result<&'v str> {
    value.as_str().ok_or_else(|| cx.mismatch(expected, value))
}

impl Convert for Uuid {
    const KIND: Kind = Kind::Scalar;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        let text = scalar_text(value, cx, "Uuid")?;
        Uuid::parse_str(text).map_err(|e| Error::invalid_scalar("uuid", text, e))
    }
}

impl Convert for DateTime<Utc> {
    const KIND: Kind = Kind::Scalar;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::String(self.to_rfc3339()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        let text = scalar_text(value, cx, "DateTime")?;
        DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| Error::invalid_scalar("timestamp", text, e))
    }
}

impl Convert for BigInt {
    const KIND: Kind = Kind::Scalar;

    fn deconstruct(&self, _cx: Context<'_>) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        match value {
            Value::Number(Number::Integer(i)) => Ok(BigInt::from(*i)),
            Value::Number(Number::Unsigned(u)) => Ok(BigInt::from(*u)),
            Value::String(text) => text
                .parse()
                .map_err(|e| Error::invalid_scalar("integer", text, e)),
            other => Err(cx.mismatch("BigInt", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    fn grammar() -> Grammar {
        Grammar::new()
    }

    #[test]
    fn test_integer_narrowing() {
        let g = grammar();
        assert_eq!(g.construct::<u8>(&Value::from(300)).unwrap(), 44);
        assert_eq!(g.construct::<i8>(&Value::from(-129)).unwrap(), 127);
        assert_eq!(g.construct::<i32>(&Value::from(-7.8)).unwrap(), -7);
        assert_eq!(g.construct::<f32>(&Value::from(2)).unwrap(), 2.0);
    }

    #[test]
    fn test_scalar_mismatch_names_field_and_type() {
        let g = grammar();
        let cx = Context::new(&g, "age");
        let err = i32::construct(&Value::from("ten"), cx).unwrap_err();
        match err {
            Error::TypeMismatch {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "age");
                assert_eq!(expected, "i32");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_char_requires_single_character() {
        let g = grammar();
        assert_eq!(g.construct::<char>(&Value::from("x")).unwrap(), 'x');
        assert!(matches!(
            g.construct::<char>(&Value::from("xy")),
            Err(Error::InvalidScalar { .. })
        ));
    }

    #[test]
    fn test_option_null_handling() {
        let g = grammar();
        assert_eq!(g.construct::<Option<i32>>(&Value::Null).unwrap(), None);
        assert!(g.construct::<i32>(&Value::Null).is_err());
        assert_eq!(g.deconstruct(&None::<String>).unwrap(), Value::Null);

        let cx = Context::new(&g, "slot");
        let mut slot = Some(vec![1, 2]);
        slot.commit(&Value::Null, cx).unwrap();
        assert_eq!(slot, None);
        slot.commit(&value!([4]), cx).unwrap();
        assert_eq!(slot, Some(vec![4]));
    }

    #[test]
    fn test_collection_commit_clears_and_refills() {
        let g = grammar();
        let cx = Context::new(&g, "items");
        let mut items: VecDeque<String> = VecDeque::from(vec!["old".to_string()]);
        items.commit(&value!(["a", "b"]), cx).unwrap();
        assert_eq!(items, VecDeque::from(vec!["a".to_string(), "b".to_string()]));

        // a failing element leaves the collection untouched
        assert!(items.commit(&value!(["c", 1]), cx).is_err());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_index_set_keeps_first_seen_order() {
        let g = grammar();
        let set: IndexSet<i32> = g.construct(&value!([3, 1, 3, 2, 1])).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_fixed_array_requires_exact_length() {
        let g = grammar();
        let array: [f64; 2] = g.construct(&value!([0.5, 1.0])).unwrap();
        assert_eq!(array, [0.5, 1.0]);
        assert!(g.construct::<[f64; 3]>(&value!([0.5, 1.0])).is_err());

        let boxed: Box<[f64]> = g.construct(&value!([0.5, 1.0])).unwrap();
        assert_eq!(boxed.len(), 2);
    }

    #[test]
    fn test_map_keys_are_parsed() {
        let g = grammar();
        let map: HashMap<u16, bool> = g.construct(&value!({ "1": true, "20": false })).unwrap();
        assert_eq!(map.get(&20), Some(&false));
        assert!(matches!(
            g.construct::<HashMap<u16, bool>>(&value!({ "x": true })),
            Err(Error::InvalidScalar { .. })
        ));
    }

    #[test]
    fn test_map_commit_replaces_entries() {
        let g = grammar();
        let cx = Context::new(&g, "scores");
        let mut scores: IndexMap<String, i32> = IndexMap::new();
        scores.insert("stale".to_string(), 1);
        scores.commit(&value!({ "b": 2, "a": 1 }), cx).unwrap();
        assert_eq!(scores.keys().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn test_scalar_like_types() {
        let g = grammar();

        let id = Uuid::nil();
        let value = g.deconstruct(&id).unwrap();
        assert_eq!(value, Value::from("00000000-0000-0000-0000-000000000000"));
        assert_eq!(g.construct::<Uuid>(&value).unwrap(), id);
        assert!(matches!(
            g.construct::<Uuid>(&Value::from("not-a-uuid")),
            Err(Error::InvalidScalar { .. })
        ));

        let when: DateTime<Utc> = g.construct(&Value::from("2024-01-02T03:04:05Z")).unwrap();
        assert_eq!(g.deconstruct(&when).unwrap(), Value::from("2024-01-02T03:04:05+00:00"));

        let big: BigInt = g.construct(&Value::from("123456789012345678901234567890")).unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567890");
        assert_eq!(g.construct::<BigInt>(&Value::from(5)).unwrap(), BigInt::from(5));
    }

    #[test]
    fn test_kind_acceptance() {
        assert!(Kind::Any.accepts(&Value::Null));
        assert!(!Kind::Object.accepts(&Value::Array(vec![])));
        assert!(Kind::Mapping.accepts(&value!({})));
        assert!(!Kind::Bool.accepts(&Value::from(1)));
    }
}

//! Open polymorphism: fields whose runtime type may differ from the
//! declared one.
//!
//! - [`Poly<B>`] holds any type extending `B`. Marshalled with the field's
//!   any-marker it uses the runtime type's fields, otherwise `B`'s.
//! - [`Dynamic`] holds any convertible value and always uses its runtime type.
//! - [`Permit`] whitelists the types a stored value may be constructed as.
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{Dynamic, Grammar, Value};
//!
//! let grammar = Grammar::new();
//! let dynamic = Dynamic::new(vec![1u8, 2]);
//! assert_eq!(
//!     grammar.deconstruct(&dynamic).unwrap(),
//!     Value::Array(vec![Value::from(1), Value::from(2)])
//! );
//!
//! // without a permit, stored values are kept as they are
//! let back: Dynamic = grammar.construct(&Value::from("word")).unwrap();
//! assert_eq!(back.downcast_ref::<Value>(), Some(&Value::from("word")));
//! ```

use crate::object;
use crate::{Context, Convert, Extends, Grammar, Kind, Marshal, Result, Value, ValueMap};
use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// The runtime side of a [`Poly<B>`]: a type extending `B`, with its type
/// erased.
pub trait Subtype<B: Marshal>: Send + Sync + 'static {
    fn base(&self) -> &B;

    fn base_mut(&mut self) -> &mut B;

    fn runtime_name(&self) -> &'static str;

    fn marshal_runtime(&self, grammar: &Grammar) -> Result<ValueMap>;

    fn unmarshal_runtime(&mut self, grammar: &Grammar, map: &ValueMap) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<B: Marshal, T: Extends<B>> Subtype<B> for T {
    fn base(&self) -> &B {
        <T as Extends<B>>::upcast(self)
    }

    fn base_mut(&mut self) -> &mut B {
        <T as Extends<B>>::upcast_mut(self)
    }

    fn runtime_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn marshal_runtime(&self, grammar: &Grammar) -> Result<ValueMap> {
        grammar.marshal(self)
    }

    fn unmarshal_runtime(&mut self, grammar: &Grammar, map: &ValueMap) -> Result<()> {
        object::update(self, map, grammar)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value declared as `B` holding any type that extends `B`.
///
/// Dereferences to the `B` part of the runtime value.
pub struct Poly<B: Marshal> {
    inner: Box<dyn Subtype<B>>,
}

impl<B: Marshal> Poly<B> {
    #[must_use]
    pub fn new<T: Extends<B>>(value: T) -> Self {
        Poly {
            inner: Box::new(value),
        }
    }

    #[must_use]
    pub fn get(&self) -> &B {
        self.inner.base()
    }

    pub fn get_mut(&mut self) -> &mut B {
        self.inner.base_mut()
    }

    /// Returns the runtime value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut()
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    /// Name of the runtime type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.runtime_name()
    }
}

impl<B: Marshal> Deref for Poly<B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.get()
    }
}

impl<B: Marshal> DerefMut for Poly<B> {
    fn deref_mut(&mut self) -> &mut B {
        self.get_mut()
    }
}

impl<B: Marshal> fmt::Debug for Poly<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Poly").field(&self.type_name()).finish()
    }
}

impl<B: Marshal> Convert for Poly<B> {
    const KIND: Kind = Kind::Object;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
        let map = if cx.is_any() {
            self.inner.marshal_runtime(cx.grammar())?
        } else {
            cx.grammar().marshal(self.get())?
        };
        Ok(Value::Object(map))
    }

    fn construct(value: &Value, cx: Context<'_>) -> Result<Self> {
        object::construct::<B>(value, cx).map(Poly::new)
    }

    fn commit(&mut self, value: &Value, cx: Context<'_>) -> Result<()> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                let descriptor = cx.grammar().descriptor::<B>()?;
                return Err(cx.mismatch(descriptor.name(), other));
            }
        };
        if cx.is_any() {
            self.inner.unmarshal_runtime(cx.grammar(), map)
        } else {
            object::update(self.get_mut(), map, cx.grammar())
        }
    }
}

/// A convertible value with its type erased.
pub trait Erased: Send + Sync + 'static {
    fn to_value(&self, cx: Context<'_>) -> Result<Value>;

    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Convert> Erased for T {
    fn to_value(&self, cx: Context<'_>) -> Result<Value> {
        self.deconstruct(cx.with_any(true))
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value declared as "anything".
///
/// Constructed from a stored value it keeps the raw [`Value`], unless a
/// [`Permit`] on the field selects a concrete type.
pub struct Dynamic {
    inner: Box<dyn Erased>,
}

impl Dynamic {
    #[must_use]
    pub fn new<T: Convert>(value: T) -> Self {
        Dynamic {
            inner: Box::new(value),
        }
    }

    /// A dynamic holding [`Value::Null`].
    #[must_use]
    pub fn null() -> Self {
        Dynamic::new(Value::Null)
    }

    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.as_any_mut().downcast_mut()
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    /// Name of the held type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }
}

impl Default for Dynamic {
    fn default() -> Self {
        Dynamic::null()
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dynamic").field(&self.type_name()).finish()
    }
}

impl Convert for Dynamic {
    const KIND: Kind = Kind::Any;

    fn deconstruct(&self, cx: Context<'_>) -> Result<Value> {
        self.inner.to_value(cx)
    }

    fn construct(value: &Value, _cx: Context<'_>) -> Result<Self> {
        Ok(Dynamic::new(value.clone()))
    }
}

/// Wraps a permitted type into the declared field type.
pub trait Wrap<T>: Sized {
    fn wrap(value: T) -> Self;
}

impl<B: Marshal, T: Extends<B>> Wrap<T> for Poly<B> {
    fn wrap(value: T) -> Self {
        Poly::new(value)
    }
}

impl<T: Convert> Wrap<T> for Dynamic {
    fn wrap(value: T) -> Self {
        Dynamic::new(value)
    }
}

impl<T, W: Wrap<T>> Wrap<T> for Option<W> {
    fn wrap(value: T) -> Self {
        Some(W::wrap(value))
    }
}

/// A type a field of type `F` may be constructed as.
///
/// # Examples
///
/// ```rust
/// use grammar::{Dynamic, Kind, Permit};
///
/// let permit = Permit::<Dynamic>::of::<i32>();
/// assert_eq!(permit.name(), "i32");
/// assert_eq!(permit.kind(), Kind::Integer);
/// ```
pub struct Permit<F> {
    name: &'static str,
    kind: Kind,
    build: fn(&Value, Context<'_>) -> Result<F>,
}

impl<F> Permit<F> {
    /// Permits `T`, wrapped into `F` once built.
    #[must_use]
    pub fn of<T: Convert>() -> Self
    where
        F: Wrap<T>,
    {
        Permit {
            name: std::any::type_name::<T>(),
            kind: T::KIND,
            build: build_permitted::<T, F>,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl<F> Clone for Permit<F> {
    fn clone(&self) -> Self {
        Permit {
            name: self.name,
            kind: self.kind,
            build: self.build,
        }
    }
}

impl<F> fmt::Debug for Permit<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

fn build_permitted<T: Convert, F: Wrap<T>>(value: &Value, cx: Context<'_>) -> Result<F> {
    T::construct(value, cx).map(F::wrap)
}

/// Constructs the first permit whose kind accepts `value`.
pub(crate) fn resolve<F>(permits: &[Permit<F>], value: &Value, cx: Context<'_>) -> Result<F> {
    match permits.iter().find(|permit| permit.kind.accepts(value)) {
        Some(permit) => (permit.build)(value, cx),
        None => {
            let expected = permits
                .iter()
                .map(Permit::name)
                .collect::<Vec<_>>()
                .join(" | ");
            Err(cx.mismatch(&expected, value))
        }
    }
}

//! The conversion engine.
//!
//! [`Grammar`] walks the cached [`TypeDescriptor`] of a type to turn an
//! object into a [`ValueMap`] (marshal) and to rebuild or update an object
//! from one (unmarshal). Nested objects, collections and polymorphic fields
//! are handled by recursing through [`Convert`].
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{value, Field, Grammar, Marshal, Result, TypeDescriptor, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Thing {
//!     number: i32,
//!     word: String,
//! }
//!
//! impl Marshal for Thing {
//!     fn describe() -> Result<TypeDescriptor<Self>> {
//!         TypeDescriptor::builder("Thing")
//!             .field(Field::new("number", |t: &Thing| &t.number, |t: &mut Thing| &mut t.number))
//!             .field(Field::new("word", |t: &Thing| &t.word, |t: &mut Thing| &mut t.word))
//!             .build()
//!     }
//!
//!     fn zero() -> Self {
//!         Thing::default()
//!     }
//! }
//!
//! let grammar = Grammar::new();
//! let thing = Thing { number: 10, word: "hello".to_string() };
//!
//! let map = grammar.marshal(&thing).unwrap();
//! assert_eq!(Value::Object(map.clone()), value!({ "number": 10, "word": "hello" }));
//!
//! let back: Thing = grammar.unmarshal(&map).unwrap();
//! assert_eq!(back, thing);
//! ```

use crate::descriptor::{Arguments, Shape, TypeDescriptor};
use crate::{registry, Context, Convert, Error, GrammarOptions, Result, Value, ValueMap};

/// A type the engine can marshal and unmarshal field by field.
pub trait Marshal: Sized + Send + Sync + 'static {
    /// Builds the type's descriptor.
    ///
    /// Called at most once per type under normal operation; the result is
    /// cached for the rest of the process.
    fn describe() -> Result<TypeDescriptor<Self>>;

    /// A blank instance, used when no constructor was declared.
    fn zero() -> Self;
}

/// A type that converts itself instead of being walked field by field.
///
/// Register it with
/// [`DescriptorBuilder::self_describing`](crate::DescriptorBuilder::self_describing).
pub trait Marshalled {
    /// Produces the entries appended to the marshalled mapping.
    fn serialise(&self) -> Result<ValueMap>;

    /// Reads the object back from the whole input mapping.
    fn deserialise(&mut self, map: &ValueMap) -> Result<()>;
}

/// Declares `B` a base of `Self`: `Self` embeds a `B` and can be used
/// wherever a `B` is declared.
///
/// Every type is its own base.
pub trait Extends<B: Marshal>: Marshal {
    fn upcast(&self) -> &B;

    fn upcast_mut(&mut self) -> &mut B;
}

impl<T: Marshal> Extends<T> for T {
    #[inline]
    fn upcast(&self) -> &T {
        self
    }

    #[inline]
    fn upcast_mut(&mut self) -> &mut T {
        self
    }
}

const ROOT: &str = "value";

/// The conversion engine.
///
/// Holds only immutable options, so one instance can be shared freely
/// between threads.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    options: GrammarOptions,
}

impl Grammar {
    /// Creates an engine with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: GrammarOptions) -> Self {
        Grammar { options }
    }

    #[must_use]
    pub fn options(&self) -> &GrammarOptions {
        &self.options
    }

    /// Returns the cached descriptor of `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// Whatever [`Marshal::describe`] reports for `T`.
    pub fn descriptor<T: Marshal>(&self) -> Result<&'static TypeDescriptor<T>> {
        registry::descriptor::<T>()
    }

    /// Marshals an object into a fresh mapping.
    ///
    /// # Errors
    ///
    /// [`Error::Read`] naming the field whose value could not be converted.
    pub fn marshal<T: Marshal>(&self, object: &T) -> Result<ValueMap> {
        let mut container = ValueMap::new();
        self.marshal_into(object, &mut container)?;
        Ok(container)
    }

    /// Marshals an object into an existing mapping, overwriting keys it
    /// already holds.
    pub fn marshal_into<T: Marshal>(&self, object: &T, container: &mut ValueMap) -> Result<()> {
        let descriptor = self.descriptor::<T>()?;
        self.marshal_with(descriptor, object, container)
    }

    /// Marshals only the fields `object` inherits from `B`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut map = ValueMap::new();
    /// grammar.marshal_as::<Bean, _>(&child, &mut map)?;
    /// ```
    pub fn marshal_as<B: Marshal, T: Extends<B>>(&self, object: &T, container: &mut ValueMap) -> Result<()> {
        self.marshal_into::<B>(<T as Extends<B>>::upcast(object), container)
    }

    fn marshal_with<T>(&self, descriptor: &TypeDescriptor<T>, object: &T, container: &mut ValueMap) -> Result<()> {
        if let Shape::Marshalled { serialise, .. } = descriptor.shape() {
            container.extend(serialise(object)?);
            return Ok(());
        }
        let policy = self.options.policy;
        for field in descriptor.fields() {
            if !policy.reads(field.modifiers()) {
                continue;
            }
            let cx = Context::new(self, field.name()).with_any(field.is_any());
            let value = field
                .read(object, cx)
                .map_err(|e| Error::read(descriptor.name(), field.name(), e))?;
            if value.is_null() && field.is_optional() {
                continue;
            }
            container.insert(field.key().to_string(), value);
        }
        Ok(())
    }

    /// Builds a fresh object from a mapping.
    ///
    /// Records are rebuilt through their canonical constructor; every other
    /// type is created (declared constructor, else zero value) and then
    /// populated in place.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] naming the field whose value could not be committed.
    pub fn unmarshal<T: Marshal>(&self, map: &ValueMap) -> Result<T> {
        let descriptor = self.descriptor::<T>()?;
        if let Shape::Record(canonical) = descriptor.shape() {
            return self.construct_record(descriptor, *canonical, map);
        }
        let mut object = descriptor.instantiate();
        self.unmarshal_with(descriptor, &mut object, map)?;
        Ok(object)
    }

    /// Populates an existing object from a mapping. Keys missing from the
    /// mapping leave their fields untouched.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for records, which cannot change in place.
    pub fn unmarshal_into<T: Marshal>(&self, object: &mut T, map: &ValueMap) -> Result<()> {
        let descriptor = self.descriptor::<T>()?;
        self.unmarshal_with(descriptor, object, map)
    }

    /// Populates only the fields `object` inherits from `B`.
    pub fn unmarshal_as<B: Marshal, T: Extends<B>>(&self, object: &mut T, map: &ValueMap) -> Result<()> {
        self.unmarshal_into::<B>(<T as Extends<B>>::upcast_mut(object), map)
    }

    fn unmarshal_with<T>(&self, descriptor: &TypeDescriptor<T>, object: &mut T, map: &ValueMap) -> Result<()> {
        match descriptor.shape() {
            Shape::Record(_) => {
                return Err(Error::unsupported(format!(
                    "record {} cannot be modified in place",
                    descriptor.name()
                )))
            }
            Shape::Marshalled { deserialise, .. } => return deserialise(object, map),
            Shape::Fields => {}
        }
        if let Some(extras) = descriptor.extras() {
            extras.absorb(object, map);
        }
        let policy = self.options.policy;
        for field in descriptor.fields() {
            if !policy.writes(field.modifiers()) {
                continue;
            }
            let Some(value) = map.get(field.key()) else {
                continue;
            };
            let cx = Context::new(self, field.name()).with_any(field.is_any());
            field
                .write(object, value, cx)
                .map_err(|e| Error::write(descriptor.name(), field.name(), e))?;
        }
        Ok(())
    }

    fn construct_record<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        canonical: fn(&mut Arguments) -> Result<T>,
        map: &ValueMap,
    ) -> Result<T> {
        let mut values = Vec::with_capacity(descriptor.fields().len());
        for field in descriptor.fields() {
            let cx = Context::new(self, field.name()).with_any(field.is_any());
            let argument = field
                .argument(map.get(field.key()), cx)
                .map_err(|e| Error::write(descriptor.name(), field.name(), e))?;
            values.push((field.name(), argument));
        }
        let mut arguments = Arguments::new(descriptor.name(), values);
        let object = canonical(&mut arguments)?;
        arguments.finish()?;
        Ok(object)
    }

    /// Converts a single value into `F`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::{Grammar, Value};
    ///
    /// let numbers: Vec<u8> = Grammar::new().construct(&Value::Array(vec![Value::from(1), Value::from(2)])).unwrap();
    /// assert_eq!(numbers, vec![1, 2]);
    /// ```
    pub fn construct<F: Convert>(&self, value: &Value) -> Result<F> {
        F::construct(value, Context::new(self, ROOT))
    }

    /// Converts a single value into the generic tree.
    pub fn deconstruct<F: Convert>(&self, value: &F) -> Result<Value> {
        value.deconstruct(Context::new(self, ROOT))
    }

    /// Creates a fresh instance of `T` through its resolved constructor.
    pub fn create<T: Marshal>(&self) -> Result<T> {
        Ok(self.descriptor::<T>()?.instantiate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value, Field, FieldPolicy, GrammarOptions, Modifiers};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Thing {
        number: i32,
        word: String,
        secret: String,
        version: u32,
    }

    impl Marshal for Thing {
        fn describe() -> Result<TypeDescriptor<Self>> {
            TypeDescriptor::builder("Thing")
                .field(Field::new("number", |t: &Thing| &t.number, |t: &mut Thing| &mut t.number))
                .field(Field::new("word", |t: &Thing| &t.word, |t: &mut Thing| &mut t.word))
                .field(
                    Field::new("secret", |t: &Thing| &t.secret, |t: &mut Thing| &mut t.secret)
                        .transient(),
                )
                .field(Field::read_only("version", |t: &Thing| &t.version))
                .build()
        }

        fn zero() -> Self {
            Thing::default()
        }
    }

    fn thing() -> Thing {
        Thing {
            number: 10,
            word: "hello".to_string(),
            secret: "hidden".to_string(),
            version: 3,
        }
    }

    #[test]
    fn test_marshal_skips_transient_keeps_final() {
        let map = Grammar::new().marshal(&thing()).unwrap();
        assert_eq!(
            Value::Object(map),
            value!({ "number": 10, "word": "hello", "version": 3 })
        );
    }

    #[test]
    fn test_unmarshal_skips_final() {
        let map = value!({ "number": 1, "word": "w", "version": 99, "secret": "s" });
        let back: Thing = Grammar::new().unmarshal(map.as_object().unwrap()).unwrap();
        assert_eq!(back.version, 0);
        assert_eq!(back.secret, "");
        assert_eq!(back.number, 1);
    }

    #[test]
    fn test_policy_can_admit_final_fields() {
        let grammar = Grammar::with_options(
            GrammarOptions::new().with_policy(FieldPolicy {
                skip_on_read: Modifiers::empty(),
                skip_on_write: Modifiers::empty(),
            }),
        );
        let map = grammar.marshal(&thing()).unwrap();
        assert_eq!(map.get("secret"), Some(&Value::from("hidden")));

        let err = grammar
            .unmarshal::<Thing>(value!({ "version": 2 }).as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(matches!(err.root_cause(), Error::Unsupported(_)));
    }

    #[test]
    fn test_marshal_into_overwrites_existing_keys() {
        let mut container = ValueMap::new();
        container.insert("word".to_string(), Value::from("stale"));
        container.insert("extra".to_string(), Value::Bool(true));
        Grammar::new().marshal_into(&thing(), &mut container).unwrap();
        assert_eq!(container.get("word"), Some(&Value::from("hello")));
        assert_eq!(container.get("extra"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unmarshal_into_leaves_absent_keys() {
        let mut target = thing();
        Grammar::new()
            .unmarshal_into(&mut target, value!({ "number": 42 }).as_object().unwrap())
            .unwrap();
        assert_eq!(target.number, 42);
        assert_eq!(target.word, "hello");
    }

    #[test]
    fn test_write_failure_names_the_field() {
        let err = Grammar::new()
            .unmarshal::<Thing>(value!({ "number": "ten" }).as_object().unwrap())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to write 'Thing.number': value of 'number' could not be mapped to type i32: found string"
        );
    }

    #[test]
    fn test_create_uses_zero_without_declared_constructor() {
        let created: Thing = Grammar::new().create().unwrap();
        assert_eq!(created, Thing::default());
    }

    #[test]
    fn test_reflexive_extends() {
        let mut map = ValueMap::new();
        Grammar::new()
            .marshal_as::<Thing, _>(&thing(), &mut map)
            .unwrap();
        assert_eq!(map.len(), 3);
    }
}

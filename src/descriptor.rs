//! Per-type metadata: the field table the engine walks.
//!
//! A [`TypeDescriptor`] lists, in declaration order, every field of a type
//! together with its key, markers and modifiers, and knows how to create an
//! instance. Types build their descriptor once in
//! [`Marshal::describe`](crate::Marshal::describe); the engine caches it for
//! the rest of the process.
//!
//! ## Shapes
//!
//! - **Fields**: a mutable type whose fields are read and written one by one
//! - **Record**: an immutable type rebuilt through its canonical constructor
//! - **Self-describing**: a type implementing [`Marshalled`], asked to
//!   convert itself
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{Field, Grammar, Marshal, Result, TypeDescriptor, Value, ValueMap};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: Option<String>,
//! }
//!
//! impl Marshal for Point {
//!     fn describe() -> Result<TypeDescriptor<Self>> {
//!         TypeDescriptor::builder("Point")
//!             .field(Field::new("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x))
//!             .field(Field::new("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y))
//!             .field(
//!                 Field::new("label", |p: &Point| &p.label, |p: &mut Point| &mut p.label)
//!                     .rename("name")
//!                     .optional(),
//!             )
//!             .build()
//!     }
//!
//!     fn zero() -> Self {
//!         Point::default()
//!     }
//! }
//!
//! let map = Grammar::new().marshal(&Point { x: 1, y: 2, label: None }).unwrap();
//! assert_eq!(map.keys().collect::<Vec<_>>(), ["x", "y"]);
//! ```

use crate::poly::{self, Permit};
use crate::{Context, Convert, Error, Extends, Kind, Marshal, Marshalled, Result, Value, ValueMap};
use bitflags::bitflags;
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Modifiers of a field, used by [`FieldPolicy`](crate::FieldPolicy) to
    /// decide whether the field takes part in a conversion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
    }
}

type Reader<T> = Arc<dyn Fn(&T, Context<'_>) -> Result<Value> + Send + Sync>;
type Writer<T> = Arc<dyn Fn(&mut T, &Value, Context<'_>) -> Result<()> + Send + Sync>;
type Argument = Arc<dyn Fn(Option<&Value>, Context<'_>) -> Result<Box<dyn Any + Send>> + Send + Sync>;
type Absorb<T> = Box<dyn Fn(&mut T, &ValueMap) + Send + Sync>;

fn reader<T, C>(f: C) -> Reader<T>
where
    C: Fn(&T, Context<'_>) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn writer<T, C>(f: C) -> Writer<T>
where
    C: Fn(&mut T, &Value, Context<'_>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn argument<C>(f: C) -> Argument
where
    C: Fn(Option<&Value>, Context<'_>) -> Result<Box<dyn Any + Send>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A typed field declaration, erased into a [`FieldInfo`] when handed to
/// [`DescriptorBuilder::field`].
///
/// # Examples
///
/// ```rust
/// use grammar::{Field, Modifiers};
///
/// struct Account { id: u64, cache: Vec<u8> }
///
/// let id = Field::new("id", |a: &Account| &a.id, |a: &mut Account| &mut a.id).rename("account_id");
/// let cache = Field::new("cache", |a: &Account| &a.cache, |a: &mut Account| &mut a.cache).transient();
/// # let _ = (id, cache);
/// ```
pub struct Field<T, F> {
    name: &'static str,
    key: Option<String>,
    get: fn(&T) -> &F,
    get_mut: Option<fn(&mut T) -> &mut F>,
    modifiers: Modifiers,
    optional: bool,
    any: bool,
    permits: Vec<Permit<F>>,
}

impl<T, F> Field<T, F> {
    /// Declares a readable and writable field.
    #[must_use]
    pub fn new(name: &'static str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        Field {
            name,
            key: None,
            get,
            get_mut: Some(get_mut),
            modifiers: Modifiers::empty(),
            optional: false,
            any: false,
            permits: Vec::new(),
        }
    }

    /// Declares a `FINAL` field: marshalled, never unmarshalled.
    ///
    /// Record components are declared this way.
    #[must_use]
    pub fn read_only(name: &'static str, get: fn(&T) -> &F) -> Self {
        Field {
            name,
            key: None,
            get,
            get_mut: None,
            modifiers: Modifiers::FINAL,
            optional: false,
            any: false,
            permits: Vec::new(),
        }
    }

    /// Stores the field under `key` instead of its name, in both directions.
    #[must_use]
    pub fn rename(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Omits the key when the field marshals to null.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Lets the field hold any subtype; nested objects are converted with
    /// their runtime type instead of the declared one.
    #[must_use]
    pub fn any(mut self) -> Self {
        self.any = true;
        self
    }

    /// Whitelists a type a stored value may be constructed as.
    ///
    /// Permits are tried in declaration order; the first whose
    /// [`Kind`] accepts the stored value wins. Implies [`any`](Self::any).
    #[must_use]
    pub fn permit(mut self, permit: Permit<F>) -> Self {
        self.permits.push(permit);
        self.any = true;
        self
    }

    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn transient(self) -> Self {
        self.modifiers(Modifiers::TRANSIENT)
    }

    #[must_use]
    pub fn synthetic(self) -> Self {
        self.modifiers(Modifiers::SYNTHETIC)
    }

    /// Marks a type-level constant (`STATIC | FINAL`).
    #[must_use]
    pub fn constant(self) -> Self {
        self.modifiers(Modifiers::STATIC | Modifiers::FINAL)
    }
}

impl<T: 'static, F: Convert> Field<T, F> {
    fn erase(self) -> FieldInfo<T> {
        let permit_names = self.permits.iter().map(Permit::name).collect();
        let permits: Arc<[Permit<F>]> = Arc::from(self.permits);

        let get = self.get;
        let read = reader(move |object: &T, cx: Context<'_>| get(object).deconstruct(cx));

        let write = self.get_mut.map(|get_mut| {
            let permits = Arc::clone(&permits);
            writer(move |object: &mut T, value: &Value, cx: Context<'_>| {
                prepare_field_value(get_mut(object), &permits, value, cx)
            })
        });

        let build = argument(move |value: Option<&Value>, cx: Context<'_>| {
            let component = match value {
                Some(value) => construct_permitted(&permits, value, cx)?,
                None => match F::absent() {
                    Some(zero) => zero,
                    None => construct_permitted(&permits, &Value::Null, cx)?,
                },
            };
            Ok(Box::new(component) as Box<dyn Any + Send>)
        });

        FieldInfo {
            name: self.name,
            key: self.key.unwrap_or_else(|| self.name.to_string()),
            type_name: std::any::type_name::<F>(),
            kind: F::KIND,
            modifiers: self.modifiers,
            optional: self.optional,
            any: self.any,
            permits: permit_names,
            read,
            write,
            argument: build,
        }
    }
}

/// Commits a stored value into a field slot.
///
/// Fields with permitted subtypes construct the first matching permit and
/// replace the slot; every other field delegates to [`Convert::commit`],
/// which merges objects and refills collections in place.
pub fn prepare_field_value<F: Convert>(
    slot: &mut F,
    permits: &[Permit<F>],
    value: &Value,
    cx: Context<'_>,
) -> Result<()> {
    if !permits.is_empty() && !value.is_null() {
        *slot = poly::resolve(permits, value, cx)?;
        Ok(())
    } else {
        slot.commit(value, cx)
    }
}

fn construct_permitted<F: Convert>(permits: &[Permit<F>], value: &Value, cx: Context<'_>) -> Result<F> {
    if !permits.is_empty() && !value.is_null() {
        poly::resolve(permits, value, cx)
    } else {
        F::construct(value, cx)
    }
}

/// A field of `T` with its value type erased.
pub struct FieldInfo<T> {
    name: &'static str,
    key: String,
    type_name: &'static str,
    kind: Kind,
    modifiers: Modifiers,
    optional: bool,
    any: bool,
    permits: Vec<&'static str>,
    read: Reader<T>,
    write: Option<Writer<T>>,
    argument: Argument,
}

impl<T> FieldInfo<T> {
    /// The declared field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key the field is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The declared value type, as reported by `std::any::type_name`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        self.any
    }

    /// Names of the permitted subtypes, in resolution order.
    #[must_use]
    pub fn permits(&self) -> &[&'static str] {
        &self.permits
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    pub(crate) fn read(&self, object: &T, cx: Context<'_>) -> Result<Value> {
        (self.read)(object, cx)
    }

    pub(crate) fn write(&self, object: &mut T, value: &Value, cx: Context<'_>) -> Result<()> {
        match &self.write {
            Some(write) => write(object, value, cx),
            None => Err(Error::unsupported(format!(
                "field '{}' is read-only",
                self.name
            ))),
        }
    }

    pub(crate) fn argument(&self, value: Option<&Value>, cx: Context<'_>) -> Result<Box<dyn Any + Send>> {
        (self.argument)(value, cx)
    }
}

impl<B: 'static> FieldInfo<B> {
    /// Re-targets an inherited field at a type embedding `B`.
    fn lift<T: 'static>(&self, up: fn(&T) -> &B, up_mut: fn(&mut T) -> &mut B) -> FieldInfo<T> {
        let read = Arc::clone(&self.read);
        let write = self.write.as_ref().map(|write| {
            let write = Arc::clone(write);
            writer(move |object: &mut T, value: &Value, cx: Context<'_>| write(up_mut(object), value, cx))
        });
        FieldInfo {
            name: self.name,
            key: self.key.clone(),
            type_name: self.type_name,
            kind: self.kind,
            modifiers: self.modifiers,
            optional: self.optional,
            any: self.any,
            permits: self.permits.clone(),
            read: reader(move |object: &T, cx: Context<'_>| read(up(object), cx)),
            write,
            argument: Arc::clone(&self.argument),
        }
    }
}

impl<T> fmt::Debug for FieldInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("modifiers", &self.modifiers)
            .field("optional", &self.optional)
            .field("any", &self.any)
            .field("permits", &self.permits)
            .finish()
    }
}

/// Positional arguments for a record's canonical constructor.
///
/// Components are handed out in declaration order; each call to
/// [`next`](Self::next) must request the component's exact type.
pub struct Arguments {
    owner: &'static str,
    values: std::vec::IntoIter<(&'static str, Box<dyn Any + Send>)>,
}

impl Arguments {
    pub(crate) fn new(owner: &'static str, values: Vec<(&'static str, Box<dyn Any + Send>)>) -> Self {
        Arguments {
            owner,
            values: values.into_iter(),
        }
    }

    /// Takes the next component.
    ///
    /// # Errors
    ///
    /// A configuration error if every component was already taken or the
    /// component is not an `F`.
    pub fn next<F: 'static>(&mut self) -> Result<F> {
        let (name, value) = self.values.next().ok_or_else(|| {
            Error::configuration(format!(
                "canonical constructor of {} takes more arguments than it has components",
                self.owner
            ))
        })?;
        value.downcast::<F>().map(|value| *value).map_err(|_| {
            Error::configuration(format!(
                "component '{}.{}' is not of type {}",
                self.owner,
                name,
                std::any::type_name::<F>()
            ))
        })
    }

    /// Number of components not yet taken.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn finish(self) -> Result<()> {
        match self.values.len() {
            0 => Ok(()),
            left => Err(Error::configuration(format!(
                "canonical constructor of {} left {} components unused",
                self.owner, left
            ))),
        }
    }
}

/// A field able to act as the extras container: it receives every entry of
/// an unmarshalled mapping.
pub trait ExtrasSlot: Send + Sync + 'static {
    fn absorb(&mut self, map: &ValueMap);
}

impl ExtrasSlot for ValueMap {
    fn absorb(&mut self, map: &ValueMap) {
        self.merge(map);
    }
}

impl ExtrasSlot for Option<ValueMap> {
    fn absorb(&mut self, map: &ValueMap) {
        self.get_or_insert_with(ValueMap::new).merge(map);
    }
}

pub(crate) struct Extras<T> {
    name: &'static str,
    absorb: Absorb<T>,
}

impl<T> Extras<T> {
    pub(crate) fn absorb(&self, object: &mut T, map: &ValueMap) {
        (self.absorb)(object, map);
    }
}

pub(crate) enum Shape<T> {
    Fields,
    Record(fn(&mut Arguments) -> Result<T>),
    Marshalled {
        serialise: fn(&T) -> Result<ValueMap>,
        deserialise: fn(&mut T, &ValueMap) -> Result<()>,
    },
}

enum Constructor<T> {
    Declared(fn() -> T),
    Zero(fn() -> T),
}

/// The cached metadata of one type.
pub struct TypeDescriptor<T> {
    name: &'static str,
    shape: Shape<T>,
    fields: Vec<FieldInfo<T>>,
    extras: Option<Extras<T>>,
    constructor: Constructor<T>,
}

impl<T: Marshal> TypeDescriptor<T> {
    /// Starts describing a type whose fields are read and written one by one.
    #[must_use]
    pub fn builder(name: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name, false)
    }

    /// Starts describing a record: an immutable type whose components are
    /// declared as fields and which is rebuilt through
    /// [`canonical`](DescriptorBuilder::canonical).
    #[must_use]
    pub fn record(name: &'static str) -> DescriptorBuilder<T> {
        DescriptorBuilder::new(name, true)
    }
}

impl<T> TypeDescriptor<T> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in conversion order: inherited fields first.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo<T>] {
        &self.fields
    }

    /// Looks a field up by its key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldInfo<T>> {
        self.fields.iter().find(|field| field.key == key)
    }

    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self.shape, Shape::Record(_))
    }

    #[must_use]
    pub fn is_self_describing(&self) -> bool {
        matches!(self.shape, Shape::Marshalled { .. })
    }

    #[must_use]
    pub fn has_extras(&self) -> bool {
        self.extras.is_some()
    }

    /// Name of the extras container, if the type has one.
    #[must_use]
    pub fn extras_name(&self) -> Option<&'static str> {
        self.extras.as_ref().map(|extras| extras.name)
    }

    #[must_use]
    pub fn has_declared_constructor(&self) -> bool {
        matches!(self.constructor, Constructor::Declared(_))
    }

    /// Creates a fresh instance: the declared constructor if there is one,
    /// the type's zero value otherwise.
    #[must_use]
    pub fn instantiate(&self) -> T {
        match self.constructor {
            Constructor::Declared(make) | Constructor::Zero(make) => make(),
        }
    }

    pub(crate) fn shape(&self) -> &Shape<T> {
        &self.shape
    }

    pub(crate) fn extras(&self) -> Option<&Extras<T>> {
        self.extras.as_ref()
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("record", &self.is_record())
            .field("self_describing", &self.is_self_describing())
            .field("fields", &self.fields)
            .field("extras", &self.extras_name())
            .finish()
    }
}

/// Collects the fields and markers of a type, validated by
/// [`build`](Self::build).
pub struct DescriptorBuilder<T> {
    name: &'static str,
    record: bool,
    fields: Vec<FieldInfo<T>>,
    extras: Option<Extras<T>>,
    constructor: Option<fn() -> T>,
    canonical: Option<fn(&mut Arguments) -> Result<T>>,
    marshalled: Option<(fn(&T) -> Result<ValueMap>, fn(&mut T, &ValueMap) -> Result<()>)>,
    error: Option<Error>,
}

impl<T: Marshal> DescriptorBuilder<T> {
    fn new(name: &'static str, record: bool) -> Self {
        DescriptorBuilder {
            name,
            record,
            fields: Vec::new(),
            extras: None,
            constructor: None,
            canonical: None,
            marshalled: None,
            error: None,
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(Error::configuration(message));
        }
    }

    /// Appends a field (or, for records, a component).
    #[must_use]
    pub fn field<F: Convert>(mut self, field: Field<T, F>) -> Self {
        self.fields.push(field.erase());
        self
    }

    /// Appends every field of the base type `B`, read and written through
    /// the embedded `B`.
    #[must_use]
    pub fn inherit<B: Marshal>(mut self) -> Self
    where
        T: Extends<B>,
    {
        if TypeId::of::<B>() == TypeId::of::<T>() {
            self.fail(format!("{} cannot inherit from itself", self.name));
            return self;
        }
        match crate::registry::descriptor::<B>() {
            Ok(base) if matches!(base.shape, Shape::Fields) => {
                let up: fn(&T) -> &B = <T as Extends<B>>::upcast;
                let up_mut: fn(&mut T) -> &mut B = <T as Extends<B>>::upcast_mut;
                self.fields
                    .extend(base.fields.iter().map(|field| field.lift(up, up_mut)));
            }
            Ok(base) => self.fail(format!(
                "{} cannot inherit from {}: only plain field types can be inherited",
                self.name, base.name
            )),
            Err(error) => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
            }
        }
        self
    }

    /// Designates the extras container: a field that receives every entry of
    /// an unmarshalled mapping and is never marshalled itself.
    #[must_use]
    pub fn extras<E: ExtrasSlot>(mut self, name: &'static str, get_mut: fn(&mut T) -> &mut E) -> Self {
        if let Some(existing) = &self.extras {
            let message = format!(
                "{} declares two extras containers: '{}' and '{}'",
                self.name, existing.name, name
            );
            self.fail(message);
            return self;
        }
        self.extras = Some(Extras {
            name,
            absorb: Box::new(move |object: &mut T, map: &ValueMap| get_mut(object).absorb(map)),
        });
        self
    }

    /// Declares the no-argument constructor used for fresh instances.
    #[must_use]
    pub fn constructor(mut self, make: fn() -> T) -> Self {
        self.constructor = Some(make);
        self
    }

    /// Declares the canonical constructor of a record.
    #[must_use]
    pub fn canonical(mut self, make: fn(&mut Arguments) -> Result<T>) -> Self {
        self.canonical = Some(make);
        self
    }

    /// Hands conversion over to the type's [`Marshalled`] implementation.
    #[must_use]
    pub fn self_describing(mut self) -> Self
    where
        T: Marshalled,
    {
        self.marshalled = Some((<T as Marshalled>::serialise, <T as Marshalled>::deserialise));
        self
    }

    /// Validates the declaration.
    ///
    /// # Errors
    ///
    /// A configuration error if a record has no canonical constructor or an
    /// extras container, a non-record declares a canonical constructor, a
    /// self-describing type declares fields, two fields share a key, or an
    /// earlier builder call failed.
    pub fn build(self) -> Result<TypeDescriptor<T>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let name = self.name;

        let mut keys = HashSet::new();
        for field in &self.fields {
            if !keys.insert(field.key.as_str()) {
                return Err(Error::configuration(format!(
                    "{} declares the key '{}' twice",
                    name, field.key
                )));
            }
        }

        let shape = match (self.record, self.canonical, self.marshalled) {
            (true, _, Some(_)) => {
                return Err(Error::configuration(format!(
                    "record {} cannot be self-describing",
                    name
                )))
            }
            (true, None, None) => {
                return Err(Error::configuration(format!(
                    "record {} has no canonical constructor",
                    name
                )))
            }
            (true, Some(canonical), None) => {
                if self.extras.is_some() {
                    return Err(Error::configuration(format!(
                        "record {} cannot have an extras container",
                        name
                    )));
                }
                Shape::Record(canonical)
            }
            (false, Some(_), _) => {
                return Err(Error::configuration(format!(
                    "{} is not a record but declares a canonical constructor",
                    name
                )))
            }
            (false, None, Some((serialise, deserialise))) => {
                if !self.fields.is_empty() || self.extras.is_some() {
                    return Err(Error::configuration(format!(
                        "self-describing type {} cannot declare fields",
                        name
                    )));
                }
                Shape::Marshalled {
                    serialise,
                    deserialise,
                }
            }
            (false, None, None) => Shape::Fields,
        };

        let constructor = match self.constructor {
            Some(make) => Constructor::Declared(make),
            None => Constructor::Zero(T::zero),
        };

        Ok(TypeDescriptor {
            name,
            shape,
            fields: self.fields,
            extras: self.extras,
            constructor,
        })
    }
}

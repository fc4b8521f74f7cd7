//! # grammar
//!
//! Marshal Rust objects to and from a generic tree of primitive values.
//!
//! ## What does it do?
//!
//! `grammar` converts objects into a [`ValueMap`]: an ordered mapping of
//! strings, numbers, booleans, sequences and nested mappings. It rebuilds
//! objects from such a tree, or updates existing objects in place. Writing
//! the tree out as JSON, YAML or anything else is left to the caller;
//! [`Value`] implements `serde::Serialize` and `serde::Deserialize` for that.
//!
//! ## Key Features
//!
//! - **Descriptor driven**: each type declares its fields once in
//!   [`Marshal::describe`]; the engine caches the result per type
//! - **Field markers**: renamed keys, optional fields, transient and final fields
//! - **Nested objects**: merged into existing instances or replaced
//! - **Collections, maps and arrays**: element types come from the declaration
//! - **Records**: immutable types rebuilt through a canonical constructor
//! - **Open polymorphism**: [`Poly`] and [`Dynamic`] fields keep their runtime type,
//!   [`Permit`]s whitelist what a stored value may become
//! - **Extras container**: one field per type can catch every key of the input
//! - **Self-describing types**: implement [`Marshalled`] to take over entirely
//!
//! ## Quick Start
//!
//! ```rust
//! use grammar::{value, Field, Marshal, Result, TypeDescriptor, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! impl Marshal for User {
//!     fn describe() -> Result<TypeDescriptor<Self>> {
//!         TypeDescriptor::builder("User")
//!             .field(Field::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id))
//!             .field(Field::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name))
//!             .field(Field::new("active", |u: &User| &u.active, |u: &mut User| &mut u.active))
//!             .build()
//!     }
//!
//!     fn zero() -> Self {
//!         User::default()
//!     }
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let map = grammar::marshal(&user).unwrap();
//! assert_eq!(
//!     Value::Object(map.clone()),
//!     value!({ "id": 123, "name": "Alice", "active": true })
//! );
//!
//! let back: User = grammar::unmarshal(&map).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ### Records
//!
//! ```rust
//! use grammar::{value, Field, Marshal, Result, TypeDescriptor};
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Marshal for Person {
//!     fn describe() -> Result<TypeDescriptor<Self>> {
//!         TypeDescriptor::record("Person")
//!             .field(Field::read_only("name", |p: &Person| &p.name))
//!             .field(Field::read_only("age", |p: &Person| &p.age))
//!             .canonical(|args| Ok(Person { name: args.next()?, age: args.next()? }))
//!             .build()
//!     }
//!
//!     fn zero() -> Self {
//!         Person { name: String::new(), age: 0 }
//!     }
//! }
//!
//! let stored = value!({ "age": 61, "name": "Bearimy" });
//! let person: Person = grammar::unmarshal(stored.as_object().unwrap()).unwrap();
//! assert_eq!(person, Person { name: "Bearimy".to_string(), age: 61 });
//! ```
//!
//! ## Guarantees
//!
//! - Marshalling then unmarshalling yields an equal object for every field
//!   that takes part in both directions
//! - Every failure names the type and field it happened in
//! - No `unsafe` code
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - marshalling a plain type and reading it back
//! - **`polymorphism.rs`** - inheritance, `Poly` fields and permits
//! - **`dynamic_values.rs`** - working with `Value` trees and extras containers
//! - **`custom_options.rs`** - field policies, replace mode and enum resolution
//!
//! Run any example with: `cargo run --example <name>`

pub mod convert;
pub mod descriptor;
pub mod engine;
pub mod enumeration;
pub mod error;
pub mod macros;
pub mod map;
pub mod object;
pub mod options;
pub mod poly;
pub mod registry;
pub mod value;

pub use convert::{Context, Convert, Kind, MapKey};
pub use descriptor::{
    prepare_field_value, Arguments, DescriptorBuilder, ExtrasSlot, Field, FieldInfo, Modifiers,
    TypeDescriptor,
};
pub use engine::{Extends, Grammar, Marshal, Marshalled};
pub use enumeration::Enumeration;
pub use error::{Error, Result};
pub use map::ValueMap;
pub use options::{EnumResolution, FieldPolicy, GrammarOptions, ObjectUpdate};
pub use poly::{Dynamic, Erased, Permit, Poly, Subtype, Wrap};
pub use registry::RegistryStats;
pub use value::{Number, Value};

/// Marshals an object with the default engine.
///
/// # Errors
///
/// [`Error::Read`] naming the field whose value could not be converted.
pub fn marshal<T: Marshal>(object: &T) -> Result<ValueMap> {
    Grammar::default().marshal(object)
}

/// Builds an object from a mapping with the default engine.
///
/// # Errors
///
/// [`Error::Write`] naming the field whose value could not be committed,
/// or a configuration error from the type's descriptor.
pub fn unmarshal<T: Marshal>(map: &ValueMap) -> Result<T> {
    Grammar::default().unmarshal(map)
}

/// Updates an object in place from a mapping with the default engine.
///
/// # Errors
///
/// [`Error::Write`] naming the failing field, or [`Error::Unsupported`] if
/// `T` is a record.
pub fn unmarshal_into<T: Marshal>(object: &mut T, map: &ValueMap) -> Result<()> {
    Grammar::default().unmarshal_into(object, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Marshal for Point {
        fn describe() -> Result<TypeDescriptor<Self>> {
            TypeDescriptor::builder("Point")
                .field(Field::new("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x))
                .field(Field::new("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y))
                .build()
        }

        fn zero() -> Self {
            Point::default()
        }
    }

    #[test]
    fn test_marshal_unmarshal_point() {
        let point = Point { x: 1, y: 2 };
        let map = marshal(&point).unwrap();
        let back: Point = unmarshal(&map).unwrap();
        assert_eq!(point, back);
    }

    #[test]
    fn test_unmarshal_into_point() {
        let mut point = Point { x: 1, y: 2 };
        unmarshal_into(&mut point, value!({ "y": 5 }).as_object().unwrap()).unwrap();
        assert_eq!(point, Point { x: 1, y: 5 });
    }

    #[test]
    fn test_marshalled_tree_through_serde_json() {
        let map = marshal(&Point { x: 3, y: 4 }).unwrap();
        let json = serde_json::to_string(&Value::Object(map)).unwrap();
        assert_eq!(json, r#"{"x":3,"y":4}"#);

        let parsed: Value = serde_json::from_str(&json).unwrap();
        let back: Point = unmarshal(parsed.as_object().unwrap()).unwrap();
        assert_eq!(back, Point { x: 3, y: 4 });
    }
}

//! Marshalling a plain type and reading it back.
//!
//! Run with: cargo run --example simple

use grammar::{impl_convert, Field, Grammar, Marshal, Result, TypeDescriptor, Value};
use std::error::Error;

#[derive(Debug, Default, Clone, PartialEq)]
struct Address {
    street: String,
    city: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: Option<String>,
    addresses: Vec<Address>,
}

impl Marshal for Address {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Address")
            .field(Field::new("street", |a: &Address| &a.street, |a: &mut Address| &mut a.street))
            .field(Field::new("city", |a: &Address| &a.city, |a: &mut Address| &mut a.city))
            .build()
    }

    fn zero() -> Self {
        Address::default()
    }
}

impl Marshal for User {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("User")
            .field(Field::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id))
            .field(Field::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name))
            .field(Field::new("email", |u: &User| &u.email, |u: &mut User| &mut u.email).optional())
            .field(Field::new("addresses", |u: &User| &u.addresses, |u: &mut User| &mut u.addresses))
            .build()
    }

    fn zero() -> Self {
        User::default()
    }
}

impl_convert!(Address);

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let user = User {
        id: 42,
        name: "Alice Johnson".to_string(),
        email: None,
        addresses: vec![Address {
            street: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
        }],
    };

    let grammar = Grammar::new();

    // Marshal to a value tree; the optional email is left out
    let map = grammar.marshal(&user)?;
    println!("Marshalled:\n{}\n", serde_json::to_string_pretty(&Value::Object(map.clone()))?);

    // Build a fresh object from the tree
    let back: User = grammar.unmarshal(&map)?;
    assert_eq!(user, back);
    println!("✓ Round-trip successful");

    // Update an existing object; missing keys keep their values
    let mut patch = grammar.marshal(&User::default())?;
    patch.remove("addresses");
    patch.remove("id");
    let mut updated = user.clone();
    grammar.unmarshal_into(&mut updated, &patch)?;
    println!("Updated in place: {:?}", updated);

    Ok(())
}

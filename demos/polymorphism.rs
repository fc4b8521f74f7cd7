//! Inheritance, `Poly` fields and permitted subtypes.
//!
//! Run with: cargo run --example polymorphism

use grammar::{
    impl_convert, value, Dynamic, Extends, Field, Grammar, Marshal, Permit, Poly, Result,
    TypeDescriptor, Value, ValueMap,
};
use std::error::Error;

#[derive(Debug, Default, Clone)]
struct Animal {
    name: String,
}

#[derive(Debug, Default, Clone)]
struct Dog {
    animal: Animal,
    good: bool,
}

impl Marshal for Animal {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Animal")
            .field(Field::new("name", |a: &Animal| &a.name, |a: &mut Animal| &mut a.name))
            .build()
    }

    fn zero() -> Self {
        Animal::default()
    }
}

impl Marshal for Dog {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Dog")
            .inherit::<Animal>()
            .field(Field::new("good", |d: &Dog| &d.good, |d: &mut Dog| &mut d.good))
            .build()
    }

    fn zero() -> Self {
        Dog::default()
    }
}

impl Extends<Animal> for Dog {
    fn upcast(&self) -> &Animal {
        &self.animal
    }

    fn upcast_mut(&mut self) -> &mut Animal {
        &mut self.animal
    }
}

impl_convert!(Animal, Dog);

struct Shelter {
    resident: Poly<Animal>,
    label: Dynamic,
}

impl Marshal for Shelter {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Shelter")
            .field(
                Field::new("resident", |s: &Shelter| &s.resident, |s: &mut Shelter| &mut s.resident)
                    .any(),
            )
            .field(
                Field::new("label", |s: &Shelter| &s.label, |s: &mut Shelter| &mut s.label)
                    .permit(Permit::of::<i64>())
                    .permit(Permit::of::<String>())
                    .permit(Permit::of::<Animal>()),
            )
            .build()
    }

    fn zero() -> Self {
        Shelter {
            resident: Poly::new(Animal::default()),
            label: Dynamic::null(),
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let grammar = Grammar::new();
    let dog = Dog {
        animal: Animal {
            name: "Rex".to_string(),
        },
        good: true,
    };

    // A field marked `any` keeps the runtime type's fields
    let mut shelter = Shelter {
        resident: Poly::new(dog.clone()),
        label: Dynamic::new(7i64),
    };
    let map = grammar.marshal(&shelter)?;
    println!("Shelter: {}", Value::Object(map));

    // Only the inherited part
    let mut base = ValueMap::new();
    grammar.marshal_as::<Animal, _>(&dog, &mut base)?;
    println!("As animal: {}", Value::Object(base));

    // Updates reach the runtime type
    let update = value!({ "resident": { "good": false }, "label": "kennel 4" });
    grammar.unmarshal_into(&mut shelter, update.as_object().ok_or("not a mapping")?)?;
    if let Some(dog) = shelter.resident.downcast_ref::<Dog>() {
        println!("Still a dog named {}, good: {}", dog.animal.name, dog.good);
    }

    // Permits pick the first type able to take the stored value
    for stored in [value!(3), value!("spare"), value!({ "name": "Tom" })] {
        let update = value!({ "label": stored });
        grammar.unmarshal_into(&mut shelter, update.as_object().ok_or("not a mapping")?)?;
        println!("label is now a {}", shelter.label.type_name());
    }

    Ok(())
}

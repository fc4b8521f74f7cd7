//! Customizing the engine with GrammarOptions.
//!
//! Run with: cargo run --example custom_options

use grammar::{
    enumeration, impl_convert, value, EnumResolution, Field, Grammar, GrammarOptions, Marshal,
    Modifiers, ObjectUpdate, Result, TypeDescriptor, Value,
};
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Low,
    High,
}

enumeration!(Level { Low = "LOW", High = "HIGH" });

#[derive(Debug, Clone, PartialEq)]
struct Limits {
    min: i32,
    max: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct Session {
    user: String,
    token: String,
    level: Level,
    limits: Limits,
}

impl Marshal for Limits {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Limits")
            .field(Field::new("min", |l: &Limits| &l.min, |l: &mut Limits| &mut l.min))
            .field(Field::new("max", |l: &Limits| &l.max, |l: &mut Limits| &mut l.max))
            .build()
    }

    fn zero() -> Self {
        Limits { min: 0, max: 100 }
    }
}

impl Marshal for Session {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Session")
            .field(Field::new("user", |s: &Session| &s.user, |s: &mut Session| &mut s.user))
            .field(Field::new("token", |s: &Session| &s.token, |s: &mut Session| &mut s.token).transient())
            .field(Field::new("level", |s: &Session| &s.level, |s: &mut Session| &mut s.level))
            .field(Field::new("limits", |s: &Session| &s.limits, |s: &mut Session| &mut s.limits))
            .build()
    }

    fn zero() -> Self {
        Session {
            user: String::new(),
            token: String::new(),
            level: Level::Low,
            limits: Limits::zero(),
        }
    }
}

impl_convert!(Limits);

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let session = Session {
        user: "alice".to_string(),
        token: "s3cr3t".to_string(),
        level: Level::High,
        limits: Limits { min: 5, max: 50 },
    };

    // Default: transient fields are skipped
    println!("Default:");
    let map = Grammar::new().marshal(&session)?;
    println!("{}\n", Value::Object(map));

    // Include transient fields
    println!("Transient fields included:");
    let verbose = Grammar::with_options(GrammarOptions::new().with_skip_on_read(Modifiers::STATIC));
    println!("{}\n", Value::Object(verbose.marshal(&session)?));

    // Nested objects merge by default and are replaced on request
    let update = value!({ "limits": { "max": 10 } });
    let update = update.as_object().ok_or("not a mapping")?;

    let mut merged = session.clone();
    Grammar::new().unmarshal_into(&mut merged, update)?;
    println!("Merged limits:   {:?}", merged.limits);

    let mut replaced = session.clone();
    Grammar::with_options(GrammarOptions::new().with_object_update(ObjectUpdate::Replace))
        .unmarshal_into(&mut replaced, update)?;
    println!("Replaced limits: {:?}\n", replaced.limits);

    // Enumerations resolve by name or ordinal unless restricted
    let by_ordinal = value!({ "level": 0 });
    let by_ordinal = by_ordinal.as_object().ok_or("not a mapping")?;
    let mut lenient = session.clone();
    Grammar::new().unmarshal_into(&mut lenient, by_ordinal)?;
    println!("Ordinal 0 resolved to {:?}", lenient.level);

    let strict = Grammar::with_options(GrammarOptions::new().with_enum_resolution(EnumResolution::Name));
    match strict.unmarshal_into(&mut session.clone(), by_ordinal) {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("Name-only resolution: {}", e),
    }

    Ok(())
}

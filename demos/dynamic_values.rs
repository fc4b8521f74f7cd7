//! Working with `Value` trees and extras containers.
//!
//! Run with: cargo run --example dynamic_values

use grammar::{value, Field, Grammar, Marshal, Result, TypeDescriptor, Value, ValueMap};
use std::error::Error;

#[derive(Debug, Default)]
struct Config {
    host: String,
    port: u16,
    features: Vec<String>,
    everything: ValueMap,
}

impl Marshal for Config {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Config")
            .field(Field::new("host", |c: &Config| &c.host, |c: &mut Config| &mut c.host))
            .field(Field::new("port", |c: &Config| &c.port, |c: &mut Config| &mut c.port))
            .field(Field::new("features", |c: &Config| &c.features, |c: &mut Config| &mut c.features))
            .extras("everything", |c: &mut Config| &mut c.everything)
            .build()
    }

    fn zero() -> Self {
        Config::default()
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    // Build a tree dynamically with the value! macro
    let tree = value!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true
    });

    // Access values dynamically
    if let Value::Object(obj) = &tree {
        if let Some(Value::String(host)) = obj.get("host") {
            println!("Accessing field 'host': {}", host);
        }

        if let Some(port) = obj.get("port").and_then(|v| v.as_i64()) {
            println!("Accessing field 'port': {}", port);
        }

        if let Some(Value::Array(features)) = obj.get("features") {
            println!("Accessing field 'features': {} items\n", features.len());
        }
    }

    // Unknown keys land in the extras container along with the rest
    let map = tree.as_object().ok_or("not a mapping")?;
    let config: Config = Grammar::new().unmarshal(map)?;
    println!("Config: {}:{} {:?}", config.host, config.port, config.features);
    println!("Extras saw {} keys, debug = {:?}", config.everything.len(), config.everything.get("debug"));

    // The extras container is never marshalled
    let out = Grammar::new().marshal(&config)?;
    assert!(!out.contains_key("everything"));
    assert!(!out.contains_key("debug"));

    // Value trees go through any serde format
    let json = serde_json::to_string(&Value::Object(out))?;
    println!("\nAs JSON: {}", json);
    let parsed: Value = serde_json::from_str(&json)?;
    println!("Parsed back, {} keys", parsed.as_object().map_or(0, ValueMap::len));

    Ok(())
}

use grammar::{
    enumeration, impl_convert, value, Enumeration, Field, Grammar, Marshal, Number, Result,
    TypeDescriptor, Value, ValueMap,
};
use std::collections::HashMap;

#[test]
fn test_value_macro_null() {
    let value = value!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_value_macro_numbers() {
    let int_val = value!(42);
    assert_eq!(int_val, Value::Number(Number::Integer(42)));

    let float_val = value!(3.5);
    assert_eq!(float_val, Value::Number(Number::Float(3.5)));

    let negative_val = value!(-123);
    assert_eq!(negative_val, Value::Number(Number::Integer(-123)));

    // negatives inside literals need parentheses
    let nested = value!([(-1), 2]);
    assert_eq!(nested.as_array().unwrap()[0], Value::from(-1));
}

#[test]
fn test_value_macro_nested() {
    let nested = value!({
        "user": {
            "id": 123,
            "name": "Bob",
            "active": true
        },
        "tags": ["admin", "developer"],
        "count": 42
    });

    let obj = nested.as_object().unwrap();
    assert_eq!(obj.len(), 3);

    if let Some(Value::Object(user)) = obj.get("user") {
        assert_eq!(user.get("id"), Some(&Value::Number(Number::Integer(123))));
        assert_eq!(user.get("name"), Some(&Value::String("Bob".to_string())));
        assert_eq!(user.get("active"), Some(&Value::Bool(true)));
    } else {
        panic!("Expected user to be an object");
    }

    if let Some(Value::Array(tags)) = obj.get("tags") {
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], Value::String("admin".to_string()));
    } else {
        panic!("Expected tags to be an array");
    }

    // keys keep their declaration order
    let keys: Vec<&String> = obj.keys().collect();
    assert_eq!(keys, vec!["user", "tags", "count"]);
}

#[test]
fn test_value_methods() {
    let null_val = value!(null);
    assert!(null_val.is_null());
    assert!(!null_val.is_bool());
    assert!(!null_val.is_number());
    assert!(!null_val.is_string());
    assert!(!null_val.is_array());
    assert!(!null_val.is_object());

    let str_val = value!("hello");
    assert_eq!(str_val.as_str(), Some("hello"));
    assert_eq!(str_val.type_name(), "string");

    let array_val = value!([1, 2, 3]);
    assert_eq!(array_val.as_array().unwrap().len(), 3);
    assert_eq!(array_val.type_name(), "sequence");

    let obj_val = value!({"key": "value"});
    assert_eq!(obj_val.as_object().unwrap().len(), 1);
    assert_eq!(obj_val.type_name(), "mapping");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Colour {
    Red,
    Green,
    Blue,
}

enumeration!(Colour { Red = "RED", Green = "GREEN", Blue });

#[test]
fn test_enumeration_macro() {
    assert_eq!(Colour::NAME, "Colour");
    assert_eq!(Colour::Red.name(), "RED");
    assert_eq!(Colour::Blue.name(), "Blue");
    assert_eq!(Colour::Green.ordinal(), 1);
    assert_eq!(Colour::from_name("GREEN"), Some(Colour::Green));
    assert_eq!(Colour::from_name("Green"), None);
    assert_eq!(Colour::from_ordinal(2), Some(Colour::Blue));
    assert_eq!(Colour::from_ordinal(3), None);
}

#[test]
fn test_enumeration_as_map_value() {
    let grammar = Grammar::new();
    let mut palette = HashMap::new();
    palette.insert("sky".to_string(), Colour::Blue);

    let value = grammar.deconstruct(&palette).unwrap();
    assert_eq!(value, value!({ "sky": "Blue" }));

    let back: HashMap<String, Colour> = grammar.construct(&value).unwrap();
    assert_eq!(back, palette);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Pixel {
    x: u16,
    y: u16,
}

impl Marshal for Pixel {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Pixel")
            .field(Field::new("x", |p: &Pixel| &p.x, |p: &mut Pixel| &mut p.x))
            .field(Field::new("y", |p: &Pixel| &p.y, |p: &mut Pixel| &mut p.y))
            .build()
    }

    fn zero() -> Self {
        Pixel::default()
    }
}

impl_convert!(Pixel);

#[test]
fn test_impl_convert_macro() {
    let grammar = Grammar::new();
    let pixels = vec![Pixel { x: 1, y: 2 }, Pixel { x: 3, y: 4 }];

    let value = grammar.deconstruct(&pixels).unwrap();
    assert_eq!(value, value!([{ "x": 1, "y": 2 }, { "x": 3, "y": 4 }]));

    let back: Vec<Pixel> = grammar.construct(&value).unwrap();
    assert_eq!(back, pixels);

    let map: ValueMap = grammar.construct(&value!({ "x": 1 })).unwrap();
    assert!(grammar.construct::<Pixel>(&Value::Object(map)).is_ok());
    assert!(grammar.construct::<Pixel>(&value!("pixel")).is_err());
}

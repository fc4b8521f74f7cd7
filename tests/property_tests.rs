//! Property-based tests for the marshal/unmarshal round trip.
//!
//! Marshalling then unmarshalling must give back an equal object for any
//! field values, and a value tree must survive a trip through JSON text.

use grammar::{impl_convert, Field, Grammar, Marshal, Result, TypeDescriptor, Value, ValueMap};
use proptest::prelude::*;
use std::collections::BTreeMap;

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

impl_convert!(Point);

#[derive(Debug, Default, Clone, PartialEq)]
struct Record {
    id: u32,
    label: String,
    ratio: f64,
    flag: bool,
    tags: Vec<String>,
    origin: Option<Point>,
    path: Vec<Point>,
    counts: BTreeMap<String, i64>,
}

impl Marshal for Record {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Record")
            .field(Field::new("id", |r: &Record| &r.id, |r: &mut Record| &mut r.id))
            .field(Field::new("label", |r: &Record| &r.label, |r: &mut Record| &mut r.label))
            .field(Field::new("ratio", |r: &Record| &r.ratio, |r: &mut Record| &mut r.ratio))
            .field(Field::new("flag", |r: &Record| &r.flag, |r: &mut Record| &mut r.flag))
            .field(Field::new("tags", |r: &Record| &r.tags, |r: &mut Record| &mut r.tags))
            .field(
                Field::new("origin", |r: &Record| &r.origin, |r: &mut Record| &mut r.origin)
                    .optional(),
            )
            .field(Field::new("path", |r: &Record| &r.path, |r: &mut Record| &mut r.path))
            .field(Field::new("counts", |r: &Record| &r.counts, |r: &mut Record| &mut r.counts))
            .build()
    }

    fn zero() -> Self {
        Record::default()
    }
}

fn point() -> impl Strategy<Value = Point> {
    (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Point { x, y })
}

fn record() -> impl Strategy<Value = Record> {
    (
        any::<u32>(),
        ".{0,12}",
        (-4000i32..4000).prop_map(|n| f64::from(n) / 8.0),
        any::<bool>(),
        prop::collection::vec("[a-z]{0,6}", 0..5),
        proptest::option::of(point()),
        prop::collection::vec(point(), 0..5),
        prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..4),
    )
        .prop_map(|(id, label, ratio, flag, tags, origin, path, counts)| Record {
            id,
            label,
            ratio,
            flag,
            tags,
            origin,
            path,
            counts,
        })
}

proptest! {
    #[test]
    fn prop_record_round_trip(record in record()) {
        let grammar = Grammar::new();
        let map = grammar.marshal(&record).unwrap();
        let back: Record = grammar.unmarshal(&map).unwrap();
        prop_assert_eq!(back, record);
    }

    #[test]
    fn prop_unmarshal_into_overwrites_every_present_field(first in record(), second in record()) {
        let grammar = Grammar::new();
        let mut target = first;
        let map = grammar.marshal(&second).unwrap();
        grammar.unmarshal_into(&mut target, &map).unwrap();
        if second.origin.is_none() {
            // an omitted optional leaves the existing value alone
            target.origin = None;
        }
        prop_assert_eq!(target, second);
    }

    #[test]
    fn prop_tree_survives_json(record in record()) {
        let grammar = Grammar::new();
        let map = grammar.marshal(&record).unwrap();
        let json = serde_json::to_string(&Value::Object(map.clone())).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.as_object(), Some(&map));
    }

    #[test]
    fn prop_integers_narrow_from_floats(n in any::<i32>()) {
        let grammar = Grammar::new();
        let back: i32 = grammar.construct(&Value::from(f64::from(n))).unwrap();
        prop_assert_eq!(back, n);
    }

    #[test]
    fn prop_value_map_keeps_insertion_order(keys in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let mut map = ValueMap::new();
        let mut expected: Vec<String> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if map.insert(key.clone(), Value::from(i)).is_none() {
                expected.push(key.clone());
            }
        }
        let actual: Vec<String> = map.keys().cloned().collect();
        prop_assert_eq!(actual, expected);
    }
}

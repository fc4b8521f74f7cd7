//! Conversion of nested objects.
//!
//! These functions back the [`Convert`](crate::Convert) implementation that
//! [`impl_convert!`](crate::impl_convert) generates for a [`Marshal`] type, so
//! the type can appear as a field value, a collection element or a map value.

use crate::{Context, Grammar, Marshal, ObjectUpdate, Result, Value, ValueMap};

/// Marshals a nested object with its own descriptor.
pub fn deconstruct<T: Marshal>(object: &T, cx: Context<'_>) -> Result<Value> {
    cx.grammar().marshal(object).map(Value::Object)
}

/// Builds a nested object from a mapping.
pub fn construct<T: Marshal>(value: &Value, cx: Context<'_>) -> Result<T> {
    match value {
        Value::Object(map) => cx.grammar().unmarshal(map),
        other => {
            let descriptor = cx.grammar().descriptor::<T>()?;
            Err(cx.mismatch(descriptor.name(), other))
        }
    }
}

/// Commits a mapping into an existing nested object.
pub fn commit<T: Marshal>(slot: &mut T, value: &Value, cx: Context<'_>) -> Result<()> {
    match value {
        Value::Object(map) => update(slot, map, cx.grammar()),
        other => {
            let descriptor = cx.grammar().descriptor::<T>()?;
            Err(cx.mismatch(descriptor.name(), other))
        }
    }
}

/// Merges `map` into `slot`, or replaces `slot` when the engine is set to
/// replace objects or `T` is a record.
pub(crate) fn update<T: Marshal>(slot: &mut T, map: &ValueMap, grammar: &Grammar) -> Result<()> {
    let descriptor = grammar.descriptor::<T>()?;
    if descriptor.is_record() || grammar.options().object_update == ObjectUpdate::Replace {
        *slot = grammar.unmarshal(map)?;
        Ok(())
    } else {
        grammar.unmarshal_into(slot, map)
    }
}

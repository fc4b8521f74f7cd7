//! Error types for marshalling and unmarshalling.
//!
//! Every failure the engine can produce is a variant of the single [`Error`]
//! type. Failures raised while reading or writing a field are wrapped in
//! [`Error::Read`] / [`Error::Write`], so a failure deep inside a nested
//! object surfaces as a chain naming every field on the way down.
//!
//! ## Error Categories
//!
//! - **Field access**: [`Error::Read`] and [`Error::Write`] wrap the cause
//! - **Type mismatches**: a stored value has no conversion path to the declared type
//! - **Configuration**: a descriptor is inconsistent (missing canonical constructor, duplicate keys)
//! - **Lookups**: enumeration constants and scalar-like strings that do not resolve
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{Error, Grammar, Value};
//!
//! let result = Grammar::new().construct::<i32>(&Value::from("ten"));
//! assert!(matches!(result, Err(Error::TypeMismatch { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while converting objects.
///
/// Variants that wrap another error keep it as their `source`, and also
/// print it, so `to_string()` yields the whole cause chain on one line.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Reading a field while marshalling failed
    #[error("unable to read '{owner}.{field}': {source}")]
    Read {
        owner: String,
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// Committing a value into a field while unmarshalling failed
    #[error("unable to write '{owner}.{field}': {source}")]
    Write {
        owner: String,
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// A stored value cannot be mapped to the declared type
    #[error("value of '{field}' could not be mapped to type {expected}: found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// The requested operation is not supported for this object
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A type descriptor is inconsistent with the type it describes
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No enumeration constant matches the stored name or ordinal
    #[error("no constant of {enumeration} matches {value}")]
    NoSuchConstant { enumeration: String, value: String },

    /// A string could not be parsed into a scalar-like type
    #[error("invalid {expected} '{input}': {reason}")]
    InvalidScalar {
        expected: String,
        input: String,
        reason: String,
    },

    /// Custom error, typically raised by self-describing objects
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Wraps a failure raised while reading `owner.field`.
    pub fn read(owner: &str, field: &str, source: Error) -> Self {
        Error::Read {
            owner: owner.to_string(),
            field: field.to_string(),
            source: Box::new(source),
        }
    }

    /// Wraps a failure raised while writing `owner.field`.
    pub fn write(owner: &str, field: &str, source: Error) -> Self {
        Error::Write {
            owner: owner.to_string(),
            field: field.to_string(),
            source: Box::new(source),
        }
    }

    /// Creates a type mismatch error naming the field, the declared type and
    /// the kind of value that was found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::Error;
    ///
    /// let err = Error::type_mismatch("age", "u8", "string");
    /// assert!(err.to_string().contains("type u8"));
    /// ```
    pub fn type_mismatch(field: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported<T: fmt::Display>(msg: T) -> Self {
        Error::Unsupported(msg.to_string())
    }

    pub fn configuration<T: fmt::Display>(msg: T) -> Self {
        Error::Configuration(msg.to_string())
    }

    pub fn no_such_constant(enumeration: &str, value: &str) -> Self {
        Error::NoSuchConstant {
            enumeration: enumeration.to_string(),
            value: value.to_string(),
        }
    }

    pub fn invalid_scalar<T: fmt::Display>(expected: &str, input: &str, reason: T) -> Self {
        Error::InvalidScalar {
            expected: expected.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::Error;
    ///
    /// let err = Error::custom("missing header");
    /// assert_eq!(err.to_string(), "missing header");
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Follows `Read`/`Write` wrappers down to the error that started it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::Error;
    ///
    /// let inner = Error::type_mismatch("x", "i32", "string");
    /// let outer = Error::write("Outer", "inner", Error::write("Inner", "x", inner));
    /// assert!(matches!(outer.root_cause(), Error::TypeMismatch { .. }));
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Read { source, .. } | Error::Write { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_rendered() {
        let err = Error::write(
            "Order",
            "customer",
            Error::write("User", "id", Error::type_mismatch("id", "u32", "string")),
        );
        let message = err.to_string();
        assert!(message.starts_with("unable to write 'Order.customer'"));
        assert!(message.contains("'User.id'"));
        assert!(message.ends_with("found string"));
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;

        let err = Error::read("Thing", "word", Error::custom("boom"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("boom"));
    }

    #[test]
    fn test_root_cause_of_plain_error_is_itself() {
        let err = Error::no_such_constant("Blob", "BAZ");
        assert!(matches!(err.root_cause(), Error::NoSuchConstant { .. }));
    }
}

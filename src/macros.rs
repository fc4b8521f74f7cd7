/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Any other expression is converted with `Value::from`.
///
/// # Examples
///
/// ```rust
/// use grammar::{value, Value};
///
/// let name = "Bearimy";
/// let person = value!({
///     "name": name,
///     "age": 61,
///     "tags": ["a", "b"],
///     "spouse": null
/// });
/// assert_eq!(person.as_object().unwrap().get("name"), Some(&Value::from("Bearimy")));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ValueMap::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

/// Implements [`Enumeration`](crate::Enumeration) and
/// [`Convert`](crate::Convert) for a fieldless enum deriving `Copy`.
///
/// Constants are named after their variants unless a name is given.
///
/// # Examples
///
/// ```rust
/// use grammar::{enumeration, Enumeration};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Direction { North, South }
///
/// enumeration!(Direction { North = "N", South });
///
/// assert_eq!(Direction::North.name(), "N");
/// assert_eq!(Direction::from_name("South"), Some(Direction::South));
/// ```
#[macro_export]
macro_rules! enumeration {
    ($ty:ident { $($variant:ident $(= $name:literal)?),* $(,)? }) => {
        impl $crate::Enumeration for $ty {
            const NAME: &'static str = stringify!($ty);

            fn constants() -> &'static [Self] {
                &[$($ty::$variant),*]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $crate::__constant_name!($variant $(, $name)?),)*
                }
            }
        }

        impl $crate::Convert for $ty {
            const KIND: $crate::Kind = $crate::Kind::Enumeration;

            fn deconstruct(&self, _cx: $crate::Context<'_>) -> $crate::Result<$crate::Value> {
                Ok($crate::enumeration::deconstruct(self))
            }

            fn construct(value: &$crate::Value, cx: $crate::Context<'_>) -> $crate::Result<Self> {
                $crate::enumeration::construct(value, cx)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __constant_name {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $name:literal) => {
        $name
    };
}

/// Makes [`Marshal`](crate::Marshal) types usable as field values,
/// collection elements and map values.
///
/// Nested objects marshal to a mapping with their own descriptor and merge
/// into the existing instance when unmarshalled.
///
/// # Examples
///
/// ```rust
/// use grammar::{impl_convert, Field, Grammar, Marshal, Result, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Tag { label: String }
///
/// impl Marshal for Tag {
///     fn describe() -> Result<TypeDescriptor<Self>> {
///         TypeDescriptor::builder("Tag")
///             .field(Field::new("label", |t: &Tag| &t.label, |t: &mut Tag| &mut t.label))
///             .build()
///     }
///
///     fn zero() -> Self { Tag::default() }
/// }
///
/// impl_convert!(Tag);
///
/// let tags = vec![Tag { label: "a".into() }];
/// let value = Grammar::new().deconstruct(&tags).unwrap();
/// assert_eq!(value.as_array().map(Vec::len), Some(1));
/// ```
#[macro_export]
macro_rules! impl_convert {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Convert for $ty {
                const KIND: $crate::Kind = $crate::Kind::Object;

                fn deconstruct(&self, cx: $crate::Context<'_>) -> $crate::Result<$crate::Value> {
                    $crate::object::deconstruct(self, cx)
                }

                fn construct(value: &$crate::Value, cx: $crate::Context<'_>) -> $crate::Result<Self> {
                    $crate::object::construct(value, cx)
                }

                fn commit(&mut self, value: &$crate::Value, cx: $crate::Context<'_>) -> $crate::Result<()> {
                    $crate::object::commit(self, value, cx)
                }
            }
        )+
    };
}

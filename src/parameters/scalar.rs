use std::fmt;

use serde_yaml::Value;

use crate::{Error, Field, KeyPath};

/// A value kind that can be decoded from a single scalar document node.
///
/// The set of implementors is closed: booleans, strings, floating point
/// numbers and the integer widths below. Decoding is exact-kind — a
/// boolean node never satisfies an integer decode and a number node never
/// satisfies a boolean decode, even though both are scalars at the
/// document level. Floating point types accept integer-valued number
/// nodes; nothing else crosses kinds.
pub trait ScalarValue: Sized + Clone + PartialEq + fmt::Display {
    /// Kind name used in diagnostics.
    const KIND: &'static str;

    /// Decodes the value from a scalar node, or `None` on a kind or range
    /// mismatch.
    fn decode(node: &Value) -> Option<Self>;
}

impl ScalarValue for bool {
    const KIND: &'static str = "a boolean";

    fn decode(node: &Value) -> Option<Self> {
        node.as_bool()
    }
}

impl ScalarValue for String {
    const KIND: &'static str = "a string";

    fn decode(node: &Value) -> Option<Self> {
        node.as_str().map(str::to_owned)
    }
}

impl ScalarValue for f64 {
    const KIND: &'static str = "a floating point number";

    fn decode(node: &Value) -> Option<Self> {
        node.as_f64()
    }
}

impl ScalarValue for f32 {
    const KIND: &'static str = "a floating point number";

    fn decode(node: &Value) -> Option<Self> {
        node.as_f64().map(|value| value as f32)
    }
}

macro_rules! signed_scalar_value {
    ($($t:ty),*) => {$(
        impl ScalarValue for $t {
            const KIND: &'static str = "an integer";

            fn decode(node: &Value) -> Option<Self> {
                node.as_i64().and_then(|value| <$t>::try_from(value).ok())
            }
        }
    )*};
}

macro_rules! unsigned_scalar_value {
    ($($t:ty),*) => {$(
        impl ScalarValue for $t {
            const KIND: &'static str = "a non-negative integer";

            fn decode(node: &Value) -> Option<Self> {
                node.as_u64().and_then(|value| <$t>::try_from(value).ok())
            }
        }
    )*};
}

signed_scalar_value!(i16, i32, i64);
unsigned_scalar_value!(u32, u64, usize);

/// Schema leaf binding a key to a scalar value of type `T`.
#[derive(Debug)]
pub struct ScalarParameter<T: ScalarValue> {
    key: String,
    default: Option<T>,
    value: Option<T>,
}

impl<T: ScalarValue> ScalarParameter<T> {
    /// Declares a mandatory parameter.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
            value: None,
        }
    }

    /// Declares a parameter that falls back to `default` when its key is
    /// absent.
    pub fn with_default(key: impl Into<String>, default: T) -> Self {
        Self {
            key: key.into(),
            default: Some(default),
            value: None,
        }
    }

    /// The mapping key this parameter binds to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the loaded value.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful [`Field::load`].
    pub fn value(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => panic!("parameter '{}' was read before it was loaded", self.key),
        }
    }
}

impl<T: ScalarValue> Field for ScalarParameter<T> {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        match doc.get(&self.key) {
            Some(node) if is_scalar(node) => {
                let parsed = T::decode(node).ok_or_else(|| Error::Parse {
                    path: KeyPath::key(&self.key),
                    reason: format!("expected {}", T::KIND),
                })?;
                self.value = Some(parsed);
                Ok(())
            }
            Some(_) => Err(Error::Parse {
                path: KeyPath::key(&self.key),
                reason: "expected a scalar node".to_owned(),
            }),
            None => match &self.default {
                Some(default) => {
                    tracing::trace!(key = %self.key, "key absent, using default");
                    self.value = Some(default.clone());
                    Ok(())
                }
                None => Err(Error::MissingKey {
                    path: KeyPath::key(&self.key),
                }),
            },
        }
    }
}

impl<T: ScalarValue> PartialEq<T> for ScalarParameter<T> {
    fn eq(&self, other: &T) -> bool {
        self.value.as_ref() == Some(other)
    }
}

impl<T: ScalarValue> fmt::Display for ScalarParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.key, value),
            None => write!(f, "{}: <unset>", self.key),
        }
    }
}

fn is_scalar(node: &Value) -> bool {
    matches!(
        node,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Value {
        serde_yaml::from_str(
            r#"
            three: 3
            minus_two: -2
            pi_20: 3.14159265358979323846
            greeting: "hello"
            plain: hi there
            truthy: true
            shouting: True
            falsy: false
            one: 1
            zero: 0
            broken: 1+2j
            list: [1, 2, 3]
            table: {a: 1}
            "#,
        )
        .unwrap()
    }

    #[test]
    fn integers_load_from_integer_nodes() {
        let doc = document();

        let mut three = ScalarParameter::<i64>::new("three");
        three.load(&doc).unwrap();
        assert_eq!(*three.value(), 3);
        assert!(three == 3);

        // a default does not shadow a present key
        let mut three = ScalarParameter::<i64>::with_default("three", 5);
        three.load(&doc).unwrap();
        assert_eq!(*three.value(), 3);

        let mut five = ScalarParameter::<i64>::with_default("not_a_key", 5);
        five.load(&doc).unwrap();
        assert_eq!(*five.value(), 5);

        let mut missing = ScalarParameter::<i64>::new("not_a_key");
        assert!(matches!(
            missing.load(&doc),
            Err(Error::MissingKey { .. })
        ));
    }

    #[test]
    fn integers_reject_other_scalar_kinds() {
        let doc = document();

        for key in ["pi_20", "greeting", "broken", "truthy", "shouting", "falsy"] {
            let mut parameter = ScalarParameter::<i64>::new(key);
            assert!(
                matches!(parameter.load(&doc), Err(Error::Parse { .. })),
                "{key} must not load as an integer"
            );
        }

        let mut from_list = ScalarParameter::<i64>::new("list");
        let error = from_list.load(&doc).unwrap_err();
        assert_eq!(error.to_string(), "list could not be loaded: expected a scalar node");

        let mut from_mapping = ScalarParameter::<i64>::new("table");
        assert!(matches!(from_mapping.load(&doc), Err(Error::Parse { .. })));
    }

    #[test]
    fn unsigned_integers_reject_negative_values() {
        let doc = document();

        let mut count = ScalarParameter::<usize>::new("minus_two");
        assert!(matches!(count.load(&doc), Err(Error::Parse { .. })));

        let mut count = ScalarParameter::<usize>::new("three");
        count.load(&doc).unwrap();
        assert_eq!(*count.value(), 3);
    }

    #[test]
    fn floats_load_from_floats_and_integers() {
        let doc = document();

        let mut pi = ScalarParameter::<f64>::new("pi_20");
        pi.load(&doc).unwrap();
        assert!((*pi.value() - std::f64::consts::PI).abs() < 1e-15);

        // an integer node is a valid floating point source
        let mut from_int = ScalarParameter::<f64>::new("three");
        from_int.load(&doc).unwrap();
        assert_eq!(*from_int.value(), 3.0);

        let mut fallback = ScalarParameter::<f64>::with_default("not_a_key", 2.71);
        fallback.load(&doc).unwrap();
        assert_eq!(*fallback.value(), 2.71);

        for key in ["greeting", "broken", "truthy", "falsy", "list"] {
            let mut parameter = ScalarParameter::<f64>::new(key);
            assert!(
                matches!(parameter.load(&doc), Err(Error::Parse { .. })),
                "{key} must not load as a float"
            );
        }
    }

    #[test]
    fn booleans_only_load_from_boolean_nodes() {
        let doc = document();

        let mut truthy = ScalarParameter::<bool>::new("truthy");
        truthy.load(&doc).unwrap();
        assert!(*truthy.value());

        let mut shouting = ScalarParameter::<bool>::new("shouting");
        shouting.load(&doc).unwrap();
        assert!(*shouting.value());

        let mut falsy = ScalarParameter::<bool>::new("falsy");
        falsy.load(&doc).unwrap();
        assert!(!*falsy.value());

        // integer one and zero are not booleans
        for key in ["one", "zero", "greeting"] {
            let mut parameter = ScalarParameter::<bool>::new(key);
            assert!(
                matches!(parameter.load(&doc), Err(Error::Parse { .. })),
                "{key} must not load as a boolean"
            );
        }
    }

    #[test]
    fn strings_only_load_from_string_nodes() {
        let doc = document();

        let mut greeting = ScalarParameter::<String>::new("greeting");
        greeting.load(&doc).unwrap();
        assert_eq!(greeting.value(), "hello");

        let mut plain = ScalarParameter::<String>::new("plain");
        plain.load(&doc).unwrap();
        assert_eq!(plain.value(), "hi there");

        for key in ["three", "truthy", "pi_20"] {
            let mut parameter = ScalarParameter::<String>::new(key);
            assert!(
                matches!(parameter.load(&doc), Err(Error::Parse { .. })),
                "{key} must not load as a string"
            );
        }
    }

    #[test]
    fn failed_load_keeps_the_previous_value() {
        let doc = document();

        let mut count = ScalarParameter::<i64>::new("three");
        count.load(&doc).unwrap();
        assert!(count.load(&serde_yaml::from_str("three: oops").unwrap()).is_err());
        assert_eq!(*count.value(), 3);
    }

    #[test]
    fn renders_as_key_colon_value() {
        let doc = document();

        let mut three = ScalarParameter::<i64>::new("three");
        assert_eq!(three.to_string(), "three: <unset>");
        three.load(&doc).unwrap();
        assert_eq!(three.to_string(), "three: 3");
    }
}

use std::fmt;

use ndarray::Array1;
use serde_yaml::Value;

use crate::{Error, Field, KeyPath, ShapeFound};

use super::ScalarValue;

/// Schema leaf binding a key to a fixed-size vector of `N` elements of
/// type `T`, stored as an [`Array1`].
pub struct VectorParameter<T: ScalarValue, const N: usize> {
    key: String,
    default: Option<[T; N]>,
    value: Option<Array1<T>>,
}

impl<T: ScalarValue, const N: usize> VectorParameter<T, N> {
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
    pub fn with_default(key: impl Into<String>, default: [T; N]) -> Self {
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

    /// Returns the loaded vector.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful [`Field::load`].
    pub fn value(&self) -> &Array1<T> {
        match &self.value {
            Some(value) => value,
            None => panic!("parameter '{}' was read before it was loaded", self.key),
        }
    }
}

impl<T: ScalarValue, const N: usize> Field for VectorParameter<T, N> {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        match doc.get(&self.key) {
            Some(node) => {
                // every element must convert before anything is assigned
                self.value = Some(parse_elements::<T>(&self.key, node, N)?);
                Ok(())
            }
            None => match &self.default {
                Some(default) => {
                    tracing::trace!(key = %self.key, "key absent, using default");
                    self.value = Some(Array1::from(default.to_vec()));
                    Ok(())
                }
                None => Err(Error::MissingKey {
                    path: KeyPath::key(&self.key),
                }),
            },
        }
    }
}

impl<T: ScalarValue, const N: usize> PartialEq<Array1<T>> for VectorParameter<T, N> {
    fn eq(&self, other: &Array1<T>) -> bool {
        self.value.as_ref() == Some(other)
    }
}

impl<T: ScalarValue, const N: usize> fmt::Display for VectorParameter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.key, value),
            None => write!(f, "{}: <unset>", self.key),
        }
    }
}

/// Parses a sequence node of exactly `expected` elements of type `T`.
pub(super) fn parse_elements<T: ScalarValue>(
    key: &str,
    node: &Value,
    expected: usize,
) -> Result<Array1<T>, Error> {
    let Some(items) = node.as_sequence() else {
        return Err(Error::Shape {
            path: KeyPath::key(key),
            expected,
            unit: "elements",
            found: shape_found(node),
        });
    };
    if items.len() != expected {
        return Err(Error::Shape {
            path: KeyPath::key(key),
            expected,
            unit: "elements",
            found: ShapeFound::Len(items.len()),
        });
    }

    let mut elements = Vec::with_capacity(expected);
    for (index, item) in items.iter().enumerate() {
        let element = T::decode(item).ok_or_else(|| Error::Parse {
            path: KeyPath::key(key).index(index),
            reason: format!("expected {}", T::KIND),
        })?;
        elements.push(element);
    }
    Ok(Array1::from(elements))
}

/// Describes a node that failed a sequence-shape expectation.
pub(super) fn shape_found(node: &Value) -> ShapeFound {
    match node {
        Value::Sequence(items) => ShapeFound::Len(items.len()),
        Value::Mapping(_) => ShapeFound::Mapping,
        _ => ShapeFound::Scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn document() -> Value {
        serde_yaml::from_str(
            r#"
            sampling: [4, 2, 3]
            offset: [0.0, 0.5, 0.25]
            mixed: [1, 2.5]
            short: [1, 2]
            lexical: [1, two, 3]
            negative: [1, -2, 3]
            scalar: 7
            "#,
        )
        .unwrap()
    }

    #[test]
    fn loads_exactly_n_elements() {
        let doc = document();

        let mut sampling = VectorParameter::<usize, 3>::new("sampling");
        sampling.load(&doc).unwrap();
        assert_eq!(*sampling.value(), array![4usize, 2, 3]);
        assert!(sampling == array![4usize, 2, 3]);

        // integer tokens are valid floating point elements
        let mut mixed = VectorParameter::<f64, 2>::new("mixed");
        mixed.load(&doc).unwrap();
        assert_eq!(*mixed.value(), array![1.0, 2.5]);
    }

    #[test]
    fn wrong_length_is_a_shape_error() {
        let doc = document();

        let mut sampling = VectorParameter::<usize, 3>::new("short");
        let error = sampling.load(&doc).unwrap_err();
        assert!(matches!(
            error,
            Error::Shape {
                expected: 3,
                found: ShapeFound::Len(2),
                ..
            }
        ));
        assert_eq!(error.to_string(), "short expected 3 elements but found 2");
    }

    #[test]
    fn scalar_node_is_a_shape_error() {
        let doc = document();

        let mut sampling = VectorParameter::<usize, 3>::new("scalar");
        let error = sampling.load(&doc).unwrap_err();
        assert!(matches!(
            error,
            Error::Shape {
                found: ShapeFound::Scalar,
                ..
            }
        ));
    }

    #[test]
    fn element_conversion_failure_names_the_index() {
        let doc = document();

        let mut lexical = VectorParameter::<usize, 3>::new("lexical");
        let error = lexical.load(&doc).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
        assert_eq!(
            error.to_string(),
            "lexical[1] could not be loaded: expected a non-negative integer"
        );

        let mut negative = VectorParameter::<usize, 3>::new("negative");
        let error = negative.load(&doc).unwrap_err();
        assert_eq!(
            error.to_string(),
            "negative[1] could not be loaded: expected a non-negative integer"
        );
    }

    #[test]
    fn absent_key_falls_back_to_the_default() {
        let doc = document();

        let mut origin = VectorParameter::<f64, 3>::with_default("not_a_key", [0.0; 3]);
        origin.load(&doc).unwrap();
        assert_eq!(*origin.value(), array![0.0, 0.0, 0.0]);

        let mut missing = VectorParameter::<f64, 3>::new("not_a_key");
        assert!(matches!(missing.load(&doc), Err(Error::MissingKey { .. })));
    }

    #[test]
    fn failed_load_keeps_the_previous_value() {
        let doc = document();

        let mut sampling = VectorParameter::<usize, 3>::new("sampling");
        sampling.load(&doc).unwrap();
        assert!(sampling
            .load(&serde_yaml::from_str("sampling: [1, 2]").unwrap())
            .is_err());
        assert_eq!(*sampling.value(), array![4usize, 2, 3]);
    }
}

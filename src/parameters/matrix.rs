use std::fmt;

use ndarray::Array2;
use serde_yaml::Value;

use crate::{Error, Field, KeyPath, ShapeFound};

use super::vector::shape_found;
use super::ScalarValue;

/// Schema leaf binding a key to an `R` × `C` matrix of `T`, written in the
/// document as a sequence of `R` rows of `C` scalars each and stored as an
/// [`Array2`].
pub struct MatrixParameter<T: ScalarValue, const R: usize, const C: usize> {
    key: String,
    default: Option<[[T; C]; R]>,
    value: Option<Array2<T>>,
}

impl<T: ScalarValue, const R: usize, const C: usize> MatrixParameter<T, R, C> {
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
    pub fn with_default(key: impl Into<String>, default: [[T; C]; R]) -> Self {
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

    /// Returns the loaded matrix.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful [`Field::load`].
    pub fn value(&self) -> &Array2<T> {
        match &self.value {
            Some(value) => value,
            None => panic!("parameter '{}' was read before it was loaded", self.key),
        }
    }

    fn parse(&self, node: &Value) -> Result<Array2<T>, Error> {
        let Some(rows) = node.as_sequence() else {
            return Err(Error::Shape {
                path: KeyPath::key(&self.key),
                expected: R,
                unit: "rows",
                found: shape_found(node),
            });
        };
        if rows.len() != R {
            return Err(Error::Shape {
                path: KeyPath::key(&self.key),
                expected: R,
                unit: "rows",
                found: ShapeFound::Len(rows.len()),
            });
        }

        let mut elements = Vec::with_capacity(R * C);
        for (row_index, row) in rows.iter().enumerate() {
            let Some(columns) = row.as_sequence() else {
                return Err(Error::Shape {
                    path: KeyPath::key(&self.key).index(row_index),
                    expected: C,
                    unit: "columns",
                    found: shape_found(row),
                });
            };
            if columns.len() != C {
                return Err(Error::Shape {
                    path: KeyPath::key(&self.key).index(row_index),
                    expected: C,
                    unit: "columns",
                    found: ShapeFound::Len(columns.len()),
                });
            }
            for (col_index, item) in columns.iter().enumerate() {
                let element = T::decode(item).ok_or_else(|| Error::Parse {
                    path: KeyPath::key(&self.key).cell(row_index, col_index),
                    reason: format!("expected {}", T::KIND),
                })?;
                elements.push(element);
            }
        }

        // elements holds exactly R * C entries at this point
        Ok(Array2::from_shape_vec((R, C), elements).unwrap())
    }
}

impl<T: ScalarValue, const R: usize, const C: usize> Field for MatrixParameter<T, R, C> {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        match doc.get(&self.key) {
            Some(node) => {
                self.value = Some(self.parse(node)?);
                Ok(())
            }
            None => match &self.default {
                Some(default) => {
                    tracing::trace!(key = %self.key, "key absent, using default");
                    let mut elements = Vec::with_capacity(R * C);
                    for row in default {
                        elements.extend(row.iter().cloned());
                    }
                    self.value = Some(Array2::from_shape_vec((R, C), elements).unwrap());
                    Ok(())
                }
                None => Err(Error::MissingKey {
                    path: KeyPath::key(&self.key),
                }),
            },
        }
    }
}

impl<T: ScalarValue, const R: usize, const C: usize> PartialEq<Array2<T>>
    for MatrixParameter<T, R, C>
{
    fn eq(&self, other: &Array2<T>) -> bool {
        self.value.as_ref() == Some(other)
    }
}

impl<T: ScalarValue, const R: usize, const C: usize> fmt::Display for MatrixParameter<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.key, value),
            None => write!(f, "{}: <unset>", self.key),
        }
    }
}

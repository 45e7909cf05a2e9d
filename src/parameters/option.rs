use std::collections::BTreeSet;
use std::fmt;

use serde_yaml::Value;

use crate::{Error, Field, KeyPath};

use super::ScalarParameter;

/// Schema leaf binding a key to a string restricted to a finite set of
/// allowed options.
///
/// The option set is kept ordered so diagnostics render deterministically
/// regardless of the declaration order.
#[derive(Debug)]
pub struct OptionParameter {
    inner: ScalarParameter<String>,
    options: BTreeSet<String>,
}

impl OptionParameter {
    /// Declares a mandatory option parameter.
    pub fn new<I, S>(key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: ScalarParameter::new(key),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Declares an option parameter with a default value.
    ///
    /// The default itself must be a member of `options`; a non-member
    /// default is a schema-definition mistake and fails here, before any
    /// document is loaded.
    pub fn with_default<I, S>(
        key: impl Into<String>,
        options: I,
        default: impl Into<String>,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let default = default.into();
        let options: BTreeSet<String> = options.into_iter().map(Into::into).collect();
        if !options.contains(&default) {
            return Err(Error::InvalidDefault {
                key,
                value: default,
                allowed: options.into_iter().collect(),
            });
        }
        Ok(Self {
            inner: ScalarParameter::with_default(key, default),
            options,
        })
    }

    /// The mapping key this parameter binds to.
    pub fn key(&self) -> &str {
        self.inner.key()
    }

    /// Returns the loaded value.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful [`Field::load`].
    pub fn value(&self) -> &str {
        self.inner.value()
    }
}

impl Field for OptionParameter {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        self.inner.load(doc)?;
        let value = self.inner.value();
        if !self.options.contains(value) {
            return Err(Error::InvalidOption {
                path: KeyPath::key(self.inner.key()),
                value: value.to_owned(),
                allowed: self.options.iter().cloned().collect(),
            });
        }
        Ok(())
    }
}

impl PartialEq<&str> for OptionParameter {
    fn eq(&self, other: &&str) -> bool {
        self.inner == (*other).to_owned()
    }
}

impl fmt::Display for OptionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

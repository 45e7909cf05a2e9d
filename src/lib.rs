//! Typed configuration loading for electronic-structure spectral calculations.
//!
//! A configuration document is parsed by `serde_yaml` into a tree of
//! mappings, sequences and scalars. The types in this crate bind keys of
//! that tree to typed values: leaf [`parameters`] parse single scalars,
//! fixed-size vectors and matrices, or members of an option set; composite
//! [`nodes`] group parameters under one key and check cross-field rules;
//! [`config::Config`] gates a whole document against an allowed-key and
//! mandatory-key schema.
//!
//! Loading is fail-fast and side-effect-free on failure, and every error
//! carries the dotted key path from the document root to the offending
//! field. To get started, refer to the `demos` directory in the main
//! repository.

mod error;

pub mod config;
pub mod nodes;
pub mod parameters;
pub mod prelude;

pub use error::{Error, KeyPath, ShapeFound};

/// A schema element that can load its value from a document slice.
///
/// Implemented by every leaf parameter and by the composite nodes, which
/// load their members in declared order and then check cross-field rules.
pub trait Field {
    /// Parses this element's value out of `doc`, the enclosing mapping.
    ///
    /// On success the value is stored and accessible through the
    /// implementor's accessors. On failure the previously held value, if
    /// any, is left untouched, so a corrected document can be loaded
    /// again.
    fn load(&mut self, doc: &serde_yaml::Value) -> Result<(), Error>;
}

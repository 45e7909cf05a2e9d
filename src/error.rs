use std::fmt;

/// Path of keys from the document root to the field an error refers to.
///
/// Composite nodes prepend their own key to errors raised by their members,
/// so a failure deep in a nested document reports the full dotted path,
/// e.g. `ground_state.k_grid.sampling`. Element accesses inside sequences
/// render as `omega_range[1]` and matrix cells as `parallelepiped[1,2]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Cell(usize, usize),
}

impl KeyPath {
    /// Starts a path at a single key.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Appends a sequence index, rendered `key[index]`.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// Appends a matrix cell, rendered `key[row,col]`.
    pub fn cell(mut self, row: usize, col: usize) -> Self {
        self.segments.push(Segment::Cell(row, col));
        self
    }

    /// Prepends the key of an enclosing composite.
    pub fn prefixed(mut self, key: &str) -> Self {
        self.segments.insert(0, Segment::Key(key.to_owned()));
        self
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if position > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Cell(row, col) => write!(f, "[{row},{col}]")?,
            }
        }
        Ok(())
    }
}

/// What was actually found where a sequence of a fixed size was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFound {
    /// A sequence of the wrong length.
    Len(usize),
    /// A scalar node.
    Scalar,
    /// A mapping node.
    Mapping,
}

impl fmt::Display for ShapeFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFound::Len(len) => write!(f, "{len}"),
            ShapeFound::Scalar => write!(f, "a scalar"),
            ShapeFound::Mapping => write!(f, "a mapping"),
        }
    }
}

/// Represents an error raised while loading or validating a configuration.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A mandatory key has no entry in the document and no default value.
    #[error("{path} is not defined")]
    MissingKey { path: KeyPath },

    /// The document contains a top-level key outside the allowed set.
    #[error("configuration has a forbidden parameter: {key} = {value}")]
    InvalidKey { key: String, value: String },

    /// A present value has the wrong node kind or cannot convert to the
    /// declared type.
    #[error("{path} could not be loaded: {reason}")]
    Parse { path: KeyPath, reason: String },

    /// A sequence or matrix value has the wrong element count or row or
    /// column dimensions.
    #[error("{path} expected {expected} {unit} but found {found}")]
    Shape {
        path: KeyPath,
        expected: usize,
        unit: &'static str,
        found: ShapeFound,
    },

    /// A loaded string is not a member of its declared option set.
    #[error(
        "{path} loaded value '{value}' which is none of the allowed options: {}",
        render_options(.allowed)
    )]
    InvalidOption {
        path: KeyPath,
        value: String,
        allowed: Vec<String>,
    },

    /// An option parameter was declared with a default outside its own
    /// option set. This is a schema-definition mistake, raised before any
    /// document is loaded.
    #[error(
        "{key} was initialized with default value '{value}' which is none of the allowed options: {}",
        render_options(.allowed)
    )]
    InvalidDefault {
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    /// All values are individually well typed but violate a cross-field
    /// rule.
    #[error("{path} {rule}")]
    Validation { path: KeyPath, rule: String },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Prepends `key` to the error's key path, preserving the error kind.
    ///
    /// Composite nodes use this to annotate member failures with their own
    /// position in the document.
    pub fn prefixed(self, key: &str) -> Self {
        match self {
            Error::MissingKey { path } => Error::MissingKey {
                path: path.prefixed(key),
            },
            Error::Parse { path, reason } => Error::Parse {
                path: path.prefixed(key),
                reason,
            },
            Error::Shape {
                path,
                expected,
                unit,
                found,
            } => Error::Shape {
                path: path.prefixed(key),
                expected,
                unit,
                found,
            },
            Error::InvalidOption {
                path,
                value,
                allowed,
            } => Error::InvalidOption {
                path: path.prefixed(key),
                value,
                allowed,
            },
            Error::Validation { path, rule } => Error::Validation {
                path: path.prefixed(key),
                rule,
            },
            other => other,
        }
    }
}

/// Renders an option set as `{'a', 'b'}`. The list is kept sorted by the
/// caller so the rendering is deterministic.
fn render_options(options: &[String]) -> String {
    let quoted: Vec<String> = options.iter().map(|option| format!("'{option}'")).collect();
    format!("{{{}}}", quoted.join(", "))
}

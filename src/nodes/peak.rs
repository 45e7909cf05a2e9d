use serde_yaml::Value;

use crate::parameters::{Double, OptionParameter};
use crate::{Error, Field, KeyPath};

const WIDTH: &str = "width";
const FORM: &str = "form";

/// Valid peak forms.
///
/// `"lorentz"` follows the Lorentz distribution, `"gauss"` the Gauss
/// distribution.
pub const FORM_OPTIONS: [&str; 2] = ["lorentz", "gauss"];
/// Default peak width, unit is Hartree.
pub const DEFAULT_WIDTH: f64 = 0.001;
/// Default peak form.
pub const DEFAULT_FORM: &str = "lorentz";

/// Peak configuration node.
///
/// Defines a peak, e.g. for creating a spectrum, by its width and its
/// form. The whole node is optional: an absent or empty entry resolves to
/// a peak with all defaults.
pub struct Peak {
    key: String,
    /// Width of the peak in Hartree. Must be larger than 0. Defaults to
    /// [`DEFAULT_WIDTH`].
    pub width: Double,
    /// Form of the peak, one of [`FORM_OPTIONS`]. Defaults to
    /// [`DEFAULT_FORM`].
    pub form: OptionParameter,
}

impl Peak {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            key: key.into(),
            width: Double::with_default(WIDTH, DEFAULT_WIDTH),
            form: OptionParameter::with_default(FORM, FORM_OPTIONS, DEFAULT_FORM)?,
        })
    }

    fn validate_rules(&self) -> Result<(), Error> {
        if *self.width.value() <= 0.0 {
            return Err(Error::Validation {
                path: KeyPath::key(WIDTH).prefixed(&self.key),
                rule: "<= 0.0".to_owned(),
            });
        }
        Ok(())
    }
}

impl Field for Peak {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        // an absent or explicitly empty peak entry falls back to the
        // defaults of every member
        let empty = Value::Mapping(Default::default());
        let slice = match doc.get(&self.key) {
            Some(node) if !node.is_null() => node,
            _ => {
                tracing::debug!(key = %self.key, "not configured, using default peak");
                &empty
            }
        };

        self.width
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.form
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;

        self.validate_rules()
    }
}

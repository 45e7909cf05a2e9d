use serde_yaml::Value;

use crate::nodes::Peak;
use crate::parameters::{Interval, Size};
use crate::{Error, Field, KeyPath};

const ENERGY_INTERVAL: &str = "energy_interval";
const N_SAMPLING: &str = "n_sampling";
const PEAK: &str = "peak";

/// Spectrum configuration node.
///
/// Defines how a spectrum should be created. A spectrum is a function of
/// the energy on a fixed interval, built as a weighted sum of peak
/// functions; the peak positions and weights are calculated by the
/// solver, depending on the context. The node is defined by the energy
/// interval (in Hartree), the number of sampling points of that interval
/// and the kind of peaks.
pub struct Spectrum {
    key: String,
    /// Energy interval in Hartree. The lower bound must be smaller than
    /// the upper bound. Must be defined.
    pub energy_interval: Interval,
    /// Number of sampling points of the energy interval. Must be larger
    /// than 0. Must be defined.
    pub n_sampling: Size,
    /// The peaks to build the spectrum from. Optional, see [`Peak`].
    pub peak: Peak,
}

impl Spectrum {
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            key: key.into(),
            energy_interval: Interval::new(ENERGY_INTERVAL),
            n_sampling: Size::new(N_SAMPLING),
            peak: Peak::new(PEAK)?,
        })
    }

    fn validate_rules(&self) -> Result<(), Error> {
        let interval = self.energy_interval.value();
        if interval[0] >= interval[1] {
            return Err(Error::Validation {
                path: KeyPath::key(ENERGY_INTERVAL).prefixed(&self.key),
                rule: "first value is larger or equal the second".to_owned(),
            });
        }

        if *self.n_sampling.value() == 0 {
            return Err(Error::Validation {
                path: KeyPath::key(N_SAMPLING).prefixed(&self.key),
                rule: "<= 0".to_owned(),
            });
        }

        Ok(())
    }
}

impl Field for Spectrum {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        let Some(slice) = doc.get(&self.key) else {
            return Err(Error::MissingKey {
                path: KeyPath::key(&self.key),
            });
        };

        self.energy_interval
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.n_sampling
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.peak
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;

        self.validate_rules()
    }
}

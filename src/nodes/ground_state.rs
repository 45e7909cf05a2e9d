use serde_yaml::Value;

use crate::nodes::RegularGrid;
use crate::parameters::{Double, Size};
use crate::{Error, Field, KeyPath};

const K_GRID: &str = "k_grid";
const N_STATES: &str = "n_states";
const OCCUPIED_PART: &str = "occupied_part";

/// Ground state configuration node.
pub struct GroundState {
    key: String,
    /// **k**-grid on which the ground state is prepared. Must be defined.
    pub k_grid: RegularGrid,
    /// Total number of bands prepared in the input ground state data.
    /// Must be larger than 1. Must be defined.
    pub n_states: Size,
    /// Occupied part of the bands, the number of occupied states divided
    /// by `n_states`. Must lie strictly between 0 and 1, and the number of
    /// occupied orbitals `sampling.product() * n_states * occupied_part`
    /// must be an integral number. Must be defined.
    pub occupied_part: Double,
}

impl GroundState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            k_grid: RegularGrid::new(K_GRID),
            n_states: Size::new(N_STATES),
            occupied_part: Double::new(OCCUPIED_PART),
        }
    }

    fn validate_rules(&self) -> Result<(), Error> {
        if *self.n_states.value() <= 1 {
            return Err(Error::Validation {
                path: KeyPath::key(N_STATES).prefixed(&self.key),
                rule: "<= 1".to_owned(),
            });
        }

        if *self.occupied_part.value() <= 0.0 {
            return Err(Error::Validation {
                path: KeyPath::key(OCCUPIED_PART).prefixed(&self.key),
                rule: "<= 0.0".to_owned(),
            });
        }
        if *self.occupied_part.value() >= 1.0 {
            return Err(Error::Validation {
                path: KeyPath::key(OCCUPIED_PART).prefixed(&self.key),
                rule: ">= 1.0".to_owned(),
            });
        }

        // the occupied orbital count implied by the members must be integral
        let k_points: usize = self.k_grid.sampling.value().iter().product();
        let occupied_orbitals =
            (k_points * self.n_states.value()) as f64 * self.occupied_part.value();
        if occupied_orbitals.trunc() != occupied_orbitals {
            return Err(Error::Validation {
                path: KeyPath::key(&self.key),
                rule: format!(
                    "the number of orbitals as indicated by {K_GRID}, {N_STATES} and \
                     {OCCUPIED_PART} is not an integral number"
                ),
            });
        }

        Ok(())
    }
}

impl Field for GroundState {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        let Some(slice) = doc.get(&self.key) else {
            return Err(Error::MissingKey {
                path: KeyPath::key(&self.key),
            });
        };

        self.k_grid
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.n_states
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.occupied_part
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;

        self.validate_rules()
    }
}

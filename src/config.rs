//! Top-level configuration schema gate.
//!
//! [`Config`] checks a whole document against an explicit allowed-key and
//! mandatory-key contract, parses every recognized field into a typed
//! value (falling back to [`ConfigDefaults`] for the optional ones) and
//! offers a separate [`Config::validate`] step for the cross-field rules.
//! Construction succeeding does not imply `validate` succeeds: the first
//! is structural and typing validity, the second domain-semantic
//! validity.

use std::path::Path;

use ndarray::Array1;
use serde_yaml::Value;

use crate::parameters::{Interval, ScalarParameter, Size};
use crate::{Error, Field, KeyPath};

/// Keys recognized in a configuration document. Any other key is a hard
/// error.
pub const ALLOWED_KEYS: [&str; 12] = [
    "n_k_points",
    "n_occupied_total",
    "n_unoccupied_total",
    "n_isdf_vexc",
    "n_isdf_wscr_occupied",
    "n_isdf_wscr_unoccupied",
    "max_lanczos_iterations",
    "omega_range",
    "n_omega",
    "max_cvt_iterations",
    "cvt_convergence_criterium",
    "seed_source",
];

/// Keys that must appear in a configuration document. These have no
/// default value.
pub const MANDATORY_KEYS: [&str; 9] = [
    "n_k_points",
    "n_occupied_total",
    "n_unoccupied_total",
    "n_isdf_vexc",
    "n_isdf_wscr_occupied",
    "n_isdf_wscr_unoccupied",
    "max_lanczos_iterations",
    "omega_range",
    "n_omega",
];

const SEED_SOURCE: &str = "seed_source";

/// Source of the random number generator seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed {
    /// Use a fixed seed.
    Fixed,
    /// Use the system clock as seed.
    Clock,
}

impl Seed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seed::Fixed => "fixed",
            Seed::Clock => "clock",
        }
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default values for the optional configuration keys.
#[derive(Debug, Clone)]
pub struct ConfigDefaults {
    pub max_cvt_iterations: usize,
    pub cvt_convergence_criterium: f64,
    pub seed_source: Seed,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            max_cvt_iterations: 1000,
            cvt_convergence_criterium: 1e-5,
            seed_source: Seed::Clock,
        }
    }
}

/// The key contract and defaults a document is checked against.
///
/// Passed by value into [`Config::with_schema`]; the default instance is
/// the canonical schema ([`ALLOWED_KEYS`], [`MANDATORY_KEYS`],
/// [`ConfigDefaults`]).
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    pub allowed_keys: Vec<String>,
    pub mandatory_keys: Vec<String>,
    pub defaults: ConfigDefaults,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self {
            allowed_keys: ALLOWED_KEYS.iter().map(|key| key.to_string()).collect(),
            mandatory_keys: MANDATORY_KEYS.iter().map(|key| key.to_string()).collect(),
            defaults: ConfigDefaults::default(),
        }
    }
}

/// A fully loaded configuration.
///
/// Immutable after construction; read the public fields directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of **k**-points.
    pub n_k_points: usize,
    /// Number of occupied bands, cumulative over the **k**-points.
    pub n_occupied_total: usize,
    /// Number of unoccupied bands, cumulative over the **k**-points.
    pub n_unoccupied_total: usize,
    /// Number of interpolation points for occupied-unoccupied pairing.
    pub n_isdf_vexc: usize,
    /// Number of interpolation points for occupied-occupied pairing.
    pub n_isdf_wscr_occupied: usize,
    /// Number of interpolation points for unoccupied-unoccupied pairing.
    pub n_isdf_wscr_unoccupied: usize,
    /// Maximum number of Lanczos iterations.
    pub max_lanczos_iterations: usize,
    /// Energy range for calculating the spectrum.
    pub omega_range: Array1<f64>,
    /// Number of energy sampling points.
    pub n_omega: usize,
    /// Maximum number of CVT iterations.
    pub max_cvt_iterations: usize,
    /// CVT convergence criterium.
    pub cvt_convergence_criterium: f64,
    /// Seed source for random number generation.
    pub seed_source: Seed,
}

impl Config {
    /// Loads a configuration from `doc` with the canonical schema.
    pub fn new(doc: &Value) -> Result<Self, Error> {
        Self::with_schema(doc, ConfigSchema::default())
    }

    /// Reads and parses the file at `path`, then loads it with the
    /// canonical schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let doc: Value = serde_yaml::from_str(&text)?;
        Self::new(&doc)
    }

    /// Loads a configuration from `doc`.
    ///
    /// Every key present in `doc` must belong to the allowed set and every
    /// mandatory key must be present, checked in that order and fail-fast.
    /// Only then is each field parsed, with the optional fields falling
    /// back to the schema's defaults.
    pub fn with_schema(doc: &Value, schema: ConfigSchema) -> Result<Self, Error> {
        if let Some(mapping) = doc.as_mapping() {
            for (key, value) in mapping {
                let name = render_scalar(key);
                if !schema.allowed_keys.iter().any(|allowed| *allowed == name) {
                    return Err(Error::InvalidKey {
                        key: name,
                        value: render_scalar(value),
                    });
                }
            }
        }
        for key in &schema.mandatory_keys {
            if doc.get(key.as_str()).is_none() {
                return Err(Error::MissingKey {
                    path: KeyPath::key(key.as_str()),
                });
            }
        }

        let defaults = &schema.defaults;
        let config = Self {
            n_k_points: load_size(doc, "n_k_points")?,
            n_occupied_total: load_size(doc, "n_occupied_total")?,
            n_unoccupied_total: load_size(doc, "n_unoccupied_total")?,
            n_isdf_vexc: load_size(doc, "n_isdf_vexc")?,
            n_isdf_wscr_occupied: load_size(doc, "n_isdf_wscr_occupied")?,
            n_isdf_wscr_unoccupied: load_size(doc, "n_isdf_wscr_unoccupied")?,
            max_lanczos_iterations: load_size(doc, "max_lanczos_iterations")?,
            omega_range: load_interval(doc, "omega_range")?,
            n_omega: load_size(doc, "n_omega")?,
            max_cvt_iterations: load_size_or(
                doc,
                "max_cvt_iterations",
                defaults.max_cvt_iterations,
            )?,
            cvt_convergence_criterium: load_double_or(
                doc,
                "cvt_convergence_criterium",
                defaults.cvt_convergence_criterium,
            )?,
            seed_source: load_seed(doc, defaults.seed_source)?,
        };

        tracing::debug!(n_k_points = config.n_k_points, "configuration loaded");
        Ok(config)
    }

    /// Validates the cross-field rules.
    ///
    /// Pure and idempotent; construction succeeding does not imply this
    /// succeeds.
    pub fn validate(&self) -> Result<(), Error> {
        if self.n_k_points == 0 {
            return Err(rule("n_k_points", "must be > 0"));
        }
        if self.n_occupied_total == 0 {
            return Err(rule("n_occupied_total", "must be > 0"));
        }
        if self.n_unoccupied_total == 0 {
            return Err(rule("n_unoccupied_total", "must be > 0"));
        }
        if (self.n_occupied_total + self.n_unoccupied_total) % self.n_k_points != 0 {
            return Err(rule(
                "n_occupied_total",
                "+ n_unoccupied_total must be divisible by n_k_points",
            ));
        }

        if self.n_isdf_vexc == 0 {
            return Err(rule("n_isdf_vexc", "must be > 0"));
        }
        if self.n_isdf_vexc > self.n_occupied_total * self.n_unoccupied_total / self.n_k_points {
            return Err(rule(
                "n_isdf_vexc",
                "must be <= n_occupied_total * n_unoccupied_total / n_k_points",
            ));
        }
        if self.n_isdf_wscr_occupied == 0 {
            return Err(rule("n_isdf_wscr_occupied", "must be > 0"));
        }
        if self.n_isdf_wscr_occupied > self.n_occupied_total * self.n_occupied_total {
            return Err(rule(
                "n_isdf_wscr_occupied",
                "must be <= n_occupied_total^2",
            ));
        }
        if self.n_isdf_wscr_unoccupied == 0 {
            return Err(rule("n_isdf_wscr_unoccupied", "must be > 0"));
        }
        if self.n_isdf_wscr_unoccupied > self.n_unoccupied_total * self.n_unoccupied_total {
            return Err(rule(
                "n_isdf_wscr_unoccupied",
                "must be <= n_unoccupied_total^2",
            ));
        }

        if self.max_lanczos_iterations == 0 {
            return Err(rule("max_lanczos_iterations", "must be > 0"));
        }
        if self.omega_range[0] >= self.omega_range[1] {
            return Err(rule(
                "omega_range",
                "lower limit (left value) must be smaller than the upper limit (right value)",
            ));
        }
        if self.n_omega == 0 {
            return Err(rule("n_omega", "must be > 0"));
        }
        if self.max_cvt_iterations == 0 {
            return Err(rule("max_cvt_iterations", "must be > 0"));
        }
        if self.cvt_convergence_criterium <= 0.0 {
            return Err(rule("cvt_convergence_criterium", "must be > 0"));
        }

        Ok(())
    }
}

fn rule(key: &str, rule: &str) -> Error {
    Error::Validation {
        path: KeyPath::key(key),
        rule: rule.to_owned(),
    }
}

fn load_size(doc: &Value, key: &str) -> Result<usize, Error> {
    let mut parameter = Size::new(key);
    parameter.load(doc)?;
    Ok(*parameter.value())
}

fn load_size_or(doc: &Value, key: &str, default: usize) -> Result<usize, Error> {
    let mut parameter = Size::with_default(key, default);
    parameter.load(doc)?;
    Ok(*parameter.value())
}

fn load_double_or(doc: &Value, key: &str, default: f64) -> Result<f64, Error> {
    let mut parameter = ScalarParameter::<f64>::with_default(key, default);
    parameter.load(doc)?;
    Ok(*parameter.value())
}

fn load_interval(doc: &Value, key: &str) -> Result<Array1<f64>, Error> {
    let mut parameter = Interval::new(key);
    parameter.load(doc)?;
    Ok(parameter.value().clone())
}

fn load_seed(doc: &Value, default: Seed) -> Result<Seed, Error> {
    let mut parameter =
        ScalarParameter::<String>::with_default(SEED_SOURCE, default.as_str().to_owned());
    parameter.load(doc)?;
    match parameter.value().as_str() {
        "fixed" => Ok(Seed::Fixed),
        "clock" => Ok(Seed::Clock),
        other => Err(Error::InvalidOption {
            path: KeyPath::key(SEED_SOURCE),
            value: other.to_owned(),
            allowed: vec!["clock".to_owned(), "fixed".to_owned()],
        }),
    }
}

/// Renders a scalar node for diagnostics.
fn render_scalar(node: &Value) -> String {
    match node {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => "~".to_owned(),
        _ => "<non-scalar>".to_owned(),
    }
}

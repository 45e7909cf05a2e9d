//! Includes commonly used library components.

pub use crate::config::{Config, ConfigDefaults, ConfigSchema, Seed};
pub use crate::nodes::{GroundState, Peak, RegularGrid, Spectrum};
pub use crate::parameters::{
    Coordinate, CoordinateTrafo, Double, Interval, MatrixParameter, OptionParameter, Sampling,
    ScalarParameter, Size, VectorParameter,
};
pub use crate::{Error, Field, KeyPath, ShapeFound};

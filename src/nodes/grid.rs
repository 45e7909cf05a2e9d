use ndarray::Array2;
use serde_yaml::Value;

use crate::parameters::{Coordinate, CoordinateTrafo, Sampling};
use crate::{Error, Field, KeyPath};

const SAMPLING: &str = "sampling";
const OFFSET: &str = "offset";
const PARALLELEPIPED: &str = "parallelepiped";

const ORIGIN: [f64; 3] = [0.0; 3];
const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Regular grid configuration node.
///
/// A regular grid samples a parallelepiped uniformly, so that the points
/// have the same distance in each dimension and each point covers the
/// same volume element. It is defined by the span vectors of the
/// parallelepiped, the number of sampling points per dimension and an
/// offset of the points in parallelepiped coordinates.
pub struct RegularGrid {
    key: String,
    /// Number of sampling points per dimension. Every component must be
    /// at least 1. Must be defined.
    pub sampling: Sampling,
    /// Offset of the grid points per dimension in parallelepiped
    /// coordinates. Every component must lie in `[0, 1)`. Defaults to the
    /// origin.
    pub offset: Coordinate,
    /// Column-wise span vectors of the parallelepiped. The columns must be
    /// linearly independent. Defaults to the identity.
    pub parallelepiped: CoordinateTrafo,
}

impl RegularGrid {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sampling: Sampling::new(SAMPLING),
            offset: Coordinate::with_default(OFFSET, ORIGIN),
            parallelepiped: CoordinateTrafo::with_default(PARALLELEPIPED, IDENTITY),
        }
    }

    fn validate_rules(&self) -> Result<(), Error> {
        if self.sampling.value().iter().any(|&n| n < 1) {
            return Err(Error::Validation {
                path: KeyPath::key(SAMPLING).prefixed(&self.key),
                rule: "< 1 in one or more dimensions".to_owned(),
            });
        }

        if self.offset.value().iter().any(|&o| o < 0.0) {
            return Err(Error::Validation {
                path: KeyPath::key(OFFSET).prefixed(&self.key),
                rule: "< 0.0 in one or more dimensions".to_owned(),
            });
        }
        if self.offset.value().iter().any(|&o| o >= 1.0) {
            return Err(Error::Validation {
                path: KeyPath::key(OFFSET).prefixed(&self.key),
                rule: ">= 1.0 in one or more dimensions".to_owned(),
            });
        }

        // the span vectors are linearly independent iff the matrix has
        // full rank
        if rank(self.parallelepiped.value()) < 3 {
            return Err(Error::Validation {
                path: KeyPath::key(PARALLELEPIPED).prefixed(&self.key),
                rule: "is not linearly independent".to_owned(),
            });
        }

        Ok(())
    }
}

impl Field for RegularGrid {
    fn load(&mut self, doc: &Value) -> Result<(), Error> {
        let Some(slice) = doc.get(&self.key) else {
            return Err(Error::MissingKey {
                path: KeyPath::key(&self.key),
            });
        };

        self.sampling
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.offset
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;
        self.parallelepiped
            .load(slice)
            .map_err(|error| error.prefixed(&self.key))?;

        self.validate_rules()
    }
}

/// Rank of a real matrix, by Gaussian elimination with partial pivoting.
///
/// The pivot tolerance is scaled with the largest absolute entry, so the
/// check is independent of the overall scale of the span vectors.
fn rank(matrix: &Array2<f64>) -> usize {
    let mut m = matrix.to_owned();
    let (nrows, ncols) = m.dim();
    let scale = m.iter().fold(0.0_f64, |max, value| max.max(value.abs()));
    if scale == 0.0 {
        return 0;
    }
    let tolerance = scale * 1e-12;

    let mut rank = 0;
    for col in 0..ncols {
        if rank == nrows {
            break;
        }

        // largest remaining pivot in this column
        let mut pivot = rank;
        for row in (rank + 1)..nrows {
            if m[[row, col]].abs() > m[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if m[[pivot, col]].abs() <= tolerance {
            continue;
        }
        if pivot != rank {
            for c in 0..ncols {
                m.swap([pivot, c], [rank, c]);
            }
        }

        for row in (rank + 1)..nrows {
            let factor = m[[row, col]] / m[[rank, col]];
            for c in col..ncols {
                m[[row, c]] -= factor * m[[rank, c]];
            }
        }
        rank += 1;
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rank_of_the_identity_is_full() {
        assert_eq!(rank(&Array2::eye(3)), 3);
    }

    #[test]
    fn rank_drops_for_dependent_columns() {
        let dependent = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(rank(&dependent), 2);
        assert_eq!(rank(&Array2::zeros((3, 3))), 0);
    }

    #[test]
    fn rank_is_scale_invariant() {
        let tiny = Array2::eye(3) * 1e-9;
        assert_eq!(rank(&tiny), 3);
    }
}

//! Composite configuration nodes.
//!
//! A node groups several parameters, and possibly further nodes, under one
//! key of the parent document. Loading resolves the node's own sub-slice,
//! loads every member in declared order and then checks the node's
//! cross-field rules. Member failures are reported with the node's key
//! prefixed to the path.

mod grid;
mod ground_state;
mod peak;
mod spectrum;

pub use grid::RegularGrid;
pub use ground_state::GroundState;
pub use peak::Peak;
pub use spectrum::Spectrum;

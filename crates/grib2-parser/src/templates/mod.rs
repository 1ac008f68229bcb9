//! Template-driven sections.
//!
//! Sections 3 and 5 declare a template number that selects their layout.
//! Exactly one template of each is supported: 3.0 (regular lat/lon grid) and
//! 5.0 (simple packing), which is what the MRMS products use.

pub mod grid;
pub mod packing;

pub use grid::{parse_grid_definition, GridGeometry, LATLON_GRID_TEMPLATE};
pub use packing::{parse_data_representation, PackingParameters, SIMPLE_PACKING_TEMPLATE};

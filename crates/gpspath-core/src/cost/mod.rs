//! Edge cost for map matching: attribute ranks, crossing proximity and
//! landform difficulty.
pub mod crossing;
pub mod path;

pub use crossing::{CrossingBand, CrossingSchedule};
pub use path::{EdgeCost, PathCostModel};

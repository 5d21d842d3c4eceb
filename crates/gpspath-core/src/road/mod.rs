pub mod rank;
pub mod segment;

pub use rank::{AttributeRange, AttributeRanker, AttributeRanks, AttributeSchema, RankedAttribute};
pub use segment::{Crossing, RoadSegment};

//! Multi-scale TPI landform classification: Horn slope, standardised TPI at a
//! small and a large neighbourhood, and a ten-class decision table.
pub mod classify;
mod gradient;
pub mod landform;
mod tpi;

pub use classify::{
    classify_landforms, classify_landforms_with_cancel, LandformCell, LandformGrid, LandformHistogram,
};
pub use landform::{classify_features, Landform, TpiFeatures};

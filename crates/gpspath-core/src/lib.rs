//! Cost model for reconstructing road paths from GPS traces, adjusted for
//! terrain difficulty by a two-scale TPI landform classifier.
pub mod config;
pub mod constants;
pub mod coords;
pub mod cost;
pub mod dem;
pub mod error;
pub mod road;
pub mod terrain;

pub use config::CostModelParameters;
pub use coords::{GpsFix, LatLon};
pub use cost::PathCostModel;
pub use dem::Dem;
pub use error::{PathCostError, Result};
pub use road::{AttributeSchema, RoadSegment};
pub use terrain::{classify_landforms, Landform, LandformGrid};

pub mod distance;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod raster;

pub use error::{DistfieldError, Result};

pub mod bounds;
pub mod contour;
pub mod convergent;
pub mod edge_color;
pub mod projection;
pub mod scanline;
pub mod segment;
pub mod shape;
pub mod signed_distance;

pub use bounds::Bounds;
pub use contour::Contour;
pub use convergent::convergent_curve_ordering;
pub use edge_color::EdgeColor;
pub use projection::{Projection, SdfTransformation};
pub use scanline::{FillRule, Scanline};
pub use segment::{CubicSegment, EdgeSegment, LinearSegment, QuadraticSegment, ScanlineIntersections, Segment};
pub use shape::{Shape, YAxisOrientation};
pub use signed_distance::SignedDistance;

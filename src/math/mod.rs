pub mod arithmetic;
pub mod equation;
pub mod range;
pub mod vector_2d;

pub use arithmetic::{clamp_index, median, mix, non_zero_sign, sign};
pub use equation::{solve_cubic, solve_quadratic, Roots};
pub use range::{DistanceMapping, Range};
pub use vector_2d::{cross, is_zero, normalize, orthogonal, orthonormal};

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 2D position. Shares the vector representation so control points mix freely.
pub type Point2 = Vector2;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

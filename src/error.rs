use thiserror::Error;

/// Top-level error type for distance field generation.
#[derive(Debug, Error)]
pub enum DistfieldError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Errors related to geometric configuration.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("projection scale ({x}, {y}) must be finite and non-zero")]
    DegenerateProjection { x: f64, y: f64 },

    #[error("distance range [{lower}, {upper}] has zero width")]
    DegenerateRange { lower: f64, upper: f64 },
}

/// Errors related to the structure of a shape.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("contour {contour} is not closed at edge {edge}")]
    OpenContour { contour: usize, edge: usize },
}

/// Errors related to distance field generation and post-processing.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation parameters: {0}")]
    InvalidParameters(String),

    #[error("stencil is {stencil_width}x{stencil_height} but bitmap is {width}x{height}")]
    StencilMismatch {
        stencil_width: usize,
        stencil_height: usize,
        width: usize,
        height: usize,
    },
}

/// Convenience type alias for results using [`DistfieldError`].
pub type Result<T> = std::result::Result<T, DistfieldError>;

//! Distance field preview: rasterizes a built-in "D" outline and prints the
//! result as ASCII art.
//!
//! Usage:
//! ```text
//! cargo run --example preview                 # msdf (default)
//! cargo run --example preview -- sdf          # sdf | psdf | msdf | mtsdf
//! RUST_LOG=distfield=debug cargo run --example preview
//! ```

use distfield::geometry::{Contour, EdgeColor, EdgeSegment, Projection, SdfTransformation, Shape};
use distfield::math::{median, DistanceMapping, Point2, Range, Vector2};
use distfield::operations::{ColoringStrategy, DistanceField, DistanceFieldMode, EdgeColoring, GenerateDistanceField};
use distfield::DistfieldError;

const PIXELS_PER_UNIT: f64 = 3.0;
const RANGE: f64 = 1.0;
const RAMP: &[u8] = b"@%#*+=-:. ";

fn glyph() -> Shape {
    let p = Point2::new;
    let outer = Contour::from_edges(vec![
        EdgeSegment::linear(p(0.0, 0.0), p(3.0, 0.0), EdgeColor::WHITE),
        EdgeSegment::cubic(p(3.0, 0.0), p(7.0, 0.0), p(7.0, 8.0), p(3.0, 8.0), EdgeColor::WHITE),
        EdgeSegment::linear(p(3.0, 8.0), p(0.0, 8.0), EdgeColor::WHITE),
        EdgeSegment::linear(p(0.0, 8.0), p(0.0, 0.0), EdgeColor::WHITE),
    ]);
    let counter = Contour::from_edges(vec![
        EdgeSegment::linear(p(1.5, 1.5), p(1.5, 6.5), EdgeColor::WHITE),
        EdgeSegment::linear(p(1.5, 6.5), p(3.0, 6.5), EdgeColor::WHITE),
        EdgeSegment::cubic(p(3.0, 6.5), p(5.0, 6.5), p(5.0, 1.5), p(3.0, 1.5), EdgeColor::WHITE),
        EdgeSegment::linear(p(3.0, 1.5), p(1.5, 1.5), EdgeColor::WHITE),
    ]);
    Shape::from_contours(vec![outer, counter])
}

fn parse_mode(arg: Option<&str>) -> DistanceFieldMode {
    match arg {
        Some("sdf") => DistanceFieldMode::Sdf,
        Some("psdf") => DistanceFieldMode::Psdf,
        Some("mtsdf") => DistanceFieldMode::Mtsdf,
        _ => DistanceFieldMode::Msdf,
    }
}

/// Collapses each pixel to the value a shader would threshold.
fn samples(field: &DistanceField) -> Vec<f32> {
    match field {
        DistanceField::Sdf(b) | DistanceField::Psdf(b) => b.as_slice().to_vec(),
        DistanceField::Msdf(b) => b.as_slice().chunks_exact(3).map(|p| median(p[0], p[1], p[2])).collect(),
        DistanceField::Mtsdf(b) => b.as_slice().chunks_exact(4).map(|p| median(p[0], p[1], p[2])).collect(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn main() -> Result<(), DistfieldError> {
    // Default: WARN for everything, INFO for distfield.
    // Override with RUST_LOG env var (e.g. RUST_LOG=distfield=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("distfield=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let arg = std::env::args().nth(1);
    let mode = parse_mode(arg.as_deref());

    let mut shape = glyph();
    shape.normalize();
    EdgeColoring::new(ColoringStrategy::Simple).execute(&mut shape);

    let bounds = shape.bounds();
    let width = ((bounds.r - bounds.l + 2.0 * RANGE) * PIXELS_PER_UNIT).ceil() as usize;
    let height = ((bounds.t - bounds.b + 2.0 * RANGE) * PIXELS_PER_UNIT).ceil() as usize;
    let projection = Projection::new(
        Vector2::new(PIXELS_PER_UNIT, PIXELS_PER_UNIT),
        Vector2::new(RANGE - bounds.l, RANGE - bounds.b),
    )?;
    let transformation = SdfTransformation::new(projection, DistanceMapping::try_from(Range::symmetric(RANGE))?);

    let field = GenerateDistanceField::new(mode, width, height, transformation).execute(&shape)?;
    let values = samples(&field);

    println!("{mode:?} {width}x{height}");
    // Raster rows grow upward; print the top row first.
    for row in values.chunks_exact(width).rev() {
        let line: String = row
            .iter()
            .map(|&v| {
                let index = (v.clamp(0.0, 1.0) * (RAMP.len() - 1) as f32).round() as usize;
                char::from(RAMP[index])
            })
            .collect();
        println!("{line}");
    }
    Ok(())
}

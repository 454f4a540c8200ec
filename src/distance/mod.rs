pub mod combiners;
pub mod finder;
pub mod selectors;

pub use combiners::{ContourCombiner, OverlappingContourCombiner, SimpleContourCombiner};
pub use finder::ShapeDistanceFinder;
pub use selectors::{
    DistanceValue, EdgeSelector, MultiAndTrueDistance, MultiAndTrueDistanceSelector, MultiDistance,
    MultiDistanceSelector, PerpendicularDistanceCache, PerpendicularDistanceSelector, PerpendicularDistanceSelectorBase,
    TrueDistanceCache, TrueDistanceSelector,
};

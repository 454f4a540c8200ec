pub mod coloring;
pub mod correction;
pub mod generate;
pub mod sign_correction;

pub use coloring::{ColoringStrategy, EdgeColoring};
pub use correction::{
    DistanceCheckMode, ErrorCorrection, ErrorCorrectionConfig, ErrorCorrectionMode, MsdfErrorCorrection, Stencil,
};
pub use generate::{
    generate_msdf, generate_mtsdf, generate_psdf, generate_sdf, DistanceField, DistanceFieldMode,
    GenerateDistanceField, GeneratorConfig, MsdfGeneratorConfig,
};
pub use sign_correction::DistanceSignCorrection;

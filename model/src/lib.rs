//! # Firelily Model
//!
//! Per-model rendering pipeline stages for the Firelily engine, centered on
//! image-based lighting.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`ImageBasedLighting`] - Per-model lighting settings, mutable between frames
//! - [`EnvironmentMapManager`] - Computed environment data (spherical harmonics, radiance atlas)
//! - [`ShaderBuilder`] - Accumulates shader defines, uniform declarations, and source chunks
//! - [`UniformMap`] - Uniform-name to value-provider table with last-writer-wins merge
//! - [`ImageBasedLightingStage`] - The stage tying it all together, once per model per frame
//!
//! ## Example
//!
//! ```ignore
//! use firelily_model::{
//!     FrameState, ImageBasedLightingStage, Model, ModelPipelineStage, ModelRenderResources,
//!     RenderContext,
//! };
//!
//! let model = Model::default();
//! let frame = FrameState::new(std::sync::Arc::new(RenderContext::default()));
//! let mut resources = ModelRenderResources::new();
//! ImageBasedLightingStage::new().process(&mut resources, &model, &frame);
//! // resources.shader_builder and resources.uniform_map now feed the
//! // shader compiler and draw submission.
//! ```

pub mod context;
pub mod error;
pub mod lighting;
pub mod model;
pub mod shader;
pub mod stage;
pub mod uniforms;

// Re-export main types for convenience
pub use context::{ContextCapabilities, FrameState, RenderContext, TextureHandle};
pub use error::{LightingError, LightingResult};
pub use lighting::{
    EnvironmentMapManager, ImageBasedLighting, PackedSphericalHarmonics, SpecularEnvironmentAtlas,
    SphericalHarmonics,
};
pub use model::Model;
pub use shader::{
    ShaderBuilder, ShaderDefine, ShaderDestination, UniformDeclaration, UniformType,
};
pub use stage::{
    IblSource, ImageBasedLightingStage, LightingFeatures, ModelPipelineStage,
    ModelRenderResources,
};
pub use uniforms::{UniformMap, UniformProvider, UniformValue};

/// Model library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the model subsystem.
///
/// This should be called before processing any pipeline stages.
pub fn init() {
    log::info!("Firelily Model v{} initialized", VERSION);
}

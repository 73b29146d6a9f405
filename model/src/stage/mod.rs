//! Per-model pipeline stages.
//!
//! Rendering a model is configured by a sequence of stages. Each stage
//! inspects the model and the frame, then appends shader declarations and
//! uniform bindings to the shared [`ModelRenderResources`]. Once every stage
//! has run, the shader compiler and draw submission consume the accumulated
//! result.

mod features;
mod image_based_lighting;

pub use features::{IblSource, LightingFeatures};
pub use image_based_lighting::ImageBasedLightingStage;

use crate::context::FrameState;
use crate::model::Model;
use crate::shader::ShaderBuilder;
use crate::uniforms::UniformMap;

/// Resources accumulated for rendering one model in one frame.
///
/// Create a fresh value per model per frame, or [`clear`](Self::clear) and
/// reuse one between frames. Running a stage twice against the same
/// resources redeclares its shader names and panics in [`ShaderBuilder`].
#[derive(Debug, Default)]
pub struct ModelRenderResources {
    /// Shader declarations and source chunks, in stage order.
    pub shader_builder: ShaderBuilder,
    /// Uniform bindings, merged across stages with last-writer-wins.
    pub uniform_map: UniformMap,
}

impl ModelRenderResources {
    /// Create empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for the next frame.
    pub fn clear(&mut self) {
        self.shader_builder.clear();
        self.uniform_map.clear();
    }
}

/// One configuration stage of the model rendering pipeline.
pub trait ModelPipelineStage {
    /// Stage name used in logs.
    fn name(&self) -> &str;

    /// Configure `resources` for rendering `model` in the current frame.
    fn process(&self, resources: &mut ModelRenderResources, model: &Model, frame: &FrameState);
}

static_assertions::assert_impl_all!(ModelRenderResources: Send, Sync);

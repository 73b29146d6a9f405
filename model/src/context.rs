//! Rendering context and per-frame state.
//!
//! [`RenderContext`] is the model pipeline's view of the active graphics
//! context: a fixed set of [`ContextCapabilities`] captured when the context
//! was created. [`FrameState`] carries the context through the per-frame
//! pipeline stages.

use std::sync::Arc;

/// Handle to a GPU texture owned by the renderer's resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Capabilities of a rendering context.
///
/// These flags cover what the prefiltered specular cubemap path needs from
/// the GPU: textures with floating-point texels, and color targets that can
/// be rendered to in floating point, in half or full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextCapabilities {
    /// Whether 16-bit floating-point textures can be sampled.
    pub half_float_textures: bool,
    /// Whether 16-bit floating-point color targets are renderable.
    pub color_buffer_half_float: bool,
    /// Whether 32-bit floating-point textures can be sampled.
    pub float_textures: bool,
    /// Whether 32-bit floating-point color targets are renderable.
    pub color_buffer_float: bool,
}

impl Default for ContextCapabilities {
    fn default() -> Self {
        Self {
            half_float_textures: true,
            color_buffer_half_float: true,
            float_textures: true,
            color_buffer_float: true,
        }
    }
}

impl ContextCapabilities {
    /// Capabilities with every feature turned off.
    pub const NONE: Self = Self {
        half_float_textures: false,
        color_buffer_half_float: false,
        float_textures: false,
        color_buffer_float: false,
    };
}

/// The active rendering context, as seen by the model pipeline.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    capabilities: ContextCapabilities,
}

impl RenderContext {
    /// Create a context advertising the given capabilities.
    pub fn new(capabilities: ContextCapabilities) -> Self {
        Self { capabilities }
    }

    /// Get the context capabilities.
    pub fn capabilities(&self) -> &ContextCapabilities {
        &self.capabilities
    }

    /// Whether the context can render and sample the prefiltered specular
    /// environment cubemap.
    ///
    /// The cubemap's mip chain is generated into floating-point targets, so
    /// either the half-float or the full-float pair must be available. When
    /// this returns `false` the lighting stage emits only its base outputs
    /// and every cubemap-dependent branch stays out of the shader.
    pub fn supports_specular_cubemap(&self) -> bool {
        let caps = &self.capabilities;
        (caps.color_buffer_half_float && caps.half_float_textures)
            || (caps.color_buffer_float && caps.float_textures)
    }
}

/// Per-frame state handed to every model pipeline stage.
#[derive(Debug, Clone)]
pub struct FrameState {
    context: Arc<RenderContext>,
    frame_number: u64,
}

impl FrameState {
    /// Create the state for a new frame.
    pub fn new(context: Arc<RenderContext>) -> Self {
        Self {
            context,
            frame_number: 0,
        }
    }

    /// Set the frame number.
    pub fn with_frame_number(mut self, frame_number: u64) -> Self {
        self.frame_number = frame_number;
        self
    }

    /// Get the rendering context.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Get the frame number.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

// Ensure context types can be shared across render threads
static_assertions::assert_impl_all!(RenderContext: Send, Sync);
static_assertions::assert_impl_all!(FrameState: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capabilities_support_cubemap() {
        let context = RenderContext::default();
        assert!(context.supports_specular_cubemap());
    }

    #[test]
    fn test_no_capabilities_reject_cubemap() {
        let context = RenderContext::new(ContextCapabilities::NONE);
        assert!(!context.supports_specular_cubemap());
    }

    #[test]
    fn test_half_float_pair_is_sufficient() {
        let context = RenderContext::new(ContextCapabilities {
            half_float_textures: true,
            color_buffer_half_float: true,
            ..ContextCapabilities::NONE
        });
        assert!(context.supports_specular_cubemap());
    }

    #[test]
    fn test_full_float_pair_is_sufficient() {
        let context = RenderContext::new(ContextCapabilities {
            float_textures: true,
            color_buffer_float: true,
            ..ContextCapabilities::NONE
        });
        assert!(context.supports_specular_cubemap());
    }

    #[test]
    fn test_sampling_without_renderability_is_not_enough() {
        let context = RenderContext::new(ContextCapabilities {
            half_float_textures: true,
            float_textures: true,
            ..ContextCapabilities::NONE
        });
        assert!(!context.supports_specular_cubemap());
    }

    #[test]
    fn test_mismatched_precision_pairs_are_not_enough() {
        // Half-float sampling with only full-float render targets (and vice
        // versa) cannot produce a usable mip chain.
        let context = RenderContext::new(ContextCapabilities {
            half_float_textures: true,
            color_buffer_float: true,
            ..ContextCapabilities::NONE
        });
        assert!(!context.supports_specular_cubemap());
    }

    #[test]
    fn test_frame_state_carries_frame_number() {
        let context = Arc::new(RenderContext::default());
        let frame = FrameState::new(context).with_frame_number(42);
        assert_eq!(frame.frame_number(), 42);
        assert!(frame.context().supports_specular_cubemap());
    }
}

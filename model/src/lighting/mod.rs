//! Model lighting state.
//!
//! Split between what the application configures ([`ImageBasedLighting`])
//! and what the engine computes ([`EnvironmentMapManager`]). The lighting
//! pipeline stage reads both each frame to select shader branches and bind
//! uniforms.

mod environment;
mod settings;

pub use environment::{
    EnvironmentMapManager, PackedSphericalHarmonics, SpecularEnvironmentAtlas, SphericalHarmonics,
};
pub use settings::ImageBasedLighting;

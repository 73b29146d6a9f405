//! Environment lighting data computed for a model.
//!
//! The environment-map generation passes run asynchronously with respect to
//! draw submission: a [`SpecularEnvironmentAtlas`] is created before its GPU
//! texture exists and flips to ready once the prefiltered mip chain has been
//! written. Uniform providers hold the atlas through an [`Arc`] and read its
//! current state at draw time.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use parking_lot::RwLock;

use crate::context::TextureHandle;
use crate::error::{LightingError, LightingResult};

/// Order-2 spherical harmonic coefficients describing diffuse irradiance.
///
/// Coefficients are stored in band-major order: `L00`, `L1-1`, `L10`, `L11`,
/// `L2-2`, `L2-1`, `L20`, `L21`, `L22`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalHarmonics {
    coefficients: [Vec3; Self::COEFFICIENT_COUNT],
}

impl SphericalHarmonics {
    /// Number of coefficients in an order-2 expansion.
    pub const COEFFICIENT_COUNT: usize = 9;

    /// Create from a full coefficient array.
    pub fn new(coefficients: [Vec3; Self::COEFFICIENT_COUNT]) -> Self {
        Self { coefficients }
    }

    /// Create from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`LightingError::InvalidSphericalHarmonics`] unless the slice
    /// holds exactly nine coefficients.
    pub fn from_slice(coefficients: &[Vec3]) -> LightingResult<Self> {
        let coefficients: [Vec3; Self::COEFFICIENT_COUNT] = coefficients
            .try_into()
            .map_err(|_| LightingError::InvalidSphericalHarmonics(coefficients.len()))?;
        Ok(Self { coefficients })
    }

    /// Get the coefficient array.
    pub fn coefficients(&self) -> &[Vec3; Self::COEFFICIENT_COUNT] {
        &self.coefficients
    }

    /// Pack the coefficients for a uniform buffer upload.
    pub fn to_packed(&self) -> PackedSphericalHarmonics {
        PackedSphericalHarmonics {
            coefficients: self.coefficients.map(|c| [c.x, c.y, c.z, 0.0]),
        }
    }
}

/// Spherical harmonics laid out with the 16-byte array stride uniform
/// buffers require for `vec3[]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedSphericalHarmonics {
    pub coefficients: [[f32; 4]; SphericalHarmonics::COEFFICIENT_COUNT],
}

#[derive(Debug, Clone, Copy)]
struct AtlasState {
    ready: bool,
    texture: Option<TextureHandle>,
    dimensions: Vec2,
    max_mip_level: f32,
}

/// Prefiltered specular environment cubemap, shared between the generation
/// passes and draw submission.
///
/// The atlas starts out not ready. The generation side calls [`publish`]
/// once the mip chain is usable and [`invalidate`] when it starts
/// recomputing; readers see whichever state is current when they look.
///
/// [`publish`]: SpecularEnvironmentAtlas::publish
/// [`invalidate`]: SpecularEnvironmentAtlas::invalidate
pub struct SpecularEnvironmentAtlas {
    state: RwLock<AtlasState>,
}

impl SpecularEnvironmentAtlas {
    /// Create an atlas with no GPU data yet.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AtlasState {
                ready: false,
                texture: None,
                dimensions: Vec2::ZERO,
                max_mip_level: 0.0,
            }),
        }
    }

    /// Whether the prefiltered mip chain is complete and safe to sample.
    pub fn ready(&self) -> bool {
        self.state.read().ready
    }

    /// Get the cubemap texture, if one has been published.
    pub fn texture(&self) -> Option<TextureHandle> {
        self.state.read().texture
    }

    /// Get the face dimensions of the published texture.
    ///
    /// Zero until the first [`publish`](Self::publish).
    pub fn dimensions(&self) -> Vec2 {
        self.state.read().dimensions
    }

    /// Get the highest mip level of the prefiltered chain.
    pub fn max_mip_level(&self) -> f32 {
        self.state.read().max_mip_level
    }

    /// Publish a completed mip chain and mark the atlas ready.
    pub fn publish(&self, texture: TextureHandle, dimensions: Vec2, max_mip_level: f32) {
        let mut state = self.state.write();
        state.ready = true;
        state.texture = Some(texture);
        state.dimensions = dimensions;
        state.max_mip_level = max_mip_level;
        log::trace!(
            "SpecularEnvironmentAtlas: published {:?}, {}x{}, max mip {}",
            texture,
            dimensions.x,
            dimensions.y,
            max_mip_level
        );
    }

    /// Mark the atlas as recomputing.
    ///
    /// The previously published texture stays visible to readers that want
    /// stale data over none; only the ready flag drops.
    pub fn invalidate(&self) {
        self.state.write().ready = false;
    }
}

impl Default for SpecularEnvironmentAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpecularEnvironmentAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SpecularEnvironmentAtlas")
            .field("ready", &state.ready)
            .field("texture", &state.texture)
            .field("dimensions", &state.dimensions)
            .field("max_mip_level", &state.max_mip_level)
            .finish()
    }
}

/// Environment lighting computed for one model by the engine.
///
/// Holds the outputs of the dynamic environment passes: diffuse irradiance
/// as spherical harmonics and specular radiance as a prefiltered cubemap
/// atlas. Either side may be absent when the corresponding pass has not run
/// or is disabled.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentMapManager {
    spherical_harmonic_coefficients: Option<SphericalHarmonics>,
    radiance_map_atlas: Option<Arc<SpecularEnvironmentAtlas>>,
}

impl EnvironmentMapManager {
    /// Create a manager with no computed data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the computed diffuse irradiance coefficients.
    pub fn spherical_harmonic_coefficients(&self) -> Option<SphericalHarmonics> {
        self.spherical_harmonic_coefficients
    }

    /// Set or clear the diffuse irradiance coefficients.
    pub fn set_spherical_harmonic_coefficients(
        &mut self,
        coefficients: Option<SphericalHarmonics>,
    ) {
        self.spherical_harmonic_coefficients = coefficients;
    }

    /// Get the computed specular radiance atlas.
    pub fn radiance_map_atlas(&self) -> Option<&Arc<SpecularEnvironmentAtlas>> {
        self.radiance_map_atlas.as_ref()
    }

    /// Set or clear the specular radiance atlas.
    pub fn set_radiance_map_atlas(&mut self, atlas: Option<Arc<SpecularEnvironmentAtlas>>) {
        self.radiance_map_atlas = atlas;
    }
}

// Environment data is read from uniform providers on the render thread
static_assertions::assert_impl_all!(SpecularEnvironmentAtlas: Send, Sync);
static_assertions::assert_impl_all!(EnvironmentMapManager: Send, Sync);

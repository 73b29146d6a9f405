//! Per-model image-based-lighting settings.
//!
//! [`ImageBasedLighting`] is the application-facing switchboard for a
//! model's environment lighting: which sources to use, how strongly they
//! apply, and the hand-authored data for models that bring their own
//! environment. The lighting stage reads it every frame, so changes take
//! effect on the next processed frame without rebuilding the model.

use std::sync::Arc;

use glam::{Mat3, Vec2};

use crate::error::{LightingError, LightingResult};
use crate::lighting::environment::SpecularEnvironmentAtlas;

/// Image-based-lighting settings for one model.
#[derive(Debug, Clone)]
pub struct ImageBasedLighting {
    enabled: bool,
    use_spherical_harmonics: bool,
    use_specular_environment_maps: bool,
    use_default_spherical_harmonics: bool,
    use_default_specular_maps: bool,
    lighting_factor: Vec2,
    luminance_at_zenith: Option<f32>,
    reference_frame_matrix: Option<Mat3>,
    specular_environment_atlas: Option<Arc<SpecularEnvironmentAtlas>>,
}

impl Default for ImageBasedLighting {
    fn default() -> Self {
        Self {
            enabled: true,
            use_spherical_harmonics: false,
            use_specular_environment_maps: false,
            use_default_spherical_harmonics: false,
            use_default_specular_maps: false,
            lighting_factor: Vec2::ONE,
            luminance_at_zenith: None,
            reference_frame_matrix: None,
            specular_environment_atlas: None,
        }
    }
}

impl ImageBasedLighting {
    /// Create settings with the default configuration: lighting enabled at
    /// full strength, no custom or default environment sources selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether image-based lighting applies to this model at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable image-based lighting.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the model supplies hand-authored spherical harmonics.
    pub fn use_spherical_harmonics(&self) -> bool {
        self.use_spherical_harmonics
    }

    /// Select or deselect hand-authored spherical harmonics.
    pub fn set_use_spherical_harmonics(&mut self, use_spherical_harmonics: bool) {
        self.use_spherical_harmonics = use_spherical_harmonics;
    }

    /// Whether the model supplies its own specular environment maps.
    pub fn use_specular_environment_maps(&self) -> bool {
        self.use_specular_environment_maps
    }

    /// Select or deselect model-supplied specular environment maps.
    pub fn set_use_specular_environment_maps(&mut self, use_specular_environment_maps: bool) {
        self.use_specular_environment_maps = use_specular_environment_maps;
    }

    /// Whether the engine's default spherical harmonics may be used when no
    /// computed coefficients exist.
    pub fn use_default_spherical_harmonics(&self) -> bool {
        self.use_default_spherical_harmonics
    }

    /// Allow or forbid falling back to the default spherical harmonics.
    pub fn set_use_default_spherical_harmonics(&mut self, use_default: bool) {
        self.use_default_spherical_harmonics = use_default;
    }

    /// Whether the engine's default specular maps may be used when no
    /// computed atlas is ready.
    pub fn use_default_specular_maps(&self) -> bool {
        self.use_default_specular_maps
    }

    /// Allow or forbid falling back to the default specular maps.
    pub fn set_use_default_specular_maps(&mut self, use_default: bool) {
        self.use_default_specular_maps = use_default;
    }

    /// Get the lighting strength as `(diffuse scale, specular scale)`.
    pub fn lighting_factor(&self) -> Vec2 {
        self.lighting_factor
    }

    /// Set the lighting strength as `(diffuse scale, specular scale)`.
    ///
    /// # Errors
    ///
    /// Returns [`LightingError::LightingFactorOutOfRange`] if either
    /// component falls outside `[0, 1]`.
    pub fn set_lighting_factor(&mut self, factor: Vec2) -> LightingResult<()> {
        for (component, value) in [('x', factor.x), ('y', factor.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LightingError::LightingFactorOutOfRange { component, value });
            }
        }
        self.lighting_factor = factor;
        Ok(())
    }

    /// Get the luminance of the sun at the zenith, in kilocandela per
    /// square meter.
    pub fn luminance_at_zenith(&self) -> Option<f32> {
        self.luminance_at_zenith
    }

    /// Set or clear the sun luminance used to scale the environment
    /// contribution.
    pub fn set_luminance_at_zenith(&mut self, luminance: Option<f32>) {
        self.luminance_at_zenith = luminance;
    }

    /// Get the rotation from world space into the environment map's frame.
    pub fn reference_frame_matrix(&self) -> Option<Mat3> {
        self.reference_frame_matrix
    }

    /// Set or clear the environment reference frame rotation.
    pub fn set_reference_frame_matrix(&mut self, matrix: Option<Mat3>) {
        self.reference_frame_matrix = matrix;
    }

    /// Get the model-supplied specular environment atlas.
    pub fn specular_environment_atlas(&self) -> Option<&Arc<SpecularEnvironmentAtlas>> {
        self.specular_environment_atlas.as_ref()
    }

    /// Attach or detach a model-supplied specular environment atlas.
    pub fn set_specular_environment_atlas(
        &mut self,
        atlas: Option<Arc<SpecularEnvironmentAtlas>>,
    ) {
        self.specular_environment_atlas = atlas;
    }
}

static_assertions::assert_impl_all!(ImageBasedLighting: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ImageBasedLighting::new();
        assert!(settings.enabled());
        assert!(!settings.use_spherical_harmonics());
        assert!(!settings.use_specular_environment_maps());
        assert!(!settings.use_default_spherical_harmonics());
        assert!(!settings.use_default_specular_maps());
        assert_eq!(settings.lighting_factor(), Vec2::ONE);
        assert!(settings.luminance_at_zenith().is_none());
        assert!(settings.reference_frame_matrix().is_none());
        assert!(settings.specular_environment_atlas().is_none());
    }

    #[test]
    fn test_lighting_factor_accepts_unit_range() {
        let mut settings = ImageBasedLighting::new();
        settings.set_lighting_factor(Vec2::new(0.0, 1.0)).unwrap();
        assert_eq!(settings.lighting_factor(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_lighting_factor_rejects_out_of_range_x() {
        let mut settings = ImageBasedLighting::new();
        let err = settings.set_lighting_factor(Vec2::new(1.5, 0.5)).unwrap_err();
        assert_eq!(
            err,
            LightingError::LightingFactorOutOfRange {
                component: 'x',
                value: 1.5
            }
        );
        // The stored factor is untouched on failure.
        assert_eq!(settings.lighting_factor(), Vec2::ONE);
    }

    #[test]
    fn test_lighting_factor_rejects_negative_y() {
        let mut settings = ImageBasedLighting::new();
        let err = settings
            .set_lighting_factor(Vec2::new(0.5, -0.1))
            .unwrap_err();
        assert_eq!(
            err,
            LightingError::LightingFactorOutOfRange {
                component: 'y',
                value: -0.1
            }
        );
    }

    #[test]
    fn test_atlas_round_trip() {
        let mut settings = ImageBasedLighting::new();
        let atlas = Arc::new(SpecularEnvironmentAtlas::new());
        settings.set_specular_environment_atlas(Some(Arc::clone(&atlas)));
        assert!(settings.specular_environment_atlas().is_some());
        settings.set_specular_environment_atlas(None);
        assert!(settings.specular_environment_atlas().is_none());
    }
}

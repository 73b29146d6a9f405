//! Lighting feature selection.
//!
//! Every frame, the lighting stage reduces the model's settings, the
//! computed environment data, and the context capabilities to a small
//! [`LightingFeatures`] value. The selection drives both which shader
//! branches get compiled in and which uniforms get declared, so the two can
//! never disagree.

use crate::lighting::{EnvironmentMapManager, ImageBasedLighting};

/// Data source feeding one lighting channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IblSource {
    /// Model-specific data drives the channel and the model binds its own
    /// uniforms for it.
    Custom,

    /// The engine's default environment drives the channel; its data is
    /// compiled into the shader library, so no extra uniforms are needed.
    Default,

    /// The channel is off.
    Disabled,
}

impl IblSource {
    /// Whether the channel contributes at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether the channel uses model-specific data.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

/// Lighting branches selected for one model in one frame.
///
/// Selection is recomputed from current state every frame. The value is
/// cheap to compare, so callers can diff it against the previous frame's
/// selection to decide whether the shader program must be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightingFeatures {
    /// Source of diffuse irradiance.
    pub diffuse: IblSource,
    /// Source of specular radiance.
    pub specular: IblSource,
    /// Whether the environment reference frame rotation is bound.
    pub reference_frame_matrix: bool,
    /// Whether the contribution is scaled by the sun's zenith luminance.
    pub sun_luminance: bool,
}

impl LightingFeatures {
    /// The selection for a context that cannot sample the specular cubemap:
    /// every branch off.
    pub const DISABLED: Self = Self {
        diffuse: IblSource::Disabled,
        specular: IblSource::Disabled,
        reference_frame_matrix: false,
        sun_luminance: false,
    };

    /// Select the lighting branches for one model.
    ///
    /// Custom data always wins over the default environment: computed
    /// spherical harmonics shadow `use_default_spherical_harmonics`, and a
    /// ready radiance atlas shadows `use_default_specular_maps`. An atlas
    /// that exists but is still generating does not count; the default can
    /// fill in until it flips ready.
    pub fn select(
        settings: &ImageBasedLighting,
        environment: &EnvironmentMapManager,
        supports_specular_cubemap: bool,
    ) -> Self {
        if !supports_specular_cubemap {
            return Self::DISABLED;
        }

        let reference_frame_matrix = settings.use_spherical_harmonics()
            || settings.use_specular_environment_maps()
            || settings.enabled();

        let diffuse = if environment.spherical_harmonic_coefficients().is_some() {
            IblSource::Custom
        } else if settings.use_default_spherical_harmonics() {
            IblSource::Default
        } else {
            IblSource::Disabled
        };

        let specular = match environment.radiance_map_atlas() {
            Some(atlas) if atlas.ready() => IblSource::Custom,
            _ if settings.use_default_specular_maps() => IblSource::Default,
            _ => IblSource::Disabled,
        };

        let sun_luminance = settings.luminance_at_zenith().is_some();

        Self {
            diffuse,
            specular,
            reference_frame_matrix,
            sun_luminance,
        }
    }
}

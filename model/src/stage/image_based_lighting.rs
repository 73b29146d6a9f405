//! The image-based-lighting pipeline stage.
//!
//! Runs once per model per frame. Selects the lighting branches from the
//! model's settings, the computed environment data, and the context
//! capabilities, declares the matching defines and uniforms into the shared
//! [`ShaderBuilder`], and registers the uniform providers that draw
//! submission invokes later in the frame.

use std::sync::Arc;

use glam::Mat3;
use parking_lot::RwLock;

use crate::context::FrameState;
use crate::lighting::{EnvironmentMapManager, ImageBasedLighting};
use crate::model::Model;
use crate::shader::{ShaderBuilder, ShaderDestination, UniformType};
use crate::stage::{LightingFeatures, ModelPipelineStage, ModelRenderResources};
use crate::uniforms::{UniformMap, UniformValue};

/// GLSL chunk appended to the fragment shader; every branch inside is gated
/// by the defines this stage declares.
const LIGHTING_CHUNK: &str = include_str!("../../shaders/model/image_based_lighting.frag");

/// Declare the defines and uniforms for a feature selection.
///
/// The base define and the lighting factor are declared for every model,
/// whatever the selection says; the remaining declarations follow the
/// selected branches in decision order. Panics if any of the names is
/// already declared in `builder`, which means the stage ran twice against
/// the same resources without a `clear()`.
fn declare_lighting(features: &LightingFeatures, builder: &mut ShaderBuilder) {
    let fragment = ShaderDestination::FRAGMENT;

    builder.add_define("IBL_LIGHTING", fragment);
    builder.add_uniform(UniformType::Vec2, "model_ibl_factor", fragment);

    if features.reference_frame_matrix {
        builder.add_uniform(UniformType::Mat3, "model_ibl_reference_frame_matrix", fragment);
    }

    if features.diffuse.is_enabled() {
        builder.add_define("DIFFUSE_IBL", fragment);
        if features.diffuse.is_custom() {
            builder.add_define("CUSTOM_SPHERICAL_HARMONICS", fragment);
            builder.add_uniform(
                UniformType::Vec3Array(9),
                "model_spherical_harmonic_coefficients",
                fragment,
            );
        }
    }

    if features.specular.is_enabled() {
        builder.add_define("SPECULAR_IBL", fragment);
        if features.specular.is_custom() {
            builder.add_define("CUSTOM_SPECULAR_IBL", fragment);
            builder.add_uniform(
                UniformType::SamplerCube,
                "model_specular_environment_maps",
                fragment,
            );
            builder.add_uniform(
                UniformType::Float,
                "model_specular_environment_maps_max_lod",
                fragment,
            );
        }
    }

    if features.sun_luminance {
        builder.add_define("USE_SUN_LUMINANCE", fragment);
        builder.add_uniform(UniformType::Float, "model_luminance_at_zenith", fragment);
    }

    builder.add_fragment_lines(LIGHTING_CHUNK);
}

/// Build the uniform providers for one model.
///
/// The table is built independently of the feature selection; a binding
/// whose uniform was never declared is simply never invoked. Providers
/// capture the shared handles and read current state at invocation time, so
/// values reflect whatever the model holds when draw submission asks, not
/// when this function ran. When the environment manager holds a radiance
/// atlas the specular bindings are rebound to that atlas, whether or not its
/// mip chain is ready yet.
fn build_uniform_map(
    settings: &Arc<RwLock<ImageBasedLighting>>,
    environment: &Arc<RwLock<EnvironmentMapManager>>,
) -> UniformMap {
    let mut map = UniformMap::new();

    let handle = Arc::clone(settings);
    map.insert(
        "model_ibl_factor",
        Box::new(move || Some(UniformValue::Vec2(handle.read().lighting_factor()))),
    );

    let handle = Arc::clone(settings);
    map.insert(
        "model_ibl_reference_frame_matrix",
        Box::new(move || {
            Some(UniformValue::Mat3(
                handle.read().reference_frame_matrix().unwrap_or(Mat3::IDENTITY),
            ))
        }),
    );

    let handle = Arc::clone(settings);
    map.insert(
        "model_luminance_at_zenith",
        Box::new(move || handle.read().luminance_at_zenith().map(UniformValue::Float)),
    );

    let handle = Arc::clone(environment);
    map.insert(
        "model_spherical_harmonic_coefficients",
        Box::new(move || {
            handle
                .read()
                .spherical_harmonic_coefficients()
                .map(|sh| UniformValue::Vec3Array(sh.coefficients().to_vec()))
        }),
    );

    // Base specular bindings read through the settings' own atlas reference.
    let handle = Arc::clone(settings);
    map.insert(
        "model_specular_environment_maps",
        Box::new(move || {
            handle
                .read()
                .specular_environment_atlas()
                .and_then(|atlas| atlas.texture())
                .map(UniformValue::CubeMap)
        }),
    );
    let handle = Arc::clone(settings);
    map.insert(
        "model_specular_environment_maps_max_lod",
        Box::new(move || {
            handle
                .read()
                .specular_environment_atlas()
                .map(|atlas| UniformValue::Float(atlas.max_mip_level()))
        }),
    );

    // A computed radiance atlas overrides the settings-level bindings. The
    // override pins the atlas object seen by this run; its interior state is
    // still read live, so a publish between now and draw submission shows up.
    let atlas = environment.read().radiance_map_atlas().cloned();
    if let Some(atlas) = atlas {
        let pinned = Arc::clone(&atlas);
        map.insert(
            "model_specular_environment_maps",
            Box::new(move || pinned.texture().map(UniformValue::CubeMap)),
        );
        let pinned = Arc::clone(&atlas);
        map.insert(
            "model_specular_environment_maps_size",
            Box::new(move || Some(UniformValue::Vec2(pinned.dimensions()))),
        );
        let pinned = Arc::clone(&atlas);
        map.insert(
            "model_specular_environment_maps_max_lod",
            Box::new(move || Some(UniformValue::Float(pinned.max_mip_level()))),
        );
    }

    map
}

/// Configures image-based lighting for one model in one frame.
///
/// See the [module docs](self) for the shape of the outputs. The stage holds
/// no state of its own; everything it needs arrives through the model and
/// the frame.
#[derive(Debug, Default)]
pub struct ImageBasedLightingStage;

impl ImageBasedLightingStage {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

impl ModelPipelineStage for ImageBasedLightingStage {
    fn name(&self) -> &str {
        "image_based_lighting"
    }

    fn process(&self, resources: &mut ModelRenderResources, model: &Model, frame: &FrameState) {
        let settings = model.image_based_lighting();
        let environment = model.environment_maps();

        let features = {
            let settings = settings.read();
            let environment = environment.read();
            LightingFeatures::select(
                &settings,
                &environment,
                frame.context().supports_specular_cubemap(),
            )
        };

        log::debug!(
            "image_based_lighting: model {:?}, diffuse {:?}, specular {:?}, frame {}",
            model.label().unwrap_or("<unlabeled>"),
            features.diffuse,
            features.specular,
            frame.frame_number()
        );

        declare_lighting(&features, &mut resources.shader_builder);

        let local = build_uniform_map(settings, environment);
        resources.uniform_map.merge(local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TextureHandle;
    use crate::lighting::SpecularEnvironmentAtlas;
    use crate::stage::IblSource;
    use glam::Vec2;

    fn shared<T>(value: T) -> Arc<RwLock<T>> {
        Arc::new(RwLock::new(value))
    }

    #[test]
    fn test_base_declarations_when_everything_disabled() {
        let mut builder = ShaderBuilder::new();
        declare_lighting(&LightingFeatures::DISABLED, &mut builder);

        assert!(builder.has_define("IBL_LIGHTING"));
        assert!(builder.has_uniform("model_ibl_factor"));
        assert_eq!(builder.defines().len(), 1);
        assert_eq!(builder.uniforms().len(), 1);
        // The fragment chunk rides along even when no branch is selected;
        // its contents are compiled out by the missing defines.
        assert!(builder.fragment_source().contains("IBL_LIGHTING"));
    }

    #[test]
    fn test_custom_branches_declare_their_uniforms() {
        let features = LightingFeatures {
            diffuse: IblSource::Custom,
            specular: IblSource::Custom,
            reference_frame_matrix: true,
            sun_luminance: true,
        };
        let mut builder = ShaderBuilder::new();
        declare_lighting(&features, &mut builder);

        for define in [
            "IBL_LIGHTING",
            "DIFFUSE_IBL",
            "CUSTOM_SPHERICAL_HARMONICS",
            "SPECULAR_IBL",
            "CUSTOM_SPECULAR_IBL",
            "USE_SUN_LUMINANCE",
        ] {
            assert!(builder.has_define(define), "missing define {define}");
        }
        for uniform in [
            "model_ibl_factor",
            "model_ibl_reference_frame_matrix",
            "model_spherical_harmonic_coefficients",
            "model_specular_environment_maps",
            "model_specular_environment_maps_max_lod",
            "model_luminance_at_zenith",
        ] {
            assert!(builder.has_uniform(uniform), "missing uniform {uniform}");
        }
    }

    #[test]
    fn test_default_branches_declare_defines_only() {
        let features = LightingFeatures {
            diffuse: IblSource::Default,
            specular: IblSource::Default,
            reference_frame_matrix: false,
            sun_luminance: false,
        };
        let mut builder = ShaderBuilder::new();
        declare_lighting(&features, &mut builder);

        assert!(builder.has_define("DIFFUSE_IBL"));
        assert!(builder.has_define("SPECULAR_IBL"));
        assert!(!builder.has_define("CUSTOM_SPHERICAL_HARMONICS"));
        assert!(!builder.has_define("CUSTOM_SPECULAR_IBL"));
        assert!(!builder.has_uniform("model_spherical_harmonic_coefficients"));
        assert!(!builder.has_uniform("model_specular_environment_maps"));
    }

    #[test]
    fn test_uniform_map_reads_settings_live() {
        let settings = shared(ImageBasedLighting::new());
        let environment = shared(EnvironmentMapManager::new());
        let map = build_uniform_map(&settings, &environment);

        assert_eq!(
            map.value_of("model_ibl_factor"),
            Some(Some(UniformValue::Vec2(Vec2::ONE)))
        );

        settings
            .write()
            .set_lighting_factor(Vec2::new(0.25, 0.75))
            .unwrap();
        assert_eq!(
            map.value_of("model_ibl_factor"),
            Some(Some(UniformValue::Vec2(Vec2::new(0.25, 0.75))))
        );
    }

    #[test]
    fn test_reference_frame_falls_back_to_identity() {
        let settings = shared(ImageBasedLighting::new());
        let environment = shared(EnvironmentMapManager::new());
        let map = build_uniform_map(&settings, &environment);

        assert_eq!(
            map.value_of("model_ibl_reference_frame_matrix"),
            Some(Some(UniformValue::Mat3(Mat3::IDENTITY)))
        );
    }

    #[test]
    fn test_absent_optionals_bind_as_none() {
        let settings = shared(ImageBasedLighting::new());
        let environment = shared(EnvironmentMapManager::new());
        let map = build_uniform_map(&settings, &environment);

        assert_eq!(map.value_of("model_luminance_at_zenith"), Some(None));
        assert_eq!(
            map.value_of("model_spherical_harmonic_coefficients"),
            Some(None)
        );
        assert_eq!(map.value_of("model_specular_environment_maps"), Some(None));
    }

    #[test]
    fn test_environment_atlas_overrides_settings_atlas() {
        let settings_atlas = Arc::new(SpecularEnvironmentAtlas::new());
        settings_atlas.publish(TextureHandle(1), Vec2::new(64.0, 64.0), 6.0);
        let mut config = ImageBasedLighting::new();
        config.set_specular_environment_atlas(Some(settings_atlas));
        let settings = shared(config);

        let computed_atlas = Arc::new(SpecularEnvironmentAtlas::new());
        computed_atlas.publish(TextureHandle(2), Vec2::new(256.0, 256.0), 8.0);
        let mut manager = EnvironmentMapManager::new();
        manager.set_radiance_map_atlas(Some(computed_atlas));
        let environment = shared(manager);

        let map = build_uniform_map(&settings, &environment);
        assert_eq!(
            map.value_of("model_specular_environment_maps"),
            Some(Some(UniformValue::CubeMap(TextureHandle(2))))
        );
        assert_eq!(
            map.value_of("model_specular_environment_maps_size"),
            Some(Some(UniformValue::Vec2(Vec2::new(256.0, 256.0))))
        );
        assert_eq!(
            map.value_of("model_specular_environment_maps_max_lod"),
            Some(Some(UniformValue::Float(8.0)))
        );
    }

    #[test]
    fn test_pending_override_atlas_still_rebinds() {
        let mut manager = EnvironmentMapManager::new();
        let atlas = Arc::new(SpecularEnvironmentAtlas::new());
        manager.set_radiance_map_atlas(Some(Arc::clone(&atlas)));
        let environment = shared(manager);
        let settings = shared(ImageBasedLighting::new());

        let map = build_uniform_map(&settings, &environment);

        // The size binding only exists through the override.
        assert!(map.contains("model_specular_environment_maps_size"));
        assert_eq!(map.value_of("model_specular_environment_maps"), Some(None));

        // A publish after the table was built shows up through the pin.
        atlas.publish(TextureHandle(9), Vec2::new(128.0, 128.0), 7.0);
        assert_eq!(
            map.value_of("model_specular_environment_maps"),
            Some(Some(UniformValue::CubeMap(TextureHandle(9))))
        );
    }
}

//! # IBL Stage Demo
//!
//! Demonstrates:
//! - Running the image-based-lighting stage against a model offline
//! - How settings and computed environment data steer branch selection
//! - The composed fragment preamble handed to the shader compiler
//! - Live uniform providers picking up state changes after the stage ran
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin ibl_stage_demo
//! ```

use std::sync::Arc;

use glam::{Vec2, vec3};

use firelily_model::{
    FrameState, ImageBasedLightingStage, Model, ModelPipelineStage, ModelRenderResources,
    RenderContext, SpecularEnvironmentAtlas, SphericalHarmonics, TextureHandle,
};

fn print_resources(title: &str, resources: &ModelRenderResources) {
    println!("=== {title} ===");
    println!("--- fragment preamble ---");
    print!("{}", resources.shader_builder.fragment_preamble());
    println!("--- uniform values ---");
    for name in resources.uniform_map.names() {
        match resources.uniform_map.value_of(name) {
            Some(Some(value)) => println!("{name} = {value:?}"),
            Some(None) => println!("{name} = <absent>"),
            None => unreachable!("iterated name is always bound"),
        }
    }
    println!();
}

fn main() {
    env_logger::init();
    firelily_model::init();

    let stage = ImageBasedLightingStage::new();
    let frame = FrameState::new(Arc::new(RenderContext::default()));

    // A model with nothing configured: only the base branch compiles in.
    let model = Model::default().with_label("minimal");
    let mut resources = ModelRenderResources::new();
    stage.process(&mut resources, &model, &frame);
    print_resources("minimal model", &resources);

    // Turn on the default environment and a sun luminance override.
    {
        let mut settings = model.image_based_lighting().write();
        settings.set_use_default_spherical_harmonics(true);
        settings.set_use_default_specular_maps(true);
        settings.set_luminance_at_zenith(Some(1.5));
        settings
            .set_lighting_factor(Vec2::new(0.8, 1.0))
            .expect("factor is in range");
    }
    resources.clear();
    stage.process(&mut resources, &model, &frame);
    print_resources("default environment + sun luminance", &resources);

    // Publish computed environment data; the custom branches take over and
    // the atlas override rebinds the specular uniforms.
    let atlas = Arc::new(SpecularEnvironmentAtlas::new());
    {
        let mut environment = model.environment_maps().write();
        environment.set_spherical_harmonic_coefficients(Some(SphericalHarmonics::new(
            std::array::from_fn(|i| vec3(0.1 * i as f32, 0.2, 0.3)),
        )));
        environment.set_radiance_map_atlas(Some(Arc::clone(&atlas)));
    }
    atlas.publish(TextureHandle(7), Vec2::splat(256.0), 8.0);
    resources.clear();
    stage.process(&mut resources, &model, &frame);
    print_resources("computed environment data", &resources);

    // Providers are live: a publish after processing shows up without
    // running the stage again.
    atlas.publish(TextureHandle(8), Vec2::splat(512.0), 9.0);
    println!("after re-publish, without reprocessing:");
    println!(
        "model_specular_environment_maps = {:?}",
        resources
            .uniform_map
            .value_of("model_specular_environment_maps")
    );
}

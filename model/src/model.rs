//! Model-side ownership of lighting state.
//!
//! A [`Model`] shares its lighting settings and environment data behind
//! `Arc<RwLock<..>>` so that uniform providers registered by the pipeline
//! stages keep reading live state after the stage has returned.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::lighting::{EnvironmentMapManager, ImageBasedLighting};

/// A renderable model, reduced to the state the lighting stages consume.
pub struct Model {
    label: Option<String>,
    image_based_lighting: Arc<RwLock<ImageBasedLighting>>,
    environment_maps: Arc<RwLock<EnvironmentMapManager>>,
}

impl Model {
    /// Create a model with the given lighting settings and no computed
    /// environment data.
    pub fn new(image_based_lighting: ImageBasedLighting) -> Self {
        Self {
            label: None,
            image_based_lighting: Arc::new(RwLock::new(image_based_lighting)),
            environment_maps: Arc::new(RwLock::new(EnvironmentMapManager::new())),
        }
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the shared lighting settings.
    pub fn image_based_lighting(&self) -> &Arc<RwLock<ImageBasedLighting>> {
        &self.image_based_lighting
    }

    /// Get the shared environment data.
    pub fn environment_maps(&self) -> &Arc<RwLock<EnvironmentMapManager>> {
        &self.environment_maps
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ImageBasedLighting::default())
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("label", &self.label)
            .field("image_based_lighting", &*self.image_based_lighting.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(Model: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_are_shared() {
        let model = Model::default().with_label("shared");
        assert_eq!(model.label(), Some("shared"));

        let handle = Arc::clone(model.image_based_lighting());
        handle.write().set_enabled(false);
        assert!(!model.image_based_lighting().read().enabled());
    }

    #[test]
    fn test_environment_data_is_shared() {
        let model = Model::default();
        let handle = Arc::clone(model.environment_maps());
        handle
            .write()
            .set_spherical_harmonic_coefficients(Some(crate::lighting::SphericalHarmonics::new(
                [glam::Vec3::ONE; 9],
            )));
        assert!(model
            .environment_maps()
            .read()
            .spherical_harmonic_coefficients()
            .is_some());
    }
}

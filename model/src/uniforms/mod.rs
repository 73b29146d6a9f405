//! Uniform values and the per-model binding table.
//!
//! Pipeline stages never write uniform values directly. They register
//! [`UniformProvider`] closures in a [`UniformMap`]; draw submission invokes
//! the providers after every stage has run, so changes made to the model's
//! state between stage processing and submission are picked up.

use std::collections::BTreeMap;
use std::fmt;

use glam::{Mat3, Vec2, Vec3};

use crate::context::TextureHandle;

/// A value supplied to a shader uniform at draw time.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// `float`
    Float(f32),

    /// `vec2`
    Vec2(Vec2),

    /// `vec3`
    Vec3(Vec3),

    /// `mat3`
    Mat3(Mat3),

    /// `vec3[n]`
    Vec3Array(Vec<Vec3>),

    /// `samplerCube` (bound as a texture, not uploaded into a buffer)
    CubeMap(TextureHandle),
}

impl UniformValue {
    /// Raw bytes for buffer-backed values.
    ///
    /// Returns `None` for sampler values, which bind through the texture
    /// table instead of a uniform buffer. Array values are tightly packed;
    /// the uploader restrides them to the buffer layout.
    pub fn pod_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Float(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec2(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec3(v) => Some(bytemuck::bytes_of(v)),
            Self::Mat3(v) => Some(bytemuck::bytes_of(v)),
            Self::Vec3Array(v) => Some(bytemuck::cast_slice(v)),
            Self::CubeMap(_) => None,
        }
    }
}

/// Zero-argument closure producing the current value of one uniform.
///
/// Providers capture shared handles into live model state and read them at
/// invocation time. `None` means the value is currently absent, such as a
/// texture that has not finished generating.
pub type UniformProvider = Box<dyn Fn() -> Option<UniformValue> + Send + Sync>;

/// Uniform-name to provider table for one model.
///
/// Iteration order is the sorted name order. Inserting a name that already
/// exists replaces the previous provider, which is what lets a later stage
/// override an earlier stage's binding.
#[derive(Default)]
pub struct UniformMap {
    entries: BTreeMap<String, UniformProvider>,
}

impl UniformMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a provider, replacing any previous provider for the name.
    pub fn insert(&mut self, name: impl Into<String>, provider: UniformProvider) {
        self.entries.insert(name.into(), provider);
    }

    /// Get the provider bound to a name.
    pub fn get(&self, name: &str) -> Option<&UniformProvider> {
        self.entries.get(name)
    }

    /// Invoke the provider bound to a name.
    ///
    /// The outer `Option` is `None` when nothing is bound to the name; the
    /// inner `Option` is the provider's current answer.
    pub fn value_of(&self, name: &str) -> Option<Option<UniformValue>> {
        self.entries.get(name).map(|provider| provider())
    }

    /// Whether a provider is bound to the name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Merge another table into this one. On name collisions the entries of
    /// `other` win.
    pub fn merge(&mut self, other: UniformMap) {
        self.entries.extend(other.entries);
    }

    /// Iterate the bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for UniformMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformMap")
            .field("len", &self.entries.len())
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// Providers are invoked from the render thread
static_assertions::assert_impl_all!(UniformMap: Send, Sync);

//! Shader assembly for model pipeline stages.
//!
//! Pipeline stages do not produce final shader programs. Each stage appends
//! compile-time defines, uniform declarations, and source chunks to a
//! [`ShaderBuilder`]; the downstream shader compiler renders the result into
//! the final GLSL once every stage has run.
//!
//! Declarations keep their insertion order, so the preamble of the composed
//! shader reads in stage order:
//!
//! ```glsl
//! #define IBL_LIGHTING
//! #define DIFFUSE_IBL
//! uniform vec2 model_ibl_factor;
//! uniform mat3 model_ibl_reference_frame_matrix;
//! ```

use std::collections::HashSet;
use std::fmt;

bitflags::bitflags! {
    /// Shader stages a declaration targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderDestination: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Fragment shader stage.
        const FRAGMENT = 1 << 1;
        /// Both stages.
        const BOTH = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

/// GLSL type of a declared uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    /// `float`
    Float,

    /// `vec2`
    Vec2,

    /// `vec3`
    Vec3,

    /// `mat3`
    Mat3,

    /// `vec3[n]`
    Vec3Array(usize),

    /// `samplerCube`
    SamplerCube,
}

impl UniformType {
    /// GLSL keyword for the element type.
    pub fn glsl_keyword(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 | Self::Vec3Array(_) => "vec3",
            Self::Mat3 => "mat3",
            Self::SamplerCube => "samplerCube",
        }
    }

    /// Array length, for array types.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::Vec3Array(len) => Some(*len),
            _ => None,
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_len() {
            Some(len) => write!(f, "{}[{}]", self.glsl_keyword(), len),
            None => write!(f, "{}", self.glsl_keyword()),
        }
    }
}

/// A compile-time shader define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDefine {
    /// Macro name.
    pub name: String,
    /// Macro value; `None` renders a bare `#define NAME`.
    pub value: Option<String>,
    /// Stages the define is emitted into.
    pub destination: ShaderDestination,
}

impl ShaderDefine {
    /// Render the `#define` directive.
    pub fn to_directive(&self) -> String {
        match &self.value {
            Some(value) => format!("#define {} {}", self.name, value),
            None => format!("#define {}", self.name),
        }
    }
}

/// A uniform declaration emitted into the shader preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDeclaration {
    /// Uniform name.
    pub name: String,
    /// GLSL type.
    pub ty: UniformType,
    /// Stages the declaration is emitted into.
    pub destination: ShaderDestination,
}

impl UniformDeclaration {
    /// Render the GLSL declaration, with the array suffix after the name.
    pub fn to_glsl(&self) -> String {
        match self.ty.array_len() {
            Some(len) => format!("uniform {} {}[{}];", self.ty.glsl_keyword(), self.name, len),
            None => format!("uniform {} {};", self.ty.glsl_keyword(), self.name),
        }
    }
}

/// Accumulates shader declarations and source chunks for one shader program.
///
/// Stages append in pipeline order and the builder preserves that order in
/// the rendered output. Names are unique across the whole program: declaring
/// the same define or uniform twice is a stage-sequencing bug, not input
/// data, so the builder panics rather than silently merging.
///
/// # Example
///
/// ```ignore
/// let mut builder = ShaderBuilder::new();
/// builder.add_define("IBL_LIGHTING", ShaderDestination::FRAGMENT);
/// builder.add_uniform(UniformType::Vec2, "model_ibl_factor", ShaderDestination::FRAGMENT);
/// builder.add_fragment_lines(include_str!("../shaders/lighting.frag"));
/// let source = builder.fragment_source();
/// ```
#[derive(Debug, Default)]
pub struct ShaderBuilder {
    defines: Vec<ShaderDefine>,
    uniforms: Vec<UniformDeclaration>,
    vertex_lines: Vec<String>,
    fragment_lines: Vec<String>,
    define_names: HashSet<String>,
    uniform_names: HashSet<String>,
}

impl ShaderBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bare `#define NAME`.
    ///
    /// # Panics
    ///
    /// Panics if a define with this name was already added.
    pub fn add_define(&mut self, name: impl Into<String>, destination: ShaderDestination) {
        self.insert_define(name.into(), None, destination);
    }

    /// Add a `#define NAME VALUE`.
    ///
    /// # Panics
    ///
    /// Panics if a define with this name was already added.
    pub fn add_define_with_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        destination: ShaderDestination,
    ) {
        self.insert_define(name.into(), Some(value.into()), destination);
    }

    fn insert_define(
        &mut self,
        name: String,
        value: Option<String>,
        destination: ShaderDestination,
    ) {
        if !self.define_names.insert(name.clone()) {
            panic!("ShaderBuilder: define '{name}' is already declared");
        }
        self.defines.push(ShaderDefine {
            name,
            value,
            destination,
        });
    }

    /// Add a uniform declaration.
    ///
    /// # Panics
    ///
    /// Panics if a uniform with this name was already declared.
    pub fn add_uniform(
        &mut self,
        ty: UniformType,
        name: impl Into<String>,
        destination: ShaderDestination,
    ) {
        let name = name.into();
        if !self.uniform_names.insert(name.clone()) {
            panic!("ShaderBuilder: uniform '{name}' is already declared");
        }
        self.uniforms.push(UniformDeclaration {
            name,
            ty,
            destination,
        });
    }

    /// Append a source chunk to the vertex shader body.
    pub fn add_vertex_lines(&mut self, lines: impl Into<String>) {
        self.vertex_lines.push(lines.into());
    }

    /// Append a source chunk to the fragment shader body.
    pub fn add_fragment_lines(&mut self, lines: impl Into<String>) {
        self.fragment_lines.push(lines.into());
    }

    /// Get the defines, in insertion order.
    pub fn defines(&self) -> &[ShaderDefine] {
        &self.defines
    }

    /// Get the uniform declarations, in insertion order.
    pub fn uniforms(&self) -> &[UniformDeclaration] {
        &self.uniforms
    }

    /// Whether a define with this name was added.
    pub fn has_define(&self, name: &str) -> bool {
        self.define_names.contains(name)
    }

    /// Whether a uniform with this name was declared.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform_names.contains(name)
    }

    /// Render the vertex-stage preamble: defines, then uniforms.
    pub fn vertex_preamble(&self) -> String {
        self.preamble_for(ShaderDestination::VERTEX)
    }

    /// Render the fragment-stage preamble: defines, then uniforms.
    pub fn fragment_preamble(&self) -> String {
        self.preamble_for(ShaderDestination::FRAGMENT)
    }

    fn preamble_for(&self, destination: ShaderDestination) -> String {
        let mut preamble = String::new();
        for define in &self.defines {
            if define.destination.intersects(destination) {
                preamble.push_str(&define.to_directive());
                preamble.push('\n');
            }
        }
        for uniform in &self.uniforms {
            if uniform.destination.intersects(destination) {
                preamble.push_str(&uniform.to_glsl());
                preamble.push('\n');
            }
        }
        preamble
    }

    /// Render the full vertex shader: preamble, then source chunks.
    pub fn vertex_source(&self) -> String {
        Self::render(self.vertex_preamble(), &self.vertex_lines)
    }

    /// Render the full fragment shader: preamble, then source chunks.
    pub fn fragment_source(&self) -> String {
        Self::render(self.fragment_preamble(), &self.fragment_lines)
    }

    fn render(preamble: String, lines: &[String]) -> String {
        let mut source = preamble;
        for chunk in lines {
            if !source.is_empty() {
                source.push('\n');
            }
            source.push_str(chunk);
            if !chunk.ends_with('\n') {
                source.push('\n');
            }
        }
        source
    }

    /// Reset the builder for reuse.
    pub fn clear(&mut self) {
        self.defines.clear();
        self.uniforms.clear();
        self.vertex_lines.clear();
        self.fragment_lines.clear();
        self.define_names.clear();
        self.uniform_names.clear();
    }
}

static_assertions::assert_impl_all!(ShaderBuilder: Send, Sync);

use std::collections::BTreeMap;

use glam::Vec3;

use crate::model::scene::{ObjectId, SceneGraph};

pub const TIME: &str = "time";
pub const LIGHT_POSITION: &str = "lightPosition";
pub const BASE_COLOR: &str = "baseColor";
pub const AMBIENT_INTENSITY: &str = "ambientIntensity";
pub const ATTENUATION_FACTOR: &str = "attenuationFactor";

/// The three shader programs in the scene, one WGSL module each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderProgram {
    Cube,
    Alphabet,
    Digit,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 3] = [ShaderProgram::Cube, ShaderProgram::Alphabet, ShaderProgram::Digit];

    pub fn label(self) -> &'static str {
        match self {
            ShaderProgram::Cube => "cube",
            ShaderProgram::Alphabet => "alphabet",
            ShaderProgram::Digit => "digit",
        }
    }
}

/// Linear-space RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    /// Build from an sRGB hex triplet such as `0x00ff00`.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Color(Vec3::new(channel(16), channel(8), channel(0)))
    }

    pub fn to_array(self) -> [f32; 3] {
        self.0.to_array()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// A named shader input.
///
/// `PositionOf` is a live reference into the scene graph: it is resolved when
/// read, so the value always follows the referenced object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec3(Vec3),
    Color(Color),
    PositionOf(ObjectId),
}

impl Uniform {
    /// Replace live references with the referenced object's current position.
    ///
    /// A dangling handle resolves to the origin.
    pub fn resolve(&self, scene: &SceneGraph) -> Uniform {
        match *self {
            Uniform::PositionOf(id) => Uniform::Vec3(scene.position(id).unwrap_or(Vec3::ZERO)),
            other => other,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Uniform::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            Uniform::Vec3(v) => Some(v),
            Uniform::Color(c) => Some(c.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub program: ShaderProgram,
    uniforms: BTreeMap<String, Uniform>,
}

impl ShaderMaterial {
    pub fn new(program: ShaderProgram) -> Self {
        Self { program, uniforms: BTreeMap::new() }
    }

    pub fn with_uniform(mut self, name: &str, value: Uniform) -> Self {
        self.set_uniform(name, value);
        self
    }

    pub fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.uniforms.insert(name.to_string(), value);
    }

    /// The stored value, live references left unresolved.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.keys().map(String::as_str)
    }

    pub fn float(&self, name: &str, scene: &SceneGraph) -> Option<f32> {
        self.uniform(name)?.resolve(scene).as_float()
    }

    pub fn vec3(&self, name: &str, scene: &SceneGraph) -> Option<Vec3> {
        self.uniform(name)?.resolve(scene).as_vec3()
    }
}

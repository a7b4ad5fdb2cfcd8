use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::model::material::ShaderMaterial;
use crate::utils::Mesh;

/// Handle to an object in a [`SceneGraph`]. Stable for the graph's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
    Alphabet,
    Digit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    CubeLight,
    Glyph(GlyphKind),
}

#[derive(Debug, Clone)]
pub struct RenderableObject {
    pub name: String,
    pub kind: ObjectKind,
    pub geometry: Arc<Mesh>,
    pub material: ShaderMaterial,
    pub position: Vec3,
}

impl RenderableObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, geometry: Mesh, material: ShaderMaterial) -> Self {
        Self {
            name: name.into(),
            kind,
            geometry: Arc::new(geometry),
            material,
            position: Vec3::ZERO,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }
}

/// Flat set of renderables drawn together. Objects are only ever added.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    objects: Vec<RenderableObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: RenderableObject) -> ObjectId {
        tracing::debug!(name = %object.name, kind = ?object.kind, "adding object to scene");
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&RenderableObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut RenderableObject> {
        self.objects.get_mut(id.0)
    }

    pub fn position(&self, id: ObjectId) -> Option<Vec3> {
        self.get(id).map(|o| o.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &RenderableObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }
}

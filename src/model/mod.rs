// MODEL: scene data, geometry and fonts
pub mod camera;
pub mod font;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod text;

pub use camera::PerspectiveCamera;
pub use font::{Font, Shape};
pub use material::{Color, ShaderMaterial, ShaderProgram, Uniform};
pub use scene::{GlyphKind, ObjectId, ObjectKind, RenderableObject, SceneGraph};

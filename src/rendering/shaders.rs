//! Built-in GLSL sources, one fragment stage per render mode over a shared
//! vertex stage. Kept as plain files so they can be tweaked without touching
//! Rust code; user-supplied pairs go through the same `ShaderProgram` path.

pub const MODEL_VERTEX: &str = include_str!("shaders/model.vert");
pub const POSITION_FRAGMENT: &str = include_str!("shaders/position.frag");
pub const NORMAL_FRAGMENT: &str = include_str!("shaders/normal.frag");
pub const TEXCOORD_FRAGMENT: &str = include_str!("shaders/texcoord.frag");
pub const UVTEST_FRAGMENT: &str = include_str!("shaders/uvtest.frag");
pub const PHONG_FRAGMENT: &str = include_str!("shaders/phong.frag");

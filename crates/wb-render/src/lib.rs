pub mod hit;
pub mod scene;

pub use hit::{Hit, ItemPart, hit_test, hit_test_rect};
pub use scene::{RenderScene, SceneInput, build_scene};

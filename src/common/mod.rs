//! Scene handling shared by the library and the `link-budget` binary.

pub mod link_matrix;
pub mod scene;

pub use link_matrix::{Link, LinkMatrix};
pub use scene::{Node, Scene, SceneLoadError, load_scene, parse_scene, resolve_propagation};

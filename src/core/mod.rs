pub mod camera;
pub mod canvas;
pub mod face;
pub mod intersect;
pub mod mesh;

pub use camera::Camera;
pub use canvas::Canvas;
pub use face::Face;
pub use mesh::{Hit, Mesh};

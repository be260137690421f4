//! Streaming voxel world engine: chunked terrain, torch lighting, water
//! surfaces, and raycast edits, with all heavy work on background workers.
#![forbid(unsafe_code)]

pub mod camera;
pub mod raycast;
pub mod world;

pub use camera::Camera;
pub use raycast::{RayHit, raycast_first_hit_with_face};
pub use world::{StreamingStats, World};

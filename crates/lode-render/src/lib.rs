//! Renderer boundary: device and shader traits, per-chunk GPU state.
//!
//! The engine core never talks to a graphics API directly; it produces plain
//! data and hands it to a [`GraphicsDevice`]. All device calls must come from
//! the thread owning the graphics context; background workers only ever build
//! the CPU-side inputs.
#![forbid(unsafe_code)]

use lode_geom::{Mat4, Vec3};

mod graphics;
mod recording;
mod renderable;

pub use graphics::{ChunkGraphics, RenderResources};
pub use recording::{DeviceOp, RecordingDevice, RecordingShader, UniformValue};
pub use renderable::RenderableChunk;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque uniform sink. Shader compilation and binding live outside the
/// core; the core only pushes named values at draw time.
pub trait ShaderSink {
    fn set_mat4(&mut self, name: &str, value: &Mat4);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_f32(&mut self, name: &str, value: f32);
    fn set_i32(&mut self, name: &str, value: i32);
    fn set_texture(&mut self, name: &str, value: TextureId);
}

/// Minimal GPU surface the core needs: geometry/buffer/texture lifetimes and
/// instanced or plain draws. Every `create_*` must be paired with the
/// matching `dispose_*` by the owner of the returned id.
pub trait GraphicsDevice {
    /// Shared unit-cube geometry with its index buffer.
    fn create_cube_geometry(&mut self) -> GeometryId;
    fn dispose_geometry(&mut self, id: GeometryId);

    /// Instance-transform buffer for one block type of one chunk.
    fn create_instance_buffer(&mut self, transforms: &[Mat4]) -> BufferId;
    /// Triangle-list vertex buffer, `xyz` interleaved.
    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> BufferId;
    fn dispose_buffer(&mut self, id: BufferId);

    /// 3-D light texture, `size`^3 samples in (z, y, x)-major order.
    fn create_light_texture(&mut self, size: usize, samples: &[f32]) -> TextureId;
    fn dispose_texture(&mut self, id: TextureId);

    fn draw_instanced(&mut self, geometry: GeometryId, instances: BufferId, count: usize);
    fn draw_triangles(&mut self, vertices: BufferId, vertex_count: usize);
}

use std::collections::HashSet;

use lode_geom::{Mat4, Vec3};

use crate::{BufferId, GeometryId, GraphicsDevice, ShaderSink, TextureId};

/// Everything a [`RecordingDevice`] saw, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceOp {
    CreateGeometry(GeometryId),
    DisposeGeometry(GeometryId),
    CreateInstanceBuffer(BufferId, usize),
    CreateVertexBuffer(BufferId, usize),
    DisposeBuffer(BufferId),
    CreateLightTexture(TextureId, usize),
    DisposeTexture(TextureId),
    DrawInstanced {
        geometry: GeometryId,
        instances: BufferId,
        count: usize,
    },
    DrawTriangles {
        vertices: BufferId,
        vertex_count: usize,
    },
}

/// Headless [`GraphicsDevice`] that records calls and tracks live handles.
/// Lets the engine loop and its tests run without any window or GPU, and
/// catches leaks and double-disposes.
pub struct RecordingDevice {
    next_id: u32,
    pub ops: Vec<DeviceOp>,
    live_buffers: HashSet<BufferId>,
    live_textures: HashSet<TextureId>,
    live_geometries: HashSet<GeometryId>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ops: Vec::new(),
            live_buffers: HashSet::new(),
            live_textures: HashSet::new(),
            live_geometries: HashSet::new(),
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.len()
    }

    pub fn live_geometries(&self) -> usize {
        self.live_geometries.len()
    }

    pub fn instanced_draws(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DeviceOp::DrawInstanced { .. }))
            .count()
    }

    pub fn triangle_draw_buffers(&self) -> Vec<BufferId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeviceOp::DrawTriangles { vertices, .. } => Some(*vertices),
                _ => None,
            })
            .collect()
    }

    pub fn vertex_buffers_created(&self) -> Vec<BufferId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DeviceOp::CreateVertexBuffer(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_cube_geometry(&mut self) -> GeometryId {
        let id = GeometryId(self.next());
        self.live_geometries.insert(id);
        self.ops.push(DeviceOp::CreateGeometry(id));
        id
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        assert!(self.live_geometries.remove(&id), "geometry {id:?} not live");
        self.ops.push(DeviceOp::DisposeGeometry(id));
    }

    fn create_instance_buffer(&mut self, transforms: &[Mat4]) -> BufferId {
        let id = BufferId(self.next());
        self.live_buffers.insert(id);
        self.ops
            .push(DeviceOp::CreateInstanceBuffer(id, transforms.len()));
        id
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> BufferId {
        let id = BufferId(self.next());
        self.live_buffers.insert(id);
        self.ops
            .push(DeviceOp::CreateVertexBuffer(id, vertices.len()));
        id
    }

    fn dispose_buffer(&mut self, id: BufferId) {
        assert!(self.live_buffers.remove(&id), "buffer {id:?} not live");
        self.ops.push(DeviceOp::DisposeBuffer(id));
    }

    fn create_light_texture(&mut self, size: usize, samples: &[f32]) -> TextureId {
        assert_eq!(samples.len(), size * size * size);
        let id = TextureId(self.next());
        self.live_textures.insert(id);
        self.ops.push(DeviceOp::CreateLightTexture(id, size));
        id
    }

    fn dispose_texture(&mut self, id: TextureId) {
        assert!(self.live_textures.remove(&id), "texture {id:?} not live");
        self.ops.push(DeviceOp::DisposeTexture(id));
    }

    fn draw_instanced(&mut self, geometry: GeometryId, instances: BufferId, count: usize) {
        assert!(self.live_geometries.contains(&geometry));
        assert!(self.live_buffers.contains(&instances));
        self.ops.push(DeviceOp::DrawInstanced {
            geometry,
            instances,
            count,
        });
    }

    fn draw_triangles(&mut self, vertices: BufferId, vertex_count: usize) {
        assert!(self.live_buffers.contains(&vertices));
        self.ops.push(DeviceOp::DrawTriangles {
            vertices,
            vertex_count,
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    F32(f32),
    I32(i32),
    Texture(TextureId),
}

/// Headless [`ShaderSink`] companion to [`RecordingDevice`].
pub struct RecordingShader {
    pub uniforms: Vec<(String, UniformValue)>,
}

impl RecordingShader {
    pub fn new() -> Self {
        Self {
            uniforms: Vec::new(),
        }
    }

    pub fn last(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl Default for RecordingShader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderSink for RecordingShader {
    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.uniforms
            .push((name.to_string(), UniformValue::Mat4(*value)));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.uniforms
            .push((name.to_string(), UniformValue::Vec3(value)));
    }

    fn set_f32(&mut self, name: &str, value: f32) {
        self.uniforms
            .push((name.to_string(), UniformValue::F32(value)));
    }

    fn set_i32(&mut self, name: &str, value: i32) {
        self.uniforms
            .push((name.to_string(), UniformValue::I32(value)));
    }

    fn set_texture(&mut self, name: &str, value: TextureId) {
        self.uniforms
            .push((name.to_string(), UniformValue::Texture(value)));
    }
}

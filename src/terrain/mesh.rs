use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    /// Location 0 is the position, location 1 the band color.
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Layout of one interleaved terrain vertex buffer.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Flat buffers handed to the renderer.
///
/// `positions` and `colors` are parallel and row-major; `indices` is a
/// triangle list with two counter-clockwise triangles per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Positions and colors packed for a single vertex buffer.
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, &color)| Vertex { position, color })
            .collect()
    }

    /// Smooth per-vertex normals, area weighted across adjacent triangles.
    ///
    /// Not kept up to date by the grid: renderers call this after every
    /// buffer update.
    pub fn compute_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(&pa), Some(&pb), Some(&pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vec3::from(pa), Vec3::from(pb), Vec3::from(pc));
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect()
    }
}

/// Triangle list for a `width` x `depth` cell grid laid out row-major with
/// `width + 1` vertices per row.
pub fn triangulate(width: usize, depth: usize) -> Vec<u32> {
    let stride = (width + 1) as u32;
    let mut indices = Vec::with_capacity(width * depth * 6);

    for z in 0..depth as u32 {
        for x in 0..width as u32 {
            let near = z * stride + x;
            let far = near + stride;

            indices.extend_from_slice(&[near, far, near + 1]);
            indices.extend_from_slice(&[near + 1, far, far + 1]);
        }
    }

    indices
}

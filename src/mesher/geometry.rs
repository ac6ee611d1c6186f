//! Mesh geometry types.

/// A vertex in the output mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: [f32; 3],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Vertex color (linear RGBA).
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a quad (two triangles) by vertex indices.
    /// Vertices go counter-clockwise when seen from the front.
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.add_triangle(i0, i1, i2);
        self.add_triangle(i0, i2, i3);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);

        for index in &other.indices {
            self.indices.push(index + offset);
        }
    }

    /// Set every vertex color.
    pub fn paint(&mut self, color: [f32; 4]) {
        for vertex in &mut self.vertices {
            vertex.color = color;
        }
    }

    /// Get positions as a flat array (for glTF export).
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Get normals as a flat array (for glTF export).
    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    /// Get colors as a flat array (for glTF export).
    pub fn colors_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.color).collect()
    }

    /// Min and max corner over all vertex positions.
    pub fn extent(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut vertices = self.vertices.iter();
        let first = vertices.next()?.position;
        let (mut min, mut max) = (first, first);
        for v in vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        Some((min, max))
    }
}

pub const POSITION_COMPONENTS: usize = 3;
pub const COLOR_COMPONENTS: usize = 4;
pub const NORMAL_COMPONENTS: usize = 3;
pub const MATRIX_FLOATS: usize = 16;

/// 6 faces x 2 triangles x 3 vertices.
pub const CUBE_VERTEX_COUNT: usize = 36;

/// Vertex attribute kinds, in the attribute-location order every cube
/// program binds them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttributeKind {
    Position,
    Color,
    Normal,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::Position,
        AttributeKind::Color,
        AttributeKind::Normal,
    ];

    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position => POSITION_COMPONENTS,
            AttributeKind::Color => COLOR_COMPONENTS,
            AttributeKind::Normal => NORMAL_COMPONENTS,
        }
    }

    /// Attributes are tightly packed in separate buffers.
    pub fn stride(self) -> usize {
        0
    }
}

// Counter-clockwise winding is front facing. Each face is listed as two
// triangles sharing the face's top-right and bottom-left corners.
#[rustfmt::skip]
const CUBE_POSITIONS: [f32; CUBE_VERTEX_COUNT * POSITION_COMPONENTS] = [
    // front
    -1.0,  1.0,  1.0,   -1.0, -1.0,  1.0,    1.0,  1.0,  1.0,
    -1.0, -1.0,  1.0,    1.0, -1.0,  1.0,    1.0,  1.0,  1.0,
    // right
     1.0,  1.0,  1.0,    1.0, -1.0,  1.0,    1.0,  1.0, -1.0,
     1.0, -1.0,  1.0,    1.0, -1.0, -1.0,    1.0,  1.0, -1.0,
    // back
     1.0,  1.0, -1.0,    1.0, -1.0, -1.0,   -1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,   -1.0, -1.0, -1.0,   -1.0,  1.0, -1.0,
    // left
    -1.0,  1.0, -1.0,   -1.0, -1.0, -1.0,   -1.0,  1.0,  1.0,
    -1.0, -1.0, -1.0,   -1.0, -1.0,  1.0,   -1.0,  1.0,  1.0,
    // top
    -1.0,  1.0, -1.0,   -1.0,  1.0,  1.0,    1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,    1.0,  1.0,  1.0,    1.0,  1.0, -1.0,
    // bottom
     1.0, -1.0, -1.0,    1.0, -1.0,  1.0,   -1.0, -1.0, -1.0,
     1.0, -1.0,  1.0,   -1.0, -1.0,  1.0,   -1.0, -1.0, -1.0,
];

/// Per-face RGBA, in the same face order as the positions.
const FACE_COLORS: [[f32; COLOR_COMPONENTS]; 6] = [
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 1.0, 0.0, 1.0], // yellow
    [0.0, 1.0, 1.0, 1.0], // cyan
    [1.0, 0.0, 1.0, 1.0], // magenta
];

const FACE_NORMALS: [[f32; NORMAL_COMPONENTS]; 6] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

const VERTICES_PER_FACE: usize = CUBE_VERTEX_COUNT / 6;

/// Immutable unit-cube attribute data, one tightly packed buffer per
/// attribute kind.
#[derive(Debug, Clone)]
pub struct CubeGeometry {
    colors: Vec<f32>,
    normals: Vec<f32>,
}

impl CubeGeometry {
    pub fn new() -> Self {
        Self {
            colors: expand_per_face(&FACE_COLORS),
            normals: expand_per_face(&FACE_NORMALS),
        }
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &CUBE_POSITIONS
    }

    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn attribute(&self, kind: AttributeKind) -> &[f32] {
        match kind {
            AttributeKind::Position => self.positions(),
            AttributeKind::Color => self.colors(),
            AttributeKind::Normal => self.normals(),
        }
    }
}

impl Default for CubeGeometry {
    fn default() -> Self {
        Self::new()
    }
}

fn expand_per_face<const N: usize>(faces: &[[f32; N]; 6]) -> Vec<f32> {
    let mut out = Vec::with_capacity(CUBE_VERTEX_COUNT * N);
    for face in faces {
        for _ in 0..VERTICES_PER_FACE {
            out.extend_from_slice(face);
        }
    }
    out
}

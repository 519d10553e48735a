#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// Numeric identity of a texture page, as handed out by [`crate::TextureRegistry`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(pub u32);

/// A world-space vertex computed by the skeleton runtime for one attachment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub dark_color: [f32; 4],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            uv: [0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
            dark_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// The (texture, blend) pair deciding whether two draws can share one GPU draw call.
///
/// Premultiplied alpha selects a different blend state on the GPU, so it takes part in the key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MaterialKey {
    pub texture: TextureId,
    pub blend: BlendMode,
    pub premultiplied_alpha: bool,
}

impl MaterialKey {
    pub fn new(texture: TextureId, blend: BlendMode) -> Self {
        Self {
            texture,
            blend,
            premultiplied_alpha: false,
        }
    }

    pub fn with_premultiplied_alpha(mut self, premultiplied_alpha: bool) -> Self {
        self.premultiplied_alpha = premultiplied_alpha;
        self
    }
}

/// Interleaved float layout of a batched vertex: `x y z u v r g b a [dr dg db da]`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct VertexLayout {
    pub two_color_tint: bool,
}

impl VertexLayout {
    pub const POSITION_OFFSET: usize = 0;
    pub const UV_OFFSET: usize = 3;
    pub const COLOR_OFFSET: usize = 5;
    pub const DARK_COLOR_OFFSET: usize = 9;

    pub const STRIDE: usize = 9;
    pub const STRIDE_TWO_COLOR: usize = 13;

    pub fn new(two_color_tint: bool) -> Self {
        Self { two_color_tint }
    }

    pub fn stride(self) -> usize {
        if self.two_color_tint {
            Self::STRIDE_TWO_COLOR
        } else {
            Self::STRIDE
        }
    }

    pub(crate) fn write(self, out: &mut Vec<f32>, v: &Vertex, z: f32) {
        out.extend_from_slice(&[v.position[0], v.position[1], z, v.uv[0], v.uv[1]]);
        out.extend_from_slice(&v.color);
        if self.two_color_tint {
            out.extend_from_slice(&v.dark_color);
        }
    }
}

pub(crate) fn multiply_rgba(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
}

use crate::model::multiply_rgba;
use crate::node::{Depth, Positioned, Sized2d, Tinted, Visibility};
use crate::{
    BatchedMesh, BlendMode, Bounds, Error, MaterialKey, MeshBatcher, SkeletonMeshConfig,
    TextureId, Vertex,
};

/// Geometry of one visible attachment, in draw order, as computed by the skeleton runtime
/// (world transform, deform and clipping already applied).
#[derive(Copy, Clone, Debug)]
pub struct AttachmentDraw<'a> {
    pub vertices: &'a [Vertex],
    /// Triangle indices local to `vertices`.
    pub indices: &'a [u32],
    pub texture: TextureId,
    pub blend: BlendMode,
    pub premultiplied_alpha: bool,
}

impl AttachmentDraw<'_> {
    pub fn material_key(&self) -> MaterialKey {
        MaterialKey::new(self.texture, self.blend)
            .with_premultiplied_alpha(self.premultiplied_alpha)
    }
}

/// Feeds attachment draws without collecting them first.
pub trait DrawSource {
    fn for_each_draw(&self, f: &mut dyn FnMut(AttachmentDraw<'_>));
}

/// Renders a skeleton through as many [`MeshBatcher`]s as its geometry needs.
#[derive(Clone, Debug)]
pub struct SkeletonMesh {
    config: SkeletonMeshConfig,
    batchers: Vec<MeshBatcher>,
    active: usize,
    scratch: Vec<Vertex>,
    position: [f32; 2],
    scale: [f32; 2],
    depth: f32,
    visible: bool,
    tint: [f32; 4],
    bounds: Option<Bounds>,
}

struct Frame {
    current: usize,
    z: f32,
}

impl SkeletonMesh {
    pub fn new(config: SkeletonMeshConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            batchers: Vec::new(),
            active: 0,
            scratch: Vec::new(),
            position: [0.0, 0.0],
            scale: [1.0, 1.0],
            depth: 0.0,
            visible: true,
            tint: [1.0, 1.0, 1.0, 1.0],
            bounds: None,
        })
    }

    pub fn config(&self) -> &SkeletonMeshConfig {
        &self.config
    }

    pub fn update<'a, I>(&mut self, draws: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = AttachmentDraw<'a>>,
    {
        let mut frame = self.begin_frame()?;
        let mut result = Ok(());
        for draw in draws {
            if let Err(e) = self.push_draw(&mut frame, draw) {
                result = Err(e);
                break;
            }
        }
        self.finish_frame(frame);
        result
    }

    pub fn update_from(&mut self, source: &dyn DrawSource) -> Result<(), Error> {
        let mut frame = self.begin_frame()?;
        let mut result = Ok(());
        source.for_each_draw(&mut |draw| {
            if result.is_ok() {
                result = self.push_draw(&mut frame, draw);
            }
        });
        self.finish_frame(frame);
        result
    }

    fn begin_frame(&mut self) -> Result<Frame, Error> {
        self.ensure_batcher(0)?;
        self.batchers[0].begin();
        Ok(Frame {
            current: 0,
            z: self.depth,
        })
    }

    fn push_draw(&mut self, frame: &mut Frame, draw: AttachmentDraw<'_>) -> Result<(), Error> {
        if draw.vertices.is_empty() || draw.indices.is_empty() {
            log::trace!("skipping empty draw for texture {}", draw.texture.0);
            return Ok(());
        }

        let num_vertices = draw.vertices.len();
        let num_indices = draw.indices.len();
        let batcher_config = self.config.batcher;
        if num_vertices > batcher_config.max_vertices || num_indices > batcher_config.max_indices()
        {
            return Err(Error::DrawTooLarge {
                vertices: num_vertices,
                indices: num_indices,
                max_vertices: batcher_config.max_vertices,
                max_indices: batcher_config.max_indices(),
            });
        }

        if !self.batchers[frame.current].can_batch(num_vertices, num_indices) {
            let next = frame.current + 1;
            self.ensure_batcher(next)?;
            self.batchers[frame.current].end();
            frame.current = next;
            self.batchers[next].begin();
        }

        let vertices: &[Vertex] = if self.transforms_vertices() {
            let position = self.position;
            let scale = self.scale;
            let tint = self.tint;
            let pma = draw.premultiplied_alpha;
            self.scratch.clear();
            self.scratch.extend(
                draw.vertices
                    .iter()
                    .map(|v| transform_vertex(v, position, scale, tint, pma)),
            );
            &self.scratch
        } else {
            draw.vertices
        };

        let batcher = &mut self.batchers[frame.current];
        let material = batcher.find_material_group(draw.material_key());
        batcher.batch(vertices, draw.indices, frame.z);
        batcher.add_material_group(num_indices, material);
        frame.z += self.config.z_offset;
        Ok(())
    }

    fn finish_frame(&mut self, frame: Frame) {
        self.batchers[frame.current].end();
        for batcher in &mut self.batchers[frame.current + 1..] {
            batcher.clear();
        }
        self.active = frame.current + 1;
        let visible = self.visible;
        for batcher in &mut self.batchers {
            batcher.mesh_mut().set_visible(visible);
        }
    }

    fn ensure_batcher(&mut self, index: usize) -> Result<(), Error> {
        while self.batchers.len() <= index {
            self.batchers.push(MeshBatcher::new(self.config.batcher)?);
            log::debug!(
                "allocated mesh batcher #{} ({} vertices)",
                self.batchers.len(),
                self.config.batcher.max_vertices
            );
        }
        Ok(())
    }

    fn transforms_vertices(&self) -> bool {
        self.position != [0.0, 0.0] || self.scale != [1.0, 1.0] || self.tint != [1.0; 4]
    }

    /// All batchers ever allocated, including ones cleared this frame.
    pub fn batchers(&self) -> &[MeshBatcher] {
        &self.batchers
    }

    /// Meshes written by the last update.
    pub fn meshes(&self) -> impl Iterator<Item = &BatchedMesh> {
        self.batchers[..self.active].iter().map(MeshBatcher::mesh)
    }

    /// Every mesh, so renderers can upload the cleared ones too.
    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut BatchedMesh> {
        self.batchers.iter_mut().map(MeshBatcher::mesh_mut)
    }

    pub fn draw_call_count(&self) -> usize {
        self.meshes().map(|m| m.groups().len()).sum()
    }
}

fn transform_vertex(
    v: &Vertex,
    position: [f32; 2],
    scale: [f32; 2],
    tint: [f32; 4],
    premultiplied_alpha: bool,
) -> Vertex {
    let mut color = multiply_rgba(v.color, tint);
    let mut dark_color = v.dark_color;
    if premultiplied_alpha {
        // Colors arrive premultiplied, so the tint alpha scales rgb as well.
        color[0] *= tint[3];
        color[1] *= tint[3];
        color[2] *= tint[3];
        dark_color[0] *= tint[3];
        dark_color[1] *= tint[3];
        dark_color[2] *= tint[3];
    }
    Vertex {
        position: [
            v.position[0] * scale[0] + position[0],
            v.position[1] * scale[1] + position[1],
        ],
        uv: v.uv,
        color,
        dark_color,
    }
}

impl Positioned for SkeletonMesh {
    fn position(&self) -> [f32; 2] {
        self.position
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.position = [x, y];
    }

    fn scale(&self) -> [f32; 2] {
        self.scale
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = [x, y];
    }
}

impl Depth for SkeletonMesh {
    fn depth(&self) -> f32 {
        self.depth
    }

    fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }
}

impl Visibility for SkeletonMesh {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        for batcher in &mut self.batchers {
            batcher.mesh_mut().set_visible(visible);
        }
    }
}

impl Tinted for SkeletonMesh {
    fn tint(&self) -> [f32; 4] {
        self.tint
    }

    fn set_tint(&mut self, tint: [f32; 4]) {
        self.tint = tint;
    }
}

impl Sized2d for SkeletonMesh {
    fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }
}

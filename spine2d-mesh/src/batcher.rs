use crate::material::{MaterialTable, push_group};
use crate::{
    BatchedMesh, BatcherConfig, Error, Material, MaterialGroup, MaterialId, MaterialKey, MeshGroup,
    Vertex, VertexLayout,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Filling,
    Flushed,
}

/// Packs attachment geometry into shared vertex/index buffers, merging consecutive draws with
/// the same material into one index range.
///
/// One frame is `begin()`, then `batch()` + `add_material_group()` per attachment, then `end()`.
/// Callers check `can_batch()` before every `batch()` and move on to another batcher when it
/// returns `false`.
#[derive(Clone, Debug)]
pub struct MeshBatcher {
    config: BatcherConfig,
    layout: VertexLayout,
    state: BatchState,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    groups: Vec<MaterialGroup>,
    materials: MaterialTable,
    mesh: BatchedMesh,
}

impl MeshBatcher {
    pub fn new(config: BatcherConfig) -> Result<Self, Error> {
        config.validate()?;
        let layout = VertexLayout::new(config.two_color_tint);
        Ok(Self {
            config,
            layout,
            state: BatchState::Idle,
            vertices: Vec::with_capacity(config.max_vertices * layout.stride()),
            indices: Vec::with_capacity(config.max_indices()),
            groups: Vec::new(),
            materials: MaterialTable::default(),
            mesh: BatchedMesh::new(layout),
        })
    }

    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn begin(&mut self) {
        self.reset_cursors();
        self.state = BatchState::Filling;
    }

    /// Resets the batcher and publishes an empty mesh.
    pub fn clear(&mut self) {
        self.reset_cursors();
        self.state = BatchState::Idle;
        if !self.mesh.is_empty() {
            self.mesh.publish(&[], &[], std::iter::empty());
        }
    }

    fn reset_cursors(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.groups.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn can_batch(&self, num_vertices: usize, num_indices: usize) -> bool {
        self.vertex_count()
            .checked_add(num_vertices)
            .is_some_and(|n| n <= self.config.max_vertices)
            && self
                .index_count()
                .checked_add(num_indices)
                .is_some_and(|n| n <= self.config.max_indices())
    }

    /// Appends one attachment's geometry. `indices` are local to `vertices` and get offset by the
    /// current vertex cursor; `z` becomes the third position component of every vertex.
    pub fn batch(&mut self, vertices: &[Vertex], indices: &[u32], z: f32) {
        debug_assert_eq!(self.state, BatchState::Filling, "batch() outside begin()/end()");
        debug_assert!(
            self.can_batch(vertices.len(), indices.len()),
            "batch() over capacity"
        );
        if self.state != BatchState::Filling {
            log::warn!("batch() called in state {:?}", self.state);
        }
        if !self.can_batch(vertices.len(), indices.len()) {
            log::warn!(
                "batch() over capacity: {} + {} vertices, {} + {} indices",
                self.vertex_count(),
                vertices.len(),
                self.index_count(),
                indices.len()
            );
        }

        let base = self.vertex_count() as u32;
        for v in vertices {
            self.layout.write(&mut self.vertices, v, z);
        }
        self.indices.extend(indices.iter().map(|&i| base + i));
    }

    /// Attributes the last `indices_len` appended indices to `material`.
    pub fn add_material_group(&mut self, indices_len: usize, material: MaterialId) {
        debug_assert!(
            indices_len <= self.indices.len(),
            "add_material_group() claims more indices than were batched"
        );
        if indices_len > self.indices.len() {
            log::warn!(
                "add_material_group() claims {} indices, only {} batched",
                indices_len,
                self.indices.len()
            );
        }
        push_group(&mut self.groups, self.indices.len(), indices_len, material);
    }

    pub fn find_material_group(&mut self, key: MaterialKey) -> MaterialId {
        self.materials.find_or_insert(key)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn materials(&self) -> &[Material] {
        self.materials.as_slice()
    }

    /// Finalizes the frame and publishes it to [`Self::mesh`].
    pub fn end(&mut self) {
        debug_assert_eq!(self.state, BatchState::Filling, "end() without begin()");
        if !self.groups_cover_indices() {
            log::warn!(
                "material groups do not cover {} batched indices",
                self.indices.len()
            );
        }

        let materials = &self.materials;
        let groups = self.groups.iter().filter_map(|g| {
            let key = materials.get(g.material)?.key;
            Some(MeshGroup {
                range: g.start as u32..g.end() as u32,
                key,
            })
        });
        self.mesh.publish(&self.vertices, &self.indices, groups);
        self.state = BatchState::Flushed;
    }

    /// `true` when groups are contiguous from zero and end at the index cursor.
    pub fn groups_cover_indices(&self) -> bool {
        let mut expected = 0usize;
        for group in &self.groups {
            if group.start != expected {
                return false;
            }
            expected = group.end();
        }
        expected == self.indices.len()
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn groups(&self) -> &[MaterialGroup] {
        &self.groups
    }

    pub fn mesh(&self) -> &BatchedMesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut BatchedMesh {
        &mut self.mesh
    }
}

use crate::{MaterialKey, VertexLayout};
use std::ops::Range;

/// One draw sub-range of a [`BatchedMesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGroup {
    pub range: Range<u32>,
    pub key: MaterialKey,
}

/// Renderable geometry published by [`crate::MeshBatcher::end`].
///
/// Host renderers read the buffers after checking [`BatchedMesh::needs_upload`] and call
/// [`BatchedMesh::mark_uploaded`] once the GPU copy is current.
#[derive(Clone, Debug, Default)]
pub struct BatchedMesh {
    pub(crate) layout: VertexLayout,
    pub(crate) vertices: Vec<f32>,
    pub(crate) indices: Vec<u32>,
    pub(crate) groups: Vec<MeshGroup>,
    pub(crate) needs_upload: bool,
    pub(crate) visible: bool,
    pub(crate) version: u64,
}

impl BatchedMesh {
    pub(crate) fn new(layout: VertexLayout) -> Self {
        Self {
            layout,
            visible: true,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Interleaved vertex floats, `layout().stride()` per vertex.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn groups(&self) -> &[MeshGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Incremented every time new geometry is published.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn publish(
        &mut self,
        vertices: &[f32],
        indices: &[u32],
        groups: impl IntoIterator<Item = MeshGroup>,
    ) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        self.groups.clear();
        self.groups.extend(groups);
        self.needs_upload = true;
        self.version = self.version.wrapping_add(1);
    }
}

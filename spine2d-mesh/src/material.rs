use crate::MaterialKey;
use std::ops::Range;

/// Index into a batcher's material table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub key: MaterialKey,
}

/// A contiguous slice of the index buffer drawn with one material.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MaterialGroup {
    pub start: usize,
    pub count: usize,
    pub material: MaterialId,
}

impl MaterialGroup {
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Lazily populated list of distinct materials. Skeletons reference a handful of atlas pages,
/// so lookups are a flat scan.
#[derive(Clone, Debug, Default)]
pub(crate) struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    pub(crate) fn find_or_insert(&mut self, key: MaterialKey) -> MaterialId {
        if let Some(index) = self.materials.iter().position(|m| m.key == key) {
            return MaterialId(index);
        }
        self.materials.push(Material { key });
        log::trace!("new material {:?} -> {}", key, self.materials.len() - 1);
        MaterialId(self.materials.len() - 1)
    }

    pub(crate) fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub(crate) fn as_slice(&self) -> &[Material] {
        &self.materials
    }
}

/// Appends `count` indices starting at `index_cursor - count` to the group table, extending the
/// last group when it shares `material`. `count` is clamped to `index_cursor`.
pub(crate) fn push_group(
    groups: &mut Vec<MaterialGroup>,
    index_cursor: usize,
    count: usize,
    material: MaterialId,
) {
    let count = count.min(index_cursor);
    if count == 0 {
        return;
    }
    let start = index_cursor - count;

    if let Some(last) = groups.last_mut() {
        if last.material == material && last.end() == start {
            last.count += count;
            return;
        }
    }

    groups.push(MaterialGroup {
        start,
        count,
        material,
    });
}

use crate::Bounds;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DebugFlags {
    pub bones: bool,
    pub regions: bool,
    pub mesh_hull: bool,
    pub mesh_triangles: bool,
    pub bounding_boxes: bool,
    pub clipping: bool,
    pub paths: bool,
    pub skeleton_bounds: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            bones: true,
            regions: true,
            mesh_hull: true,
            mesh_triangles: true,
            bounding_boxes: true,
            clipping: true,
            paths: true,
            skeleton_bounds: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebugColors {
    pub bone_line: [f32; 4],
    pub bone_origin: [f32; 4],
    pub attachment_line: [f32; 4],
    pub triangle_line: [f32; 4],
    pub path: [f32; 4],
    pub clip: [f32; 4],
    pub aabb: [f32; 4],
}

impl Default for DebugColors {
    fn default() -> Self {
        Self {
            bone_line: [1.0, 0.0, 0.0, 1.0],
            bone_origin: [0.0, 1.0, 0.0, 1.0],
            attachment_line: [0.0, 0.0, 1.0, 0.5],
            triangle_line: [1.0, 0.64, 0.0, 0.5],
            path: [1.0, 0.5, 0.0, 1.0],
            clip: [0.8, 0.0, 0.0, 1.0],
            aabb: [0.0, 1.0, 0.0, 0.5],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolygonKind {
    BoundingBox,
    Clipping,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Line-list geometry: every consecutive vertex pair is one segment.
#[derive(Clone, Debug, Default)]
pub struct DebugGeometry {
    pub vertices: Vec<DebugVertex>,
}

impl DebugGeometry {
    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn line(&mut self, a: [f32; 2], b: [f32; 2], color: [f32; 4]) {
        self.vertices.push(DebugVertex { position: a, color });
        self.vertices.push(DebugVertex { position: b, color });
    }

    fn outline(&mut self, points: &[[f32; 2]], closed: bool, color: [f32; 4]) {
        if points.len() < 2 {
            return;
        }
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color);
        }
        if closed && points.len() > 2 {
            self.line(points[points.len() - 1], points[0], color);
        }
    }
}

/// Builds wireframe overlays for skeleton debugging.
#[derive(Clone, Debug)]
pub struct DebugRenderer {
    pub flags: DebugFlags,
    pub colors: DebugColors,
    /// Half-extent of the cross drawn at each bone origin.
    pub bone_origin_size: f32,
    geometry: DebugGeometry,
}

impl Default for DebugRenderer {
    fn default() -> Self {
        Self {
            flags: DebugFlags::default(),
            colors: DebugColors::default(),
            bone_origin_size: 2.0,
            geometry: DebugGeometry::default(),
        }
    }
}

impl DebugRenderer {
    pub fn new(flags: DebugFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.geometry.vertices.clear();
    }

    pub fn geometry(&self) -> &DebugGeometry {
        &self.geometry
    }

    /// Bone from its world origin to its tip, plus an origin cross.
    pub fn add_bone(&mut self, x: f32, y: f32, tip_x: f32, tip_y: f32) {
        if !self.flags.bones {
            return;
        }
        if x != tip_x || y != tip_y {
            self.geometry.line([x, y], [tip_x, tip_y], self.colors.bone_line);
        }
        let s = self.bone_origin_size;
        let c = self.colors.bone_origin;
        self.geometry.line([x - s, y], [x + s, y], c);
        self.geometry.line([x, y - s], [x, y + s], c);
    }

    pub fn add_region(&mut self, corners: &[[f32; 2]; 4]) {
        if !self.flags.regions {
            return;
        }
        self.geometry
            .outline(corners, true, self.colors.attachment_line);
    }

    /// `hull_len` is the number of leading vertices that form the mesh outline.
    pub fn add_mesh(&mut self, positions: &[[f32; 2]], triangles: &[u32], hull_len: usize) {
        if self.flags.mesh_triangles {
            let color = self.colors.triangle_line;
            for tri in triangles.chunks_exact(3) {
                let (Some(&a), Some(&b), Some(&c)) = (
                    positions.get(tri[0] as usize),
                    positions.get(tri[1] as usize),
                    positions.get(tri[2] as usize),
                ) else {
                    continue;
                };
                self.geometry.outline(&[a, b, c], true, color);
            }
        }
        if self.flags.mesh_hull && hull_len > 0 {
            let hull = &positions[..hull_len.min(positions.len())];
            self.geometry
                .outline(hull, true, self.colors.attachment_line);
        }
    }

    pub fn add_polygon(&mut self, kind: PolygonKind, vertices: &[[f32; 2]]) {
        let (enabled, color) = match kind {
            PolygonKind::BoundingBox => (self.flags.bounding_boxes, self.colors.aabb),
            PolygonKind::Clipping => (self.flags.clipping, self.colors.clip),
        };
        if enabled {
            self.geometry.outline(vertices, true, color);
        }
    }

    pub fn add_path(&mut self, vertices: &[[f32; 2]], closed: bool) {
        if self.flags.paths {
            self.geometry.outline(vertices, closed, self.colors.path);
        }
    }

    pub fn add_bounds(&mut self, bounds: Bounds) {
        if !self.flags.skeleton_bounds {
            return;
        }
        let Bounds {
            x,
            y,
            width,
            height,
        } = bounds;
        self.geometry.outline(
            &[[x, y], [x + width, y], [x + width, y + height], [x, y + height]],
            true,
            self.colors.aabb,
        );
    }
}

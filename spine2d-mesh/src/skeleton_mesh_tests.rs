use crate::{
    AttachmentDraw, BatcherConfig, BlendMode, Bounds, Depth, DrawSource, Error, Positioned,
    SkeletonMesh, SkeletonMeshConfig, Sized2d, TextureId, Tinted, Vertex, VertexLayout,
    Visibility,
};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-6,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn quad() -> Vec<Vertex> {
    [[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
        .into_iter()
        .map(|position| Vertex {
            position,
            uv: position,
            color: [1.0, 1.0, 1.0, 1.0],
            dark_color: [0.5, 0.5, 0.5, 1.0],
        })
        .collect()
}

fn draw<'a>(vertices: &'a [Vertex], texture: u32) -> AttachmentDraw<'a> {
    AttachmentDraw {
        vertices,
        indices: &QUAD_INDICES,
        texture: TextureId(texture),
        blend: BlendMode::Normal,
        premultiplied_alpha: false,
    }
}

fn mesh_with_capacity(max_vertices: usize) -> SkeletonMesh {
    SkeletonMesh::new(SkeletonMeshConfig {
        batcher: BatcherConfig {
            max_vertices,
            two_color_tint: true,
        },
        z_offset: 0.1,
    })
    .unwrap()
}

fn z_of(mesh: &crate::BatchedMesh, vertex: usize) -> f32 {
    mesh.vertices()[vertex * VertexLayout::STRIDE_TWO_COLOR + 2]
}

#[test]
fn update_batches_same_texture_into_one_draw_call() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    skeleton
        .update([draw(&q, 0), draw(&q, 0), draw(&q, 0)])
        .unwrap();

    assert_eq!(skeleton.meshes().count(), 1);
    assert_eq!(skeleton.draw_call_count(), 1);
    let mesh = skeleton.meshes().next().unwrap();
    assert_eq!(mesh.vertex_count(), 12);
    assert_eq!(mesh.indices().len(), 18);
    assert_eq!(mesh.groups()[0].range, 0..18);
}

#[test]
fn update_advances_z_per_attachment() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    skeleton.set_depth(1.0);
    skeleton.update([draw(&q, 0), draw(&q, 1)]).unwrap();

    let mesh = skeleton.meshes().next().unwrap();
    assert_approx(z_of(mesh, 0), 1.0);
    assert_approx(z_of(mesh, 3), 1.0);
    assert_approx(z_of(mesh, 4), 1.1);
    assert_eq!(skeleton.draw_call_count(), 2);
}

#[test]
fn update_spills_into_additional_batchers() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(8);
    skeleton
        .update([draw(&q, 0), draw(&q, 0), draw(&q, 0), draw(&q, 1)])
        .unwrap();

    let meshes: Vec<_> = skeleton.meshes().collect();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].vertex_count(), 8);
    assert_eq!(meshes[0].groups().len(), 1);
    assert_eq!(meshes[1].vertex_count(), 8);
    // Indices restart at zero in the second batcher.
    assert_eq!(&meshes[1].indices()[..6], &QUAD_INDICES);
    assert_eq!(meshes[1].groups().len(), 2);
    assert_eq!(skeleton.draw_call_count(), 3);

    // z keeps increasing across batchers.
    assert_approx(z_of(meshes[1], 0), 0.2);
}

#[test]
fn shrinking_frame_clears_unused_batchers() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(4);
    skeleton.update([draw(&q, 0), draw(&q, 0)]).unwrap();
    assert_eq!(skeleton.meshes().count(), 2);

    skeleton.update([draw(&q, 0)]).unwrap();
    assert_eq!(skeleton.meshes().count(), 1);
    assert_eq!(skeleton.batchers().len(), 2);
    assert!(skeleton.batchers()[1].mesh().is_empty());
    assert!(skeleton.batchers()[1].mesh().needs_upload());
}

#[test]
fn oversized_draw_is_rejected() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(3);
    let err = skeleton.update([draw(&q, 0)]).unwrap_err();
    assert!(matches!(
        err,
        Error::DrawTooLarge {
            vertices: 4,
            indices: 6,
            max_vertices: 3,
            max_indices: 9,
        }
    ));
    // The frame still ends cleanly.
    assert_eq!(skeleton.meshes().count(), 1);
    assert!(skeleton.meshes().next().unwrap().is_empty());
}

#[test]
fn empty_draws_are_skipped() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    let empty = AttachmentDraw {
        vertices: &[],
        indices: &[],
        texture: TextureId(9),
        blend: BlendMode::Additive,
        premultiplied_alpha: false,
    };
    skeleton.update([draw(&q, 0), empty, draw(&q, 0)]).unwrap();
    assert_eq!(skeleton.draw_call_count(), 1);
    // Skipped draws do not consume a z step.
    let mesh = skeleton.meshes().next().unwrap();
    assert_approx(z_of(mesh, 4), 0.1);
}

#[test]
fn position_scale_and_tint_are_applied() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    skeleton.set_position(10.0, 20.0);
    skeleton.set_scale(2.0, -1.0);
    skeleton.set_tint([0.5, 1.0, 1.0, 0.5]);
    skeleton.update([draw(&q, 0)]).unwrap();

    let mesh = skeleton.meshes().next().unwrap();
    let v = &mesh.vertices()[..VertexLayout::STRIDE_TWO_COLOR];
    // First quad vertex is (1, 0).
    assert_approx(v[0], 12.0);
    assert_approx(v[1], 20.0);
    assert_approx(v[VertexLayout::COLOR_OFFSET], 0.5);
    assert_approx(v[VertexLayout::COLOR_OFFSET + 3], 0.5);
    // Non-PMA dark color is left alone.
    assert_approx(v[VertexLayout::DARK_COLOR_OFFSET], 0.5);
}

#[test]
fn pma_tint_scales_rgb_by_alpha() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    skeleton.set_tint([1.0, 1.0, 1.0, 0.5]);
    let mut d = draw(&q, 0);
    d.premultiplied_alpha = true;
    skeleton.update([d]).unwrap();

    let mesh = skeleton.meshes().next().unwrap();
    let v = &mesh.vertices()[..VertexLayout::STRIDE_TWO_COLOR];
    assert_approx(v[VertexLayout::COLOR_OFFSET], 0.5);
    assert_approx(v[VertexLayout::COLOR_OFFSET + 3], 0.5);
    assert_approx(v[VertexLayout::DARK_COLOR_OFFSET], 0.25);
    assert!(mesh.groups()[0].key.premultiplied_alpha);
}

#[test]
fn visibility_propagates_to_meshes() {
    let q = quad();
    let mut skeleton = mesh_with_capacity(100);
    skeleton.update([draw(&q, 0)]).unwrap();
    assert!(skeleton.meshes().all(|m| m.is_visible()));

    skeleton.set_visible(false);
    assert!(!skeleton.is_visible());
    assert!(skeleton.meshes().all(|m| !m.is_visible()));

    skeleton.update([draw(&q, 0)]).unwrap();
    assert!(skeleton.meshes().all(|m| !m.is_visible()));
}

#[test]
fn size_comes_from_bounds_and_scale() {
    let mut skeleton = mesh_with_capacity(100);
    assert_eq!(skeleton.size(), [0.0, 0.0]);
    skeleton.set_bounds(Bounds::new(-5.0, 0.0, 10.0, 20.0));
    skeleton.set_scale(0.5, -2.0);
    assert_eq!(skeleton.size(), [5.0, 40.0]);
}

struct TwoQuads {
    vertices: Vec<Vertex>,
}

impl DrawSource for TwoQuads {
    fn for_each_draw(&self, f: &mut dyn FnMut(AttachmentDraw<'_>)) {
        f(draw(&self.vertices, 0));
        f(draw(&self.vertices, 1));
    }
}

#[test]
fn update_from_draw_source() {
    let source = TwoQuads { vertices: quad() };
    let mut skeleton = mesh_with_capacity(100);
    skeleton.update_from(&source).unwrap();
    assert_eq!(skeleton.draw_call_count(), 2);

    let mesh = skeleton.meshes().next().unwrap();
    assert_eq!(mesh.groups()[0].key.texture, TextureId(0));
    assert_eq!(mesh.groups()[1].key.texture, TextureId(1));
    assert_eq!(mesh.groups()[1].range, 6..12);
}

#[test]
fn invalid_z_offset_is_rejected() {
    let err = SkeletonMesh::new(SkeletonMeshConfig {
        z_offset: f32::NAN,
        ..SkeletonMeshConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
}

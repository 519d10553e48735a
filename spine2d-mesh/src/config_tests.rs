use crate::{DEFAULT_MAX_VERTICES, Error, SkeletonMeshConfig};

#[test]
fn json_config_fills_defaults() {
    let config = SkeletonMeshConfig::from_json_str(r#"{ "zOffset": 0.5 }"#).unwrap();
    assert_eq!(config.z_offset, 0.5);
    assert_eq!(config.batcher.max_vertices, DEFAULT_MAX_VERTICES);
    assert!(config.batcher.two_color_tint);
}

#[test]
fn json_config_reads_batcher_section() {
    let config = SkeletonMeshConfig::from_json_str(
        r#"{ "batcher": { "maxVertices": 256, "twoColorTint": false } }"#,
    )
    .unwrap();
    assert_eq!(config.batcher.max_vertices, 256);
    assert_eq!(config.batcher.max_indices(), 768);
    assert!(!config.batcher.two_color_tint);
}

#[test]
fn json_config_is_validated() {
    let err = SkeletonMeshConfig::from_json_str(r#"{ "batcher": { "maxVertices": 0 } }"#)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));

    let err = SkeletonMeshConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
}

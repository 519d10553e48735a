use crate::{TextureId, TextureRegistry};

#[test]
fn register_is_idempotent() {
    let mut registry = TextureRegistry::new();
    let a = registry.register("page0.png");
    let b = registry.register("page1.png");
    assert_ne!(a, b);
    assert_eq!(registry.register("page0.png"), a);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.id("page1.png"), Some(b));
    assert_eq!(registry.name(a), Some("page0.png"));
}

#[test]
fn unregister_never_reuses_ids() {
    let mut registry = TextureRegistry::new();
    let a = registry.register("page0.png");
    assert_eq!(registry.unregister("page0.png"), Some(a));
    assert_eq!(registry.unregister("page0.png"), None);
    assert!(registry.is_empty());
    assert_eq!(registry.name(a), None);

    let again = registry.register("page0.png");
    assert_ne!(again, a);
    assert_eq!(again, TextureId(1));
}

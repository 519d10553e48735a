use crate::TextureId;
use std::collections::HashMap;

/// Maps atlas page names to numeric texture ids. Ids are never reused, so a stale id can not
/// alias a page registered later.
#[derive(Clone, Debug, Default)]
pub struct TextureRegistry {
    ids: HashMap<String, TextureId>,
    names: HashMap<TextureId, String>,
    next_id: u32,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) -> TextureId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.ids.insert(name.to_string(), id);
        self.names.insert(id, name.to_string());
        log::debug!("registered texture '{name}' as {}", id.0);
        id
    }

    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: TextureId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn unregister(&mut self, name: &str) -> Option<TextureId> {
        let id = self.ids.remove(name)?;
        self.names.remove(&id);
        log::debug!("unregistered texture '{name}'");
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

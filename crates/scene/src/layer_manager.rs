use foundation::ids::{Category, LayerId};
use std::collections::BTreeMap;

use crate::time_aware::TimeAware;

struct Entry {
    id: LayerId,
    layer: Box<dyn TimeAware>,
}

/// Registered layers grouped by category.
///
/// Ordering contract:
/// - Within a category, layers are visited in registration order.
/// - Re-adding an id already present removes the old layer and appends the new one.
#[derive(Default)]
pub struct LayerManager {
    by_category: BTreeMap<Category, Vec<Entry>>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `layer` under `category`, returning the layer it replaced.
    pub fn add_layer(
        &mut self,
        category: impl Into<Category>,
        id: impl Into<LayerId>,
        layer: Box<dyn TimeAware>,
    ) -> Option<Box<dyn TimeAware>> {
        let id = id.into();
        let entries = self.by_category.entry(category.into()).or_default();
        let replaced = entries
            .iter()
            .position(|e| e.id == id)
            .map(|pos| entries.remove(pos).layer);
        entries.push(Entry { id, layer });
        replaced
    }

    pub fn remove_layer(&mut self, category: &str, id: &str) -> Option<Box<dyn TimeAware>> {
        let entries = self.by_category.get_mut(category)?;
        let pos = entries.iter().position(|e| e.id.as_str() == id)?;
        Some(entries.remove(pos).layer)
    }

    /// Removes every listed id, returning how many were present.
    pub fn remove_layers<I, S>(&mut self, category: &str, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter(|id| self.remove_layer(category, id.as_ref()).is_some())
            .count()
    }

    /// Drops every layer of `category`, returning how many were dropped.
    pub fn clear_layers(&mut self, category: &str) -> usize {
        self.by_category
            .get_mut(category)
            .map(|entries| entries.drain(..).count())
            .unwrap_or(0)
    }

    pub fn layer(&self, category: &str, id: &str) -> Option<&dyn TimeAware> {
        self.by_category
            .get(category)?
            .iter()
            .find(|e| e.id.as_str() == id)
            .map(|e| e.layer.as_ref())
    }

    pub fn ids(&self, category: &str) -> Vec<&LayerId> {
        self.by_category
            .get(category)
            .map(|entries| entries.iter().map(|e| &e.id).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, category: &str) -> usize {
        self.by_category.get(category).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.values().all(Vec::is_empty)
    }

    /// Calls `f` on every layer of `category` in registration order.
    ///
    /// Unknown categories visit nothing. Returns the number of layers visited.
    pub fn for_each_in_category_mut<F>(&mut self, category: &str, mut f: F) -> usize
    where
        F: FnMut(&LayerId, &mut dyn TimeAware),
    {
        let Some(entries) = self.by_category.get_mut(category) else {
            return 0;
        };
        for entry in entries.iter_mut() {
            f(&entry.id, entry.layer.as_mut());
        }
        entries.len()
    }
}

impl std::fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (category, entries) in &self.by_category {
            let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
            map.entry(&category.as_str(), &ids);
        }
        map.finish()
    }
}

//! Tab registry: the ordered set of tabs and which one is selected.

use crate::config::CanvasSettings;
use crate::error::{CanvasError, Result};
use crate::id::TabId;
use crate::model::{Color, Tab};
use crate::store::NodeStore;

/// Ordered tabs of a project. Never empty; exactly one tab is selected.
#[derive(Debug, Clone)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    selected: TabId,
}

impl TabRegistry {
    /// A registry holding a single tab, which is selected.
    pub fn new(first: Tab) -> Self {
        let selected = first.id;
        Self {
            tabs: vec![first],
            selected,
        }
    }

    /// Rebuild from loaded tabs. Falls back to the first tab when
    /// `selected` does not name one of them.
    pub fn from_parts(tabs: Vec<Tab>, selected: Option<TabId>) -> Result<Self> {
        let first = tabs
            .first()
            .map(|t| t.id)
            .ok_or_else(|| CanvasError::Validation("project has no tabs".into()))?;
        let selected = match selected {
            Some(id) if tabs.iter().any(|t| t.id == id) => id,
            Some(id) => {
                log::warn!("selected tab [{id}] does not exist, selecting [{first}]");
                first
            }
            None => first,
        };
        Ok(Self { tabs, selected })
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    pub fn get(&self, id: TabId) -> Result<&Tab> {
        self.tabs
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CanvasError::tab_not_found(id))
    }

    pub fn get_mut(&mut self, id: TabId) -> Result<&mut Tab> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CanvasError::tab_not_found(id))
    }

    pub fn selected_id(&self) -> TabId {
        self.selected
    }

    pub fn selected(&self) -> &Tab {
        // `selected` always names a live tab; see `remove`.
        let idx = self.index_of(self.selected).unwrap_or(0);
        &self.tabs[idx]
    }

    pub fn selected_mut(&mut self) -> &mut Tab {
        let idx = self.index_of(self.selected).unwrap_or(0);
        &mut self.tabs[idx]
    }

    pub fn select(&mut self, id: TabId) -> Result<()> {
        self.get(id)?;
        self.selected = id;
        Ok(())
    }

    /// Append a tab with the default viewport and accent colour.
    pub fn add(&mut self, name: impl Into<String>, settings: &CanvasSettings) -> TabId {
        let tab = Tab::new(name, settings.accent(), settings.default_viewport());
        self.push(tab)
    }

    pub fn push(&mut self, tab: Tab) -> TabId {
        let id = tab.id;
        self.tabs.push(tab);
        id
    }

    pub fn rename(&mut self, id: TabId, name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn recolor(&mut self, id: TabId, color: Color) -> Result<()> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    /// Remove a tab and every placement on it, releasing the nodes those
    /// placements referenced. The last remaining tab cannot be removed.
    pub fn remove(&mut self, id: TabId, nodes: &mut NodeStore) -> Result<Tab> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CanvasError::tab_not_found(id))?;
        if self.tabs.len() == 1 {
            return Err(CanvasError::Validation(
                "cannot remove the only tab of a project".into(),
            ));
        }

        let tab = self.tabs.remove(idx);
        for record in &tab.items {
            if let Err(err) = nodes.release(record.node_id, record.id) {
                log::warn!("removing tab [{id}]: {err}");
            }
        }
        if self.selected == id {
            self.selected = self.tabs[idx.min(self.tabs.len() - 1)].id;
        }
        log::debug!("removed tab [{id}] with {} placement(s)", tab.items.len());
        Ok(tab)
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanvasItemRecord, Node};
    use kurbo::Point;

    fn registry() -> TabRegistry {
        let settings = CanvasSettings::default();
        TabRegistry::new(Tab::new(
            "Tab",
            settings.accent(),
            settings.default_viewport(),
        ))
    }

    #[test]
    fn cannot_remove_last_tab() {
        let mut tabs = registry();
        let mut nodes = NodeStore::new();
        let only = tabs.selected_id();
        assert!(matches!(
            tabs.remove(only, &mut nodes),
            Err(CanvasError::Validation(_))
        ));
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn removing_tab_cascades_to_nodes() {
        let settings = CanvasSettings::default();
        let mut tabs = registry();
        let mut nodes = NodeStore::new();

        let shared = Node::image("/tmp/shared.png");
        let only_here = Node::text("only here", "Text_Node");
        let (shared_id, only_id) = (shared.id, only_here.id);
        nodes.put(shared);
        nodes.put(only_here);

        // Keep one placement of `shared` on the first tab.
        let keep = CanvasItemRecord::new(shared_id, Point::ZERO, 1.0);
        nodes.add_reference(shared_id, keep.id).unwrap();
        tabs.selected_mut().items.push(keep);

        let doomed = tabs.add("Second", &settings);
        for node in [shared_id, only_id] {
            let record = CanvasItemRecord::new(node, Point::ZERO, 1.0);
            nodes.add_reference(node, record.id).unwrap();
            tabs.get_mut(doomed).unwrap().items.push(record);
        }

        tabs.select(doomed).unwrap();
        let removed = tabs.remove(doomed, &mut nodes).unwrap();
        assert_eq!(removed.items.len(), 2);
        assert_eq!(nodes.reference_count(shared_id).unwrap(), 1);
        assert!(!nodes.contains(only_id));
        assert_ne!(tabs.selected_id(), doomed);
    }

    #[test]
    fn unknown_selection_falls_back_to_first() {
        let settings = CanvasSettings::default();
        let a = Tab::new("A", settings.accent(), settings.default_viewport());
        let a_id = a.id;
        let tabs = TabRegistry::from_parts(vec![a], Some(TabId::intern("gone"))).unwrap();
        assert_eq!(tabs.selected_id(), a_id);

        assert!(TabRegistry::from_parts(Vec::new(), None).is_err());
    }

    #[test]
    fn rename_and_recolor() {
        let mut tabs = registry();
        let id = tabs.selected_id();
        tabs.rename(id, "Moodboard").unwrap();
        tabs.recolor(id, Color::rgba(1.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(tabs.selected().name, "Moodboard");
        assert_eq!(tabs.selected().color.to_hex(), "#FF0000");
        assert!(tabs.rename(TabId::intern("missing"), "x").is_err());
    }
}

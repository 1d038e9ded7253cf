//! Node store: canonical content records, reference-counted by placements.

use crate::error::{CanvasError, Result};
use crate::id::{CanvasItemId, NodeId};
use crate::model::Node;
use std::collections::HashMap;

/// All nodes of a project, keyed by ID.
///
/// A node's `references` set is the reference count. The store never drops a
/// node on its own: callers remove the last reference, see `0` come back, and
/// then call [`NodeStore::remove`].
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: HashMap<NodeId, Node>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node. Never returns a default for a missing ID.
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| CanvasError::node_not_found(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| CanvasError::node_not_found(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Insert or overwrite. Returns the previous record, if any.
    pub fn put(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id, node)
    }

    /// Record that `item` places `node`. Idempotent. Returns the new count.
    pub fn add_reference(&mut self, node: NodeId, item: CanvasItemId) -> Result<usize> {
        let node = self.get_mut(node)?;
        if !node.references.contains(&item) {
            node.references.push(item);
        }
        Ok(node.references.len())
    }

    /// Drop `item` from `node`'s references. Idempotent. Returns the
    /// remaining count; the caller deletes the node when it reaches `0`.
    pub fn remove_reference(&mut self, node: NodeId, item: CanvasItemId) -> Result<usize> {
        let node = self.get_mut(node)?;
        node.references.retain(|r| *r != item);
        Ok(node.references.len())
    }

    pub fn reference_count(&self, id: NodeId) -> Result<usize> {
        Ok(self.get(id)?.references.len())
    }

    /// Hard delete. Only valid once nothing references the node.
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        let references = self.reference_count(id)?;
        if references > 0 {
            return Err(CanvasError::InUse { node: id, references });
        }
        self.nodes
            .remove(&id)
            .ok_or_else(|| CanvasError::node_not_found(id))
    }

    /// Remove the reference and collect the node if it was the last one.
    /// Returns true when the node was deleted.
    pub fn release(&mut self, node: NodeId, item: CanvasItemId) -> Result<bool> {
        if self.remove_reference(node, item)? == 0 {
            self.remove(node)?;
            log::debug!("collected unreferenced node {node}");
            return Ok(true);
        }
        Ok(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Keep only the nodes for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        self.nodes.retain(|_, node| keep(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_text() -> (NodeStore, NodeId) {
        let mut store = NodeStore::new();
        let node = Node::text("hello", "Text_Node");
        let id = node.id;
        store.put(node);
        (store, id)
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = NodeStore::new();
        assert!(matches!(
            store.get(NodeId::intern("nope")),
            Err(CanvasError::NotFound { what: "node", .. })
        ));
    }

    #[test]
    fn references_are_idempotent() {
        let (mut store, id) = store_with_text();
        let item = CanvasItemId::generate();

        assert_eq!(store.add_reference(id, item).unwrap(), 1);
        assert_eq!(store.add_reference(id, item).unwrap(), 1);
        assert_eq!(store.remove_reference(id, item).unwrap(), 0);
        assert_eq!(store.remove_reference(id, item).unwrap(), 0);
    }

    #[test]
    fn remove_referenced_node_is_in_use() {
        let (mut store, id) = store_with_text();
        store.add_reference(id, CanvasItemId::generate()).unwrap();

        assert!(matches!(
            store.remove(id),
            Err(CanvasError::InUse { references: 1, .. })
        ));
        assert!(store.contains(id));
    }

    #[test]
    fn release_collects_last_reference() {
        let (mut store, id) = store_with_text();
        let a = CanvasItemId::generate();
        let b = CanvasItemId::generate();
        store.add_reference(id, a).unwrap();
        store.add_reference(id, b).unwrap();

        assert!(!store.release(id, a).unwrap());
        assert!(store.contains(id));
        assert!(store.release(id, b).unwrap());
        assert!(!store.contains(id));
    }

    #[test]
    fn put_overwrites_text() {
        let (mut store, id) = store_with_text();
        let mut edited = store.get(id).unwrap().clone();
        edited.content = crate::model::NodeContent::Text {
            text: "edited".into(),
        };
        assert!(store.put(edited).is_some());
        assert_eq!(store.get(id).unwrap().text_content(), Some("edited"));
    }
}

//! A whole mood-board project: nodes, tabs, and the scene extent.

use crate::config::CanvasSettings;
use crate::id::{CanvasItemId, NodeId};
use crate::model::Tab;
use crate::store::NodeStore;
use crate::tabs::TabRegistry;
use kurbo::{Point, Rect, Size};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    /// Fixed scene extent; the scene rect starts at the origin.
    pub canvas_size: Size,
    pub nodes: NodeStore,
    pub tabs: TabRegistry,
}

/// What [`Project::reconcile`] had to repair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Placements whose node does not exist.
    pub dropped_items: Vec<CanvasItemId>,
    /// Nodes that no placement refers to.
    pub dropped_nodes: Vec<NodeId>,
    /// Nodes whose reference set disagreed with the placements.
    pub fixed_references: Vec<NodeId>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.dropped_items.is_empty()
            && self.dropped_nodes.is_empty()
            && self.fixed_references.is_empty()
    }
}

impl Project {
    /// Empty project with one default tab.
    pub fn new(name: impl Into<String>, settings: &CanvasSettings) -> Self {
        let tab = Tab::new("Tab", settings.accent(), settings.default_viewport());
        Self {
            name: name.into(),
            canvas_size: Size::new(settings.canvas_size[0], settings.canvas_size[1]),
            nodes: NodeStore::new(),
            tabs: TabRegistry::new(tab),
        }
    }

    pub fn scene_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.canvas_size)
    }

    /// Total placements across all tabs.
    pub fn item_count(&self) -> usize {
        self.tabs.iter().map(|t| t.items.len()).sum()
    }

    /// Make node reference sets agree with the placements on the tabs.
    ///
    /// Placements of missing nodes are dropped, every node's reference set is
    /// rebuilt from the placements that name it, and nodes left without a
    /// placement are collected.
    pub fn reconcile(&mut self) -> Reconciliation {
        let mut report = Reconciliation::default();
        let mut placed: HashMap<NodeId, Vec<CanvasItemId>> = HashMap::new();

        for tab in self.tabs.iter_mut() {
            let nodes = &self.nodes;
            tab.items.retain(|record| {
                if nodes.contains(record.node_id) {
                    placed.entry(record.node_id).or_default().push(record.id);
                    true
                } else {
                    log::warn!(
                        "dropping canvas item [{}]: node [{}] not found",
                        record.id,
                        record.node_id
                    );
                    report.dropped_items.push(record.id);
                    false
                }
            });
        }

        for node in self.nodes.iter_mut() {
            let actual = placed.get(&node.id).map(Vec::as_slice).unwrap_or_default();
            let recorded: HashSet<_> = node.references.iter().copied().collect();
            let expected: HashSet<_> = actual.iter().copied().collect();
            if recorded != expected || node.references.len() != actual.len() {
                log::warn!(
                    "node [{}] listed {} reference(s), found {} placement(s)",
                    node.id,
                    node.references.len(),
                    actual.len()
                );
                node.references = actual.iter().copied().collect();
                report.fixed_references.push(node.id);
            }
        }

        let mut dropped = Vec::new();
        self.nodes.retain(|node| {
            if node.references.is_empty() {
                dropped.push(node.id);
                false
            } else {
                true
            }
        });
        for id in &dropped {
            log::warn!("dropping node [{id}]: no canvas item places it");
        }
        // Orphans were counted as fixed above only if they listed stale refs.
        report
            .fixed_references
            .retain(|id| !dropped.contains(id));
        report.dropped_nodes = dropped;
        report
    }
}

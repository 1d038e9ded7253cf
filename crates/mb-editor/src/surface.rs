//! Canvas surface: the live view of the active tab.
//!
//! The surface owns the project, an arena of live [`CanvasItem`]s keyed by
//! ID, the z-order list, the selection group and its overlay, the viewport,
//! and the copy buffer. It is the only code that mutates item geometry or
//! the selection, and it writes every change straight back into the active
//! tab's records so the project can be saved at any time.
//!
//! Hosts drive it with [`CanvasSurface::handle_event`] and react to the
//! returned [`CanvasEffect`]s.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kurbo::{Point, Rect, Size, Vec2};
use mb_core::config::CanvasSettings;
use mb_core::error::{CanvasError, Result};
use mb_core::geometry::{Corner, normalized_rect};
use mb_core::id::{CanvasItemId, NodeId, TabId};
use mb_core::item::CanvasItem;
use mb_core::measure::{ContentSizer, FsContentSizer};
use mb_core::model::{CanvasItemRecord, Color, Node, NodeContent, NodeKind};
use mb_core::persist;
use mb_core::project::Project;
use mb_render::overlay::SelectionOverlay;
use vello::Scene;

use crate::clipboard::{ClipEntry, Clipboard};
use crate::input::{DropPayload, InputEvent, Modifiers, PointerButton};
use crate::selection::{MemberPose, SelectionGroup};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::Viewport;

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEffect {
    /// The active tab became empty (`true`) or non-empty (`false`).
    EmptyChanged(bool),
    ZoomChanged(f64),
    /// Right click; `at` is in scene coordinates.
    ContextMenu { at: Point },
    /// Double click on the sole selected image or file item.
    OpenPath(PathBuf),
}

/// What the current primary / middle press is doing.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    /// Dragging the selection. `press` is the scene point of the press.
    Drag { press: Point },
    Scale { corner: Corner, press: Point },
    RubberBand {
        anchor: Point,
        current: Point,
        last_hits: Vec<CanvasItemId>,
    },
    /// Middle-button pan; `last` is in view pixels.
    Pan { last: Point },
}

impl Gesture {
    /// The button whose release ends this gesture.
    fn button(&self) -> Option<PointerButton> {
        match self {
            Gesture::Idle => None,
            Gesture::Pan { .. } => Some(PointerButton::Middle),
            Gesture::Drag { .. } | Gesture::Scale { .. } | Gesture::RubberBand { .. } => {
                Some(PointerButton::Primary)
            }
        }
    }
}

pub struct CanvasSurface {
    project: Project,
    settings: CanvasSettings,
    sizer: Box<dyn ContentSizer>,

    items: HashMap<CanvasItemId, CanvasItem>,
    /// Back to front. Mirrors the record order of the active tab.
    z_order: Vec<CanvasItemId>,

    selection: SelectionGroup,
    overlay: SelectionOverlay,
    viewport: Viewport,
    clipboard: Clipboard,

    gesture: Gesture,
    /// Text item in edit mode, if any.
    editing: Option<CanvasItemId>,
    /// Last known pointer position in view pixels; `None` once it leaves.
    pointer: Option<Point>,

    effects: Vec<CanvasEffect>,
    last_empty: Option<bool>,
}

impl CanvasSurface {
    /// A surface that measures images from disk.
    pub fn new(project: Project, settings: CanvasSettings) -> Self {
        let sizer = Box::new(FsContentSizer::new(&settings));
        Self::with_sizer(project, settings, sizer)
    }

    pub fn with_sizer(
        project: Project,
        settings: CanvasSettings,
        sizer: Box<dyn ContentSizer>,
    ) -> Self {
        let viewport = Viewport::new(&settings, project.canvas_size);
        let mut surface = Self {
            selection: SelectionGroup::new(settings.min_group_scale),
            overlay: SelectionOverlay::new(&settings),
            viewport,
            project,
            settings,
            sizer,
            items: HashMap::new(),
            z_order: Vec::new(),
            clipboard: Clipboard::new(),
            gesture: Gesture::Idle,
            editing: None,
            pointer: None,
            effects: Vec::new(),
            last_empty: None,
        };
        surface.load_active_tab();
        surface
    }

    /// Open a project file, starting a fresh project if it cannot be read.
    pub fn open(path: &Path, settings: CanvasSettings) -> Self {
        let project = persist::load_or_default(path, &settings);
        Self::new(project, settings)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Hand the project back, with the current viewport stored on its tab.
    pub fn into_project(mut self) -> Project {
        self.store_viewport();
        self.project
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    pub fn selection(&self) -> &SelectionGroup {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn active_tab(&self) -> TabId {
        self.project.tabs.selected_id()
    }

    pub fn item(&self, id: CanvasItemId) -> Option<&CanvasItem> {
        self.items.get(&id)
    }

    pub fn z_order(&self) -> &[CanvasItemId] {
        &self.z_order
    }

    /// Live items, back to front.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &CanvasItem> {
        self.z_order.iter().filter_map(|id| self.items.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn editing(&self) -> Option<CanvasItemId> {
        self.editing
    }

    /// Current rubber-band rectangle in scene space.
    pub fn rubber_band(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::RubberBand { anchor, current, .. } => Some(normalized_rect(*anchor, *current)),
            _ => None,
        }
    }

    /// Drain the effects queued by direct calls (event handling drains
    /// them itself).
    pub fn take_effects(&mut self) -> Vec<CanvasEffect> {
        std::mem::take(&mut self.effects)
    }

    // ─── Tabs ────────────────────────────────────────────────────────────

    /// Switch to another tab. The outgoing tab keeps its viewport.
    pub fn activate_tab(&mut self, id: TabId) -> Result<()> {
        self.project.tabs.get(id)?;
        self.store_viewport();
        self.project.tabs.select(id)?;
        self.load_active_tab();
        Ok(())
    }

    pub fn add_tab(&mut self, name: impl Into<String>) -> TabId {
        self.project.tabs.add(name, &self.settings)
    }

    pub fn rename_tab(&mut self, id: TabId, name: impl Into<String>) -> Result<()> {
        self.project.tabs.rename(id, name)
    }

    pub fn recolor_tab(&mut self, id: TabId, color: Color) -> Result<()> {
        self.project.tabs.recolor(id, color)
    }

    /// Remove a tab and all its placements. Removing the active tab
    /// activates its neighbour.
    pub fn remove_tab(&mut self, id: TabId) -> Result<()> {
        let was_active = id == self.active_tab();
        if was_active {
            // Its live items are about to lose their records.
            self.clear_selection();
        }
        self.project.tabs.remove(id, &mut self.project.nodes)?;
        if was_active {
            self.load_active_tab();
        }
        Ok(())
    }

    /// Rebuild the live items from the selected tab's records.
    fn load_active_tab(&mut self) {
        self.selection.clear();
        self.items.clear();
        self.z_order.clear();
        self.gesture = Gesture::Idle;
        self.editing = None;

        let tab = self.project.tabs.selected();
        let mut loaded = Vec::with_capacity(tab.items.len());
        for record in &tab.items {
            let node = match self.project.nodes.get(record.node_id) {
                Ok(node) => node,
                Err(err) => {
                    log::warn!("skipping canvas item [{}]: {err}", record.id);
                    continue;
                }
            };
            match CanvasItem::from_record(record, node, self.sizer.as_ref()) {
                Ok(item) => loaded.push(item),
                Err(err) => log::warn!("skipping canvas item [{}]: {err}", record.id),
            }
        }
        let saved_viewport = tab.viewport;
        log::debug!(
            "activated tab [{}]: {} of {} item(s) live",
            tab.id,
            loaded.len(),
            tab.items.len()
        );

        for item in loaded {
            self.z_order.push(item.id);
            self.items.insert(item.id, item);
        }
        self.reassign_z();

        self.viewport.restore(saved_viewport);
        self.on_zoom_changed();
        self.refresh_overlay();
        self.emit_empty_state();
    }

    // ─── Item lifecycle ──────────────────────────────────────────────────

    /// Place an existing node on the active tab.
    pub fn insert_item(&mut self, record: CanvasItemRecord) -> Result<CanvasItemId> {
        record.validate()?;
        if self.items.contains_key(&record.id)
            || self.project.tabs.selected().record(record.id).is_some()
        {
            return Err(CanvasError::Validation(format!(
                "canvas item [{}] is already placed",
                record.id
            )));
        }
        let node = self.project.nodes.get(record.node_id)?;
        let item = CanvasItem::from_record(&record, node, self.sizer.as_ref())?;
        let id = item.id;

        self.project.nodes.add_reference(record.node_id, id)?;
        self.project.tabs.selected_mut().items.push(record);
        self.items.insert(id, item);
        self.z_order.push(id);
        self.reassign_z();
        self.emit_empty_state();
        log::debug!("inserted canvas item [{id}]");
        Ok(id)
    }

    /// Remove a placement. Its node is collected if nothing else places it.
    pub fn remove_item(&mut self, id: CanvasItemId) -> Result<()> {
        let item = self
            .items
            .remove(&id)
            .ok_or_else(|| CanvasError::item_not_found(id))?;
        self.z_order.retain(|z| *z != id);
        if self.selection.remove(id).is_some() && self.selection.is_empty() {
            self.selection.reset_transform();
        }
        if self.editing == Some(id) {
            self.editing = None;
        }

        self.project.tabs.selected_mut().remove_record(id);
        if let Err(err) = self.project.nodes.release(item.node_id, id) {
            log::warn!("removing canvas item [{id}]: {err}");
        }
        self.reassign_z();
        self.refresh_overlay();
        self.emit_empty_state();
        log::debug!("removed canvas item [{id}]");
        Ok(())
    }

    /// Place `node_id` again. Text nodes are never shared: a text duplicate
    /// gets its own copy of the node.
    pub fn duplicate_item(&mut self, node_id: NodeId, pos: Point, scale: f64) -> Result<CanvasItemId> {
        let node = self.project.nodes.get(node_id)?;
        let copy = node.text_content().map(|text| Node::text(text, node.name.clone()));
        match copy {
            Some(copy) => self.insert_new_node(copy, pos, scale),
            None => self.insert_node_placement(node_id, pos, scale),
        }
    }

    pub fn new_image_item(&mut self, path: impl Into<PathBuf>, pos: Point) -> Result<CanvasItemId> {
        let node = Node::image(path);
        let size = self.sizer.measure(&node.content)?;
        let longest = size.width.max(size.height);
        let scale = if longest > self.settings.default_image_size {
            self.settings.default_image_size / longest
        } else {
            1.0
        };
        self.insert_new_node(node, pos, scale)
    }

    pub fn new_text_item(
        &mut self,
        text: impl Into<String>,
        pos: Point,
        scale: f64,
        name: impl Into<String>,
    ) -> Result<CanvasItemId> {
        self.insert_new_node(Node::text(text, name), pos, scale)
    }

    pub fn new_file_item(&mut self, path: impl Into<PathBuf>, pos: Point) -> Result<CanvasItemId> {
        self.insert_new_node(Node::file(path), pos, 1.0)
    }

    fn insert_new_node(&mut self, node: Node, pos: Point, scale: f64) -> Result<CanvasItemId> {
        let node_id = node.id;
        self.project.nodes.put(node);
        let result = self.insert_node_placement(node_id, pos, scale);
        if result.is_err() {
            // Nothing places it yet.
            let _ = self.project.nodes.remove(node_id);
        }
        result
    }

    fn insert_node_placement(&mut self, node_id: NodeId, pos: Point, scale: f64) -> Result<CanvasItemId> {
        self.insert_item(CanvasItemRecord::new(node_id, pos, scale))
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Move an item to the front. Returns false if it already was.
    pub fn bring_to_front(&mut self, id: CanvasItemId) -> bool {
        let Some(pos) = self.z_order.iter().position(|z| *z == id) else {
            return false;
        };
        if pos + 1 == self.z_order.len() {
            return false;
        }
        self.z_order.remove(pos);
        self.z_order.push(id);
        self.project.tabs.selected_mut().move_to_end(id);
        self.reassign_z();
        log::trace!("brought [{id}] to front");
        true
    }

    fn reassign_z(&mut self) {
        for (z, id) in self.z_order.iter().enumerate() {
            if let Some(item) = self.items.get_mut(id) {
                item.z = z;
            }
        }
    }

    // ─── Hit testing ─────────────────────────────────────────────────────

    pub fn item_at_scene_point(&self, pt: Point) -> Option<CanvasItemId> {
        mb_render::hit_test(self.items(), pt)
    }

    pub fn items_in_rect(&self, rect: Rect) -> Vec<CanvasItemId> {
        mb_render::hit_test_rect(self.items(), rect)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected_ids(&self) -> Vec<CanvasItemId> {
        self.selection.ids()
    }

    /// Replace the selection.
    pub fn set_selection(&mut self, ids: &[CanvasItemId]) {
        self.clear_selection();
        for id in ids {
            self.add_selected(*id);
        }
    }

    /// Add one item. The first item of an empty selection comes to the front.
    pub fn add_selected(&mut self, id: CanvasItemId) -> bool {
        if !self.items.contains_key(&id) {
            log::debug!("cannot select missing canvas item [{id}]");
            return false;
        }
        if self.selection.is_empty() {
            self.bring_to_front(id);
        }
        let added = match self.items.get(&id) {
            Some(item) => self.selection.add(item),
            None => false,
        };
        self.refresh_overlay();
        added
    }

    pub fn remove_selected(&mut self, id: CanvasItemId) -> bool {
        let removed = self.selection.remove(id).is_some();
        if removed && self.selection.is_empty() {
            self.selection.reset_transform();
        }
        self.refresh_overlay();
        removed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.refresh_overlay();
    }

    pub fn select_all(&mut self) {
        let all = self.z_order.clone();
        self.set_selection(&all);
    }

    fn refresh_overlay(&mut self) {
        self.overlay
            .update_bounds(self.selection.scene_bounds(), self.viewport.zoom());
    }

    /// Mirror group poses onto the live items.
    fn apply_poses(&mut self, poses: &[MemberPose]) {
        for pose in poses {
            if let Some(item) = self.items.get_mut(&pose.id) {
                item.pos = pose.pos;
                item.scale = pose.scale;
            }
        }
    }

    /// Persist group poses into the tab records.
    fn commit_poses(&mut self, poses: &[MemberPose]) {
        self.apply_poses(poses);
        let tab = self.project.tabs.selected_mut();
        for pose in poses {
            if let Some(record) = tab.record_mut(pose.id) {
                record.pos = pose.pos;
                record.scale = pose.scale;
            }
        }
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    fn begin_drag(&mut self, press: Point) {
        self.selection.capture_initial_pose();
        self.gesture = Gesture::Drag { press };
    }

    fn begin_scale(&mut self, corner: Corner, press: Point) {
        self.selection.capture_initial_pose();
        self.gesture = Gesture::Scale { corner, press };
    }

    fn finish_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drag { .. } | Gesture::Scale { .. } => {
                let poses = self.selection.commit();
                self.commit_poses(&poses);
                self.refresh_overlay();
            }
            Gesture::Pan { .. } => self.store_viewport(),
            Gesture::RubberBand { .. } | Gesture::Idle => {}
        }
    }

    /// The pointer left mid-gesture: put the selection back where it was.
    fn abandon_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drag { .. } | Gesture::Scale { .. } => {
                let poses = self.selection.abandon();
                self.apply_poses(&poses);
                self.refresh_overlay();
                log::debug!("gesture abandoned, {} item(s) restored", poses.len());
            }
            Gesture::Pan { .. } => self.store_viewport(),
            Gesture::RubberBand { .. } | Gesture::Idle => {}
        }
    }

    fn update_rubber_band(&mut self, scene: Point) {
        let Gesture::RubberBand {
            anchor, last_hits, ..
        } = &self.gesture
        else {
            return;
        };
        let hits = self.items_in_rect(normalized_rect(*anchor, scene));
        // Compare as sets: selecting brings the first hit to the front,
        // which reorders the next hit list.
        let changed = hits.len() != last_hits.len() || hits.iter().any(|h| !last_hits.contains(h));
        if changed {
            self.set_selection(&hits);
        }
        if let Gesture::RubberBand {
            current, last_hits, ..
        } = &mut self.gesture
        {
            *current = scene;
            if changed {
                *last_hits = hits;
            }
        }
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection. Offsets are taken from the group's top-left.
    /// Returns the number of copied items.
    pub fn copy_selection(&mut self) -> usize {
        let Some(bounds) = self.selection.scene_bounds() else {
            log::debug!("copy ignored: nothing selected");
            return 0;
        };
        let origin = Point::new(bounds.x0, bounds.y0);
        let entries: Vec<ClipEntry> = self
            .selection
            .ids()
            .into_iter()
            .filter_map(|id| {
                let item = self.items.get(&id)?;
                let node = self.project.nodes.get(item.node_id).ok()?;
                Some(ClipEntry {
                    node: node.clone(),
                    offset: item.pos - origin,
                    scale: item.scale,
                })
            })
            .collect();
        let count = entries.len();
        self.clipboard.set(origin, entries);
        count
    }

    /// Paste the copy buffer with its top-left at `point`. Pasted items
    /// become the selection.
    pub fn paste_at(&mut self, point: Point) -> Vec<CanvasItemId> {
        let entries = self.clipboard.entries().to_vec();
        let mut pasted = Vec::with_capacity(entries.len());
        for entry in entries {
            let pos = point + entry.offset;
            let result = if entry.is_text() {
                let text = entry.node.text_content().unwrap_or_default().to_string();
                self.new_text_item(text, pos, entry.scale, entry.node.name.clone())
            } else if self.project.nodes.contains(entry.node.id) {
                self.insert_node_placement(entry.node.id, pos, entry.scale)
            } else {
                // Cut collected the node; bring the snapshot back.
                let mut node = entry.node.clone();
                node.references.clear();
                self.insert_new_node(node, pos, entry.scale)
            };
            match result {
                Ok(id) => pasted.push(id),
                Err(err) => log::error!("could not paste {}: {err}", entry.node.id),
            }
        }
        self.set_selection(&pasted);
        pasted
    }

    /// Paste under the pointer when it is over the visible canvas, else
    /// where the copy was taken from.
    pub fn paste_at_cursor(&mut self) -> Vec<CanvasItemId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let visible = self.viewport.visible_scene_rect();
        let target = self
            .pointer
            .map(|p| self.viewport.screen_to_scene(p))
            .filter(|p| visible.contains(*p))
            .unwrap_or_else(|| self.clipboard.origin());
        self.paste_at(target)
    }

    pub fn cut_selection(&mut self) -> usize {
        let count = self.copy_selection();
        for id in self.selection.ids() {
            if let Err(err) = self.remove_item(id) {
                log::warn!("cut: {err}");
            }
        }
        count
    }

    /// Delete every selected item, unless a text item is being edited.
    pub fn delete_selected(&mut self) -> usize {
        if self.editing.is_some() {
            return 0;
        }
        let ids = self.selection.ids();
        for id in &ids {
            if let Err(err) = self.remove_item(*id) {
                log::warn!("delete: {err}");
            }
        }
        ids.len()
    }

    /// Duplicate every selected item, offset by the drop stagger, and select
    /// the copies.
    pub fn duplicate_selection(&mut self) -> Vec<CanvasItemId> {
        let offset = Vec2::new(self.settings.drop_stagger, self.settings.drop_stagger);
        let sources: Vec<(NodeId, Point, f64)> = self
            .selection
            .ids()
            .into_iter()
            .filter_map(|id| self.items.get(&id))
            .map(|item| (item.node_id, item.pos + offset, item.scale))
            .collect();

        let mut copies = Vec::with_capacity(sources.len());
        for (node_id, pos, scale) in sources {
            match self.duplicate_item(node_id, pos, scale) {
                Ok(id) => copies.push(id),
                Err(err) => log::error!("could not duplicate {node_id}: {err}"),
            }
        }
        if !copies.is_empty() {
            self.set_selection(&copies);
        }
        copies
    }

    // ─── Text ────────────────────────────────────────────────────────────

    pub fn begin_text_edit(&mut self, id: CanvasItemId) -> bool {
        self.end_text_edit();
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if item.set_editing(true) {
            self.editing = Some(id);
            true
        } else {
            false
        }
    }

    pub fn end_text_edit(&mut self) {
        if let Some(id) = self.editing.take() {
            if let Some(item) = self.items.get_mut(&id) {
                item.set_editing(false);
            }
        }
    }

    /// Replace the text of the node shown by `id`. Every placement of that
    /// node on this tab is re-measured.
    pub fn set_text(&mut self, id: CanvasItemId, text: impl Into<String>) -> Result<()> {
        let node_id = self
            .items
            .get(&id)
            .ok_or_else(|| CanvasError::item_not_found(id))?
            .node_id;
        let mut node = self.project.nodes.get(node_id)?.clone();
        if node.kind() != NodeKind::Text {
            return Err(CanvasError::InvalidType(node.kind().to_string()));
        }
        node.content = NodeContent::Text { text: text.into() };
        let size = self.sizer.measure(&node.content)?;
        self.project.nodes.put(node);

        for item in self.items.values_mut().filter(|i| i.node_id == node_id) {
            item.resize(size);
            self.selection.update_size(item.id, size);
        }
        self.refresh_overlay();
        Ok(())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn visible_scene_rect(&self) -> Rect {
        self.viewport.visible_scene_rect()
    }

    pub fn resize_view(&mut self, size: Size) {
        self.viewport.set_view_size(size);
        self.store_viewport();
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        self.viewport.pan(screen_delta);
        self.store_viewport();
    }

    /// Zoom anchored at `anchor` (view pixels). Rejected when out of range.
    pub fn set_zoom(&mut self, zoom: f64, anchor: Point) -> bool {
        let changed = self.viewport.set_zoom(zoom, anchor);
        if changed {
            self.on_zoom_changed();
        }
        changed
    }

    /// Absolute zoom, clamped into range.
    pub fn set_zoom_scale(&mut self, zoom: f64) -> f64 {
        let applied = self.viewport.set_zoom_scale(zoom);
        self.on_zoom_changed();
        applied
    }

    pub fn zoom_step(&mut self, zoom_in: bool, anchor: Point) -> bool {
        let changed = self.viewport.zoom_step(zoom_in, anchor);
        if changed {
            self.on_zoom_changed();
        }
        changed
    }

    fn store_viewport(&mut self) {
        self.project.tabs.selected_mut().viewport = self.viewport.state();
    }

    fn on_zoom_changed(&mut self) {
        self.store_viewport();
        self.overlay.set_zoom(self.viewport.zoom());
        self.effects.push(CanvasEffect::ZoomChanged(self.viewport.zoom()));
    }

    fn view_centre(&self) -> Point {
        let size = self.viewport.view_size();
        Point::new(size.width / 2.0, size.height / 2.0)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.store_viewport();
        persist::save(&self.project, path)
    }

    // ─── Painting ────────────────────────────────────────────────────────

    pub fn paint(&self, scene: &mut Scene) {
        let accent = self.project.tabs.selected().color;
        let viewport = self.viewport.state();
        mb_render::paint_canvas(
            scene,
            self.items(),
            &self.overlay,
            self.rubber_band(),
            accent,
            &viewport,
        );
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route one input event. Returns the effects it produced.
    pub fn handle_event(&mut self, event: &InputEvent) -> Vec<CanvasEffect> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.on_pointer_down(Point::new(*x, *y), *button, *modifiers),
            InputEvent::PointerMove { x, y, .. } => self.on_pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, button } => {
                self.pointer = Some(Point::new(*x, *y));
                if self.gesture.button() == Some(*button) {
                    self.finish_gesture();
                }
            }
            InputEvent::PointerLeave => {
                self.pointer = None;
                self.abandon_gesture();
            }
            InputEvent::DoubleClick { x, y } => {
                let scene = self.viewport.screen_to_scene(Point::new(*x, *y));
                self.on_double_click(scene);
            }
            InputEvent::Wheel { x, y, delta_y } => {
                let anchor = Point::new(*x, *y);
                self.pointer = Some(anchor);
                self.zoom_step(*delta_y >= 0.0, anchor);
            }
            InputEvent::Key { key, modifiers } => self.on_key(key, *modifiers),
            InputEvent::Drop { x, y, payload } => {
                let scene = self.viewport.screen_to_scene(Point::new(*x, *y));
                self.on_drop(scene, payload);
            }
            InputEvent::Resize { width, height } => {
                self.resize_view(Size::new(*width, *height));
            }
        }
        self.take_effects()
    }

    fn on_pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) {
        self.pointer = Some(screen);
        let scene = self.viewport.screen_to_scene(screen);

        match button {
            PointerButton::Middle => {
                self.finish_gesture();
                self.gesture = Gesture::Pan { last: screen };
                return;
            }
            PointerButton::Secondary => {
                self.effects.push(CanvasEffect::ContextMenu { at: scene });
                return;
            }
            PointerButton::Primary => self.finish_gesture(),
        }

        if let Some(corner) = self.overlay.hit_test(scene, modifiers.shift) {
            self.end_text_edit();
            self.begin_scale(corner, scene);
            return;
        }

        let Some(hit) = self.item_at_scene_point(scene) else {
            self.end_text_edit();
            self.clear_selection();
            self.gesture = Gesture::RubberBand {
                anchor: scene,
                current: scene,
                last_hits: Vec::new(),
            };
            return;
        };

        if self.editing == Some(hit) {
            // Clicks inside the edited text belong to the host's editor.
            self.gesture = Gesture::Idle;
            return;
        }
        self.end_text_edit();

        if !self.selection.contains(hit) {
            if modifiers.shift {
                self.add_selected(hit);
                self.gesture = Gesture::Idle;
                return;
            }
            self.set_selection(&[hit]);
        }
        self.begin_drag(scene);
    }

    fn on_pointer_move(&mut self, screen: Point) {
        self.pointer = Some(screen);
        let scene = self.viewport.screen_to_scene(screen);

        match self.gesture.clone() {
            Gesture::Pan { last } => {
                self.viewport.pan(screen - last);
                self.gesture = Gesture::Pan { last: screen };
                self.store_viewport();
            }
            Gesture::Drag { press } => {
                let bounds = self.project.scene_rect();
                if self.selection.translate(scene - press, bounds) {
                    let poses = self.selection.poses();
                    self.apply_poses(&poses);
                    self.refresh_overlay();
                }
            }
            Gesture::Scale { corner, press } => {
                if self.selection.scale(scene - press, corner) {
                    let poses = self.selection.poses();
                    self.apply_poses(&poses);
                    self.refresh_overlay();
                }
            }
            Gesture::RubberBand { .. } => self.update_rubber_band(scene),
            Gesture::Idle => {}
        }
    }

    fn on_double_click(&mut self, scene: Point) {
        let Some(hit) = self.item_at_scene_point(scene) else {
            return;
        };
        let Some(item) = self.items.get(&hit) else {
            return;
        };
        match item.kind() {
            NodeKind::Text => {
                self.begin_text_edit(hit);
            }
            NodeKind::Image | NodeKind::File => {
                if self.selection.len() != 1 || !self.selection.contains(hit) {
                    return;
                }
                let path = self
                    .project
                    .nodes
                    .get(item.node_id)
                    .ok()
                    .and_then(|n| n.content.path().map(Path::to_path_buf));
                if let Some(path) = path {
                    self.effects.push(CanvasEffect::OpenPath(path));
                }
            }
        }
    }

    fn on_key(&mut self, key: &str, modifiers: Modifiers) {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return;
        };
        if self.editing.is_some() && action != ShortcutAction::Deselect {
            // Keys go to the text being edited.
            return;
        }
        match action {
            ShortcutAction::Copy => {
                self.copy_selection();
            }
            ShortcutAction::Cut => {
                self.cut_selection();
            }
            ShortcutAction::Paste => {
                self.paste_at_cursor();
            }
            ShortcutAction::Delete => {
                self.delete_selected();
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selection();
            }
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut => {
                let anchor = self.pointer.unwrap_or_else(|| self.view_centre());
                self.zoom_step(action == ShortcutAction::ZoomIn, anchor);
            }
            ShortcutAction::ResetZoom => {
                self.set_zoom_scale(1.0);
            }
            ShortcutAction::Deselect => {
                self.end_text_edit();
                self.clear_selection();
            }
        }
    }

    fn on_drop(&mut self, scene: Point, payload: &DropPayload) {
        match payload {
            DropPayload::Paths(paths) => {
                let stagger = Vec2::new(self.settings.drop_stagger, self.settings.drop_stagger);
                let mut pos = scene;
                for path in paths {
                    let result = if self.settings.is_image_path(path) {
                        self.new_image_item(path.clone(), pos)
                    } else {
                        self.new_file_item(path.clone(), pos)
                    };
                    match result {
                        Ok(_) => pos += stagger,
                        Err(err) => log::error!("could not add canvas item {path:?}: {err}"),
                    }
                }
            }
            DropPayload::Text(text) => {
                if let Err(err) = self.new_text_item(text.clone(), scene, 1.0, NodeKind::Text.as_str()) {
                    log::error!("could not add dropped text: {err}");
                }
            }
        }
    }

    fn emit_empty_state(&mut self) {
        let empty = self.items.is_empty();
        if self.last_empty != Some(empty) {
            self.last_empty = Some(empty);
            self.effects.push(CanvasEffect::EmptyChanged(empty));
        }
    }
}

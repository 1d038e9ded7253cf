//! Integration tests: canvas surface operations called directly by a host.

use kurbo::{Point, Size};
use mb_core::config::CanvasSettings;
use mb_core::error::CanvasError;
use mb_core::id::{CanvasItemId, NodeId};
use mb_core::item::ItemShape;
use mb_core::measure::FixedSizer;
use mb_core::model::{CanvasItemRecord, Node, NodeKind};
use mb_core::persist;
use mb_core::project::Project;
use mb_editor::{CanvasEffect, CanvasSurface};
use pretty_assertions::assert_eq;

fn surface_for(project: Project, image: Size) -> CanvasSurface {
    let _ = env_logger::builder().is_test(true).try_init();
    let settings = CanvasSettings::default();
    let sizer = Box::new(FixedSizer::new(image, &settings));
    CanvasSurface::with_sizer(project, settings, sizer)
}

fn surface() -> CanvasSurface {
    let project = Project::new("Ops", &CanvasSettings::default());
    let mut surface = surface_for(project, Size::new(200.0, 100.0));
    surface.take_effects();
    surface
}

fn node_of(surface: &CanvasSurface, id: CanvasItemId) -> NodeId {
    surface.item(id).unwrap().node_id
}

#[test]
fn opening_emits_empty_and_zoom() {
    let project = Project::new("Ops", &CanvasSettings::default());
    let mut s = surface_for(project, Size::new(200.0, 100.0));
    assert_eq!(
        s.take_effects(),
        vec![CanvasEffect::ZoomChanged(1.0), CanvasEffect::EmptyChanged(true)]
    );
}

#[test]
fn empty_state_is_reported_on_change_only() {
    let mut s = surface();
    let a = s.new_file_item("/docs/a.pdf", Point::new(0.0, 0.0)).unwrap();
    let b = s.new_file_item("/docs/b.pdf", Point::new(0.0, 100.0)).unwrap();
    assert_eq!(s.take_effects(), vec![CanvasEffect::EmptyChanged(false)]);

    s.remove_item(a).unwrap();
    assert!(s.take_effects().is_empty());
    s.remove_item(b).unwrap();
    assert_eq!(s.take_effects(), vec![CanvasEffect::EmptyChanged(true)]);
}

#[test]
fn shared_node_is_collected_with_its_last_placement() {
    let mut s = surface();
    let first = s.new_image_item("/img/sky.png", Point::new(0.0, 0.0)).unwrap();
    let node = node_of(&s, first);
    let second = s.duplicate_item(node, Point::new(300.0, 0.0), 1.0).unwrap();
    assert_eq!(node_of(&s, second), node);
    assert_eq!(s.project().nodes.reference_count(node).unwrap(), 2);

    s.remove_item(first).unwrap();
    assert_eq!(s.project().nodes.reference_count(node).unwrap(), 1);

    s.remove_item(second).unwrap();
    assert!(!s.project().nodes.contains(node));
    assert!(s.project().tabs.selected().items.is_empty());
}

#[test]
fn duplicating_text_copies_its_node() {
    let mut s = surface();
    let t = s
        .new_text_item("draft", Point::new(10.0, 10.0), 1.5, "Heading")
        .unwrap();
    let original = node_of(&s, t);

    let copy = s.duplicate_item(original, Point::new(10.0, 200.0), 1.5).unwrap();
    let copied = node_of(&s, copy);
    assert_ne!(copied, original);

    let node = s.project().nodes.get(copied).unwrap();
    assert_eq!(node.text_content(), Some("draft"));
    assert_eq!(node.name, "Heading");
    assert_eq!(s.project().nodes.reference_count(original).unwrap(), 1);
}

#[test]
fn removing_missing_item_is_not_found() {
    let mut s = surface();
    let err = s.remove_item(CanvasItemId::intern("nope")).unwrap_err();
    assert!(matches!(err, CanvasError::NotFound { .. }));
}

#[test]
fn inserting_record_for_unknown_node_fails() {
    let mut s = surface();
    let record = CanvasItemRecord::new(NodeId::intern("ghost"), Point::ZERO, 1.0);
    assert!(matches!(
        s.insert_item(record),
        Err(CanvasError::NotFound { .. })
    ));
    assert!(s.is_empty());
}

#[test]
fn non_positive_scale_is_rejected() {
    let mut s = surface();
    let first = s.new_image_item("/img/sky.png", Point::ZERO).unwrap();
    let node = node_of(&s, first);

    for scale in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            s.duplicate_item(node, Point::new(300.0, 0.0), scale),
            Err(CanvasError::Validation(_))
        ));
    }
    assert!(matches!(
        s.new_text_item("hi", Point::ZERO, 0.0, "Text_Node"),
        Err(CanvasError::Validation(_))
    ));

    assert_eq!(s.z_order(), &[first]);
    assert_eq!(s.project().tabs.selected().items.len(), 1);
    // The rejected text left no node behind.
    assert_eq!(s.project().nodes.len(), 1);
    assert_eq!(s.project().nodes.reference_count(node).unwrap(), 1);
}

#[test]
fn inserting_a_live_item_id_again_fails() {
    let mut s = surface();
    let first = s.new_image_item("/img/sky.png", Point::ZERO).unwrap();
    let node = node_of(&s, first);
    let mut record = CanvasItemRecord::new(node, Point::new(400.0, 0.0), 1.0);
    record.id = first;

    assert!(matches!(
        s.insert_item(record),
        Err(CanvasError::Validation(_))
    ));
    assert_eq!(s.z_order(), &[first]);
    assert_eq!(s.project().tabs.selected().items.len(), 1);

    // The node stays until its one real placement goes.
    s.remove_item(first).unwrap();
    assert!(s.project().nodes.get(node).is_err());
    assert!(s.is_empty());
}

#[test]
fn large_images_are_fitted() {
    let project = Project::new("Ops", &CanvasSettings::default());
    let mut s = surface_for(project, Size::new(1200.0, 800.0));
    let id = s.new_image_item("/img/poster.png", Point::ZERO).unwrap();
    assert_eq!(s.item(id).unwrap().scale, 0.5);
}

#[test]
fn editing_text_remeasures_every_placement() {
    let mut s = surface();
    let t = s
        .new_text_item("hi", Point::new(0.0, 0.0), 1.0, "Text_Node")
        .unwrap();
    let narrow = s.item(t).unwrap().body.local_size();
    s.select_all();

    s.set_text(t, "a considerably longer line of text").unwrap();

    let wide = s.item(t).unwrap().body.local_size();
    assert!(wide.width > narrow.width);
    let node = s.project().nodes.get(node_of(&s, t)).unwrap();
    assert_eq!(node.text_content(), Some("a considerably longer line of text"));
    assert_eq!(s.overlay().bounds().unwrap().width(), wide.width);
}

#[test]
fn set_text_rejects_non_text_items() {
    let mut s = surface();
    let img = s.new_image_item("/img/a.png", Point::ZERO).unwrap();
    assert!(matches!(
        s.set_text(img, "nope"),
        Err(CanvasError::InvalidType(_))
    ));
}

#[test]
fn bringing_to_front_reorders_records() {
    let mut s = surface();
    let a = s.new_file_item("/docs/a.pdf", Point::ZERO).unwrap();
    let b = s.new_file_item("/docs/b.pdf", Point::ZERO).unwrap();

    assert!(s.bring_to_front(a));
    assert!(!s.bring_to_front(a));
    assert_eq!(s.z_order(), &[b, a]);
    let records: Vec<CanvasItemId> = s
        .project()
        .tabs
        .selected()
        .items
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(records, vec![b, a]);
    assert_eq!(s.item(a).unwrap().z, 1);
}

#[test]
fn unresolved_records_are_skipped_but_kept() {
    let settings = CanvasSettings::default();
    let mut project = Project::new("Broken", &settings);
    let node = Node::file("/docs/kept.pdf");
    let node_id = node.id;
    project.nodes.put(node);
    let good = CanvasItemRecord::new(node_id, Point::ZERO, 1.0);
    project.nodes.add_reference(node_id, good.id).unwrap();
    let orphan = CanvasItemRecord::new(NodeId::intern("missing-node"), Point::ZERO, 1.0);
    let tab = project.tabs.selected_mut();
    tab.items.push(good.clone());
    tab.items.push(orphan);

    let s = surface_for(project, Size::new(200.0, 100.0));
    assert_eq!(s.z_order(), &[good.id]);
    assert_eq!(s.project().tabs.selected().items.len(), 2);
}

#[test]
fn removing_active_tab_shows_neighbour() {
    let mut s = surface();
    let first = s.active_tab();
    let kept = s.new_file_item("/docs/kept.pdf", Point::ZERO).unwrap();

    let second = s.add_tab("Scratch");
    s.activate_tab(second).unwrap();
    assert!(s.is_empty());
    let doomed = s.new_text_item("temp", Point::ZERO, 1.0, "Text_Node").unwrap();
    let doomed_node = node_of(&s, doomed);
    s.select_all();

    s.remove_tab(second).unwrap();
    assert_eq!(s.active_tab(), first);
    assert_eq!(s.z_order(), &[kept]);
    assert!(s.selected_ids().is_empty());
    assert!(!s.project().nodes.contains(doomed_node));
}

#[test]
fn last_tab_cannot_be_removed() {
    let mut s = surface();
    let only = s.active_tab();
    assert!(matches!(
        s.remove_tab(only),
        Err(CanvasError::Validation(_))
    ));
}

#[test]
fn copy_without_selection_keeps_clipboard() {
    let mut s = surface();
    let a = s.new_file_item("/docs/a.pdf", Point::new(50.0, 60.0)).unwrap();
    s.set_selection(&[a]);
    assert_eq!(s.copy_selection(), 1);
    assert_eq!(s.clipboard().origin(), Point::new(50.0, 60.0));

    s.clear_selection();
    assert_eq!(s.copy_selection(), 0);
    assert_eq!(s.clipboard().entries().len(), 1);
}

#[test]
fn paste_without_pointer_uses_copy_origin() {
    let mut s = surface();
    let a = s.new_file_item("/docs/a.pdf", Point::new(50.0, 60.0)).unwrap();
    s.set_selection(&[a]);
    s.copy_selection();

    let pasted = s.paste_at_cursor();
    assert_eq!(pasted.len(), 1);
    assert_eq!(s.item(pasted[0]).unwrap().pos, Point::new(50.0, 60.0));
    assert_eq!(s.selected_ids(), pasted);
}

#[test]
fn saved_surface_reopens_with_same_items() {
    let mut s = surface();
    s.new_file_item("/docs/a.pdf", Point::new(5.0, 5.0)).unwrap();
    s.new_text_item("hello", Point::new(300.0, 5.0), 2.0, "Greeting")
        .unwrap();
    s.set_zoom_scale(2.0);

    let path = std::env::temp_dir().join(format!("mb-editor-{}-reopen.json", std::process::id()));
    s.save(&path).unwrap();

    let project = persist::load(&path).unwrap();
    let reopened = surface_for(project, Size::new(200.0, 100.0));
    let kinds: Vec<NodeKind> = reopened.items().map(|i| i.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::File, NodeKind::Text]);
    assert_eq!(reopened.viewport().zoom(), 2.0);
    let _ = std::fs::remove_file(&path);
}

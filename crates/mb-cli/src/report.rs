//! Plain-text summaries printed by `inspect` and `check`.

use std::fmt::{self, Write as _};

use mb_core::model::NodeKind;
use mb_core::persist::LoadReport;
use mb_core::project::Project;

/// One line per tab, then node totals by kind. Loading has already dropped
/// unplaced nodes; `describe_repairs` lists them.
pub fn describe_project(project: &Project) -> String {
    let mut out = String::new();
    let _ = write_project(&mut out, project);
    out
}

fn write_project(out: &mut String, project: &Project) -> fmt::Result {
    writeln!(
        out,
        "project {:?} ({} × {})",
        project.name, project.canvas_size.width, project.canvas_size.height
    )?;

    let selected = project.tabs.selected_id();
    writeln!(out, "tabs: {}", project.tabs.len())?;
    for tab in project.tabs.iter() {
        let marker = if tab.id == selected { '*' } else { ' ' };
        writeln!(
            out,
            " {marker} {:<20} {} item(s)  colour {}  zoom {:.2}",
            tab.name,
            tab.items.len(),
            tab.color.to_hex(),
            tab.viewport.zoom
        )?;
    }

    let count = |kind: NodeKind| project.nodes.iter().filter(|n| n.kind() == kind).count();
    writeln!(
        out,
        "nodes: {} ({} image, {} text, {} file)",
        project.nodes.len(),
        count(NodeKind::Image),
        count(NodeKind::Text),
        count(NodeKind::File)
    )?;
    Ok(())
}

/// What loading had to skip or repair. Empty string when nothing.
pub fn describe_repairs(report: &LoadReport) -> String {
    let mut out = String::new();
    for line in &report.skipped {
        let _ = writeln!(out, "skipped: {line}");
    }
    let rec = &report.reconciliation;
    for id in &rec.dropped_items {
        let _ = writeln!(out, "dropped placement [{id}]: node missing");
    }
    for id in &rec.dropped_nodes {
        let _ = writeln!(out, "dropped node [{id}]: not placed on any tab");
    }
    for id in &rec.fixed_references {
        let _ = writeln!(out, "rebuilt references of node [{id}]");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_core::config::CanvasSettings;
    use mb_core::id::NodeId;
    use mb_core::kurbo::Point;
    use mb_core::model::{CanvasItemRecord, Node};
    use pretty_assertions::assert_eq;

    #[test]
    fn describes_tabs_and_nodes() {
        let settings = CanvasSettings::default();
        let mut project = Project::new("Board", &settings);
        let node = Node::text("hello", "Text_Node");
        let node_id = node.id;
        project.nodes.put(node);
        let record = CanvasItemRecord::new(node_id, Point::ZERO, 1.0);
        project.nodes.add_reference(node_id, record.id).unwrap();
        project.tabs.selected_mut().items.push(record);

        let text = describe_project(&project);
        assert!(text.starts_with("project \"Board\" (10000 × 10000)\n"));
        assert!(text.contains(" * Tab"));
        assert!(text.contains("1 item(s)"));
        assert!(text.ends_with("nodes: 1 (0 image, 1 text, 0 file)\n"));
    }

    #[test]
    fn unplaced_nodes_show_up_as_repairs() {
        let json = r#"{ "Project": {
            "selectedTab": "t", "tabs": [ { "tabID": "t", "canvasItems": [] } ],
            "nodes": [ { "nodeID": "loose", "nodeType": "File_Node", "filePath": "/docs/loose.pdf" } ]
        } }"#;
        let (project, report) = mb_core::persist::from_json_str(json).unwrap();
        assert!(describe_project(&project).ends_with("nodes: 0 (0 image, 0 text, 0 file)\n"));
        assert_eq!(
            describe_repairs(&report),
            "dropped node [loose]: not placed on any tab\n"
        );
    }

    #[test]
    fn clean_report_is_silent() {
        assert_eq!(describe_repairs(&LoadReport::default()), "");

        let mut report = LoadReport::default();
        report
            .reconciliation
            .dropped_nodes
            .push(NodeId::intern("stale"));
        assert_eq!(
            describe_repairs(&report),
            "dropped node [stale]: not placed on any tab\n"
        );
    }
}

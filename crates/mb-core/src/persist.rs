//! JSON project files.
//!
//! The on-disk object is wrapped in a top-level `"Project"` key:
//!
//! ```json
//! { "Project": {
//!     "projectName": "Board", "selectedTab": "…", "canvasSize": [10000, 10000],
//!     "tabs":  [ { "tabID", "tabName", "tabColor", "viewportPos", "viewportZoom",
//!                  "canvasItems": [ { "canvasItemID", "nodeID", "itemPos", "itemScale" } ] } ],
//!     "nodes": [ { "nodeID", "nodeType", "nodeName", "creationTime",
//!                  "canvasItemReferences", "imagePath" | "nodeText" | "filePath" } ]
//! } }
//! ```
//!
//! Loading is forgiving: a tab, placement, or node that fails to parse is
//! logged and skipped, and node references are rebuilt from the placements.
//! Only an unreadable file or a document without a usable `"Project"` object
//! fails the whole load.

use crate::config::CanvasSettings;
use crate::error::{CanvasError, Result};
use crate::id::{CanvasItemId, NodeId, TabId};
use crate::model::{CanvasItemRecord, Color, Node, NodeContent, NodeKind, Tab, ViewportState};
use crate::project::{Project, Reconciliation};
use crate::store::NodeStore;
use crate::tabs::TabRegistry;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::fs;
use std::path::{Path, PathBuf};

// ─── File schema ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProjectFileOut<'a> {
    #[serde(rename = "Project")]
    project: ProjectOut<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOut<'a> {
    project_name: &'a str,
    selected_tab: TabId,
    canvas_size: [f64; 2],
    tabs: Vec<TabOut>,
    nodes: Vec<NodeDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectIn {
    #[serde(default = "default_project_name")]
    project_name: String,
    /// Older files stored a tab index here; anything but a string is ignored.
    #[serde(default)]
    selected_tab: Value,
    #[serde(default = "default_canvas_size")]
    canvas_size: [f64; 2],
    #[serde(default)]
    tabs: Vec<Value>,
    #[serde(default)]
    nodes: Vec<Value>,
}

fn default_project_name() -> String {
    "Project".into()
}

fn default_canvas_size() -> [f64; 2] {
    CanvasSettings::default().canvas_size
}

/// Items stay raw on input so one bad record doesn't sink the tab.
#[derive(Deserialize)]
struct TabDto {
    #[serde(rename = "tabID")]
    tab_id: TabId,
    #[serde(rename = "tabName", default)]
    tab_name: String,
    #[serde(rename = "tabColor", default)]
    tab_color: String,
    #[serde(rename = "viewportPos", default)]
    viewport_pos: Option<[f64; 2]>,
    #[serde(rename = "viewportZoom", default)]
    viewport_zoom: Option<f64>,
    #[serde(rename = "canvasItems", default)]
    canvas_items: Vec<Value>,
}

#[derive(Serialize)]
struct TabOut {
    #[serde(rename = "tabID")]
    tab_id: TabId,
    #[serde(rename = "tabName")]
    tab_name: String,
    #[serde(rename = "tabColor")]
    tab_color: String,
    #[serde(rename = "viewportPos")]
    viewport_pos: [f64; 2],
    #[serde(rename = "viewportZoom")]
    viewport_zoom: f64,
    #[serde(rename = "canvasItems")]
    canvas_items: Vec<ItemDto>,
}

#[derive(Serialize, Deserialize)]
struct ItemDto {
    #[serde(rename = "canvasItemID")]
    canvas_item_id: CanvasItemId,
    #[serde(rename = "nodeID")]
    node_id: NodeId,
    #[serde(rename = "itemPos")]
    item_pos: [f64; 2],
    #[serde(rename = "itemScale", default = "unit_scale")]
    item_scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

#[derive(Serialize, Deserialize)]
struct NodeDto {
    #[serde(rename = "nodeID")]
    node_id: NodeId,
    #[serde(rename = "nodeType")]
    node_type: String,
    #[serde(rename = "nodeName", default)]
    node_name: String,
    #[serde(rename = "creationTime", default)]
    creation_time: u64,
    #[serde(rename = "canvasItemReferences", default)]
    canvas_item_references: Vec<CanvasItemId>,
    #[serde(rename = "imagePath", default, skip_serializing_if = "Option::is_none")]
    image_path: Option<PathBuf>,
    #[serde(rename = "nodeText", default, skip_serializing_if = "Option::is_none")]
    node_text: Option<String>,
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
}

// ─── Conversions ─────────────────────────────────────────────────────────

impl From<&Node> for NodeDto {
    fn from(node: &Node) -> Self {
        let (image_path, node_text, file_path) = match &node.content {
            NodeContent::Image { path } => (Some(path.clone()), None, None),
            NodeContent::Text { text } => (None, Some(text.clone()), None),
            NodeContent::File { path } => (None, None, Some(path.clone())),
        };
        Self {
            node_id: node.id,
            node_type: node.kind().as_str().to_string(),
            node_name: node.name.clone(),
            creation_time: node.creation_time,
            canvas_item_references: node.references.to_vec(),
            image_path,
            node_text,
            file_path,
        }
    }
}

impl TryFrom<NodeDto> for Node {
    type Error = CanvasError;

    fn try_from(dto: NodeDto) -> Result<Self> {
        let kind: NodeKind = dto.node_type.parse()?;
        let missing = |field: &str| {
            CanvasError::Validation(format!("{kind} [{}] has no {field}", dto.node_id))
        };
        let content = match kind {
            NodeKind::Image => NodeContent::Image {
                path: dto.image_path.clone().ok_or_else(|| missing("imagePath"))?,
            },
            NodeKind::Text => NodeContent::Text {
                text: dto.node_text.clone().ok_or_else(|| missing("nodeText"))?,
            },
            NodeKind::File => NodeContent::File {
                path: dto.file_path.clone().ok_or_else(|| missing("filePath"))?,
            },
        };
        let name = if dto.node_name.is_empty() {
            kind.as_str().to_string()
        } else {
            dto.node_name
        };
        Ok(Node {
            id: dto.node_id,
            name,
            creation_time: dto.creation_time,
            content,
            references: SmallVec::from_vec(dto.canvas_item_references),
        })
    }
}

impl From<&CanvasItemRecord> for ItemDto {
    fn from(record: &CanvasItemRecord) -> Self {
        Self {
            canvas_item_id: record.id,
            node_id: record.node_id,
            item_pos: [record.pos.x, record.pos.y],
            item_scale: record.scale,
        }
    }
}

impl TryFrom<ItemDto> for CanvasItemRecord {
    type Error = CanvasError;

    fn try_from(dto: ItemDto) -> Result<Self> {
        let record = CanvasItemRecord {
            id: dto.canvas_item_id,
            node_id: dto.node_id,
            pos: Point::new(dto.item_pos[0], dto.item_pos[1]),
            scale: dto.item_scale,
        };
        record.validate()?;
        Ok(record)
    }
}

impl From<&Tab> for TabOut {
    fn from(tab: &Tab) -> Self {
        Self {
            tab_id: tab.id,
            tab_name: tab.name.clone(),
            tab_color: tab.color.to_hex(),
            viewport_pos: [tab.viewport.scroll.x, tab.viewport.scroll.y],
            viewport_zoom: tab.viewport.zoom,
            canvas_items: tab.items.iter().map(ItemDto::from).collect(),
        }
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────

/// Records skipped or repaired while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// One line per skipped record.
    pub skipped: Vec<String>,
    pub reconciliation: Reconciliation,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.reconciliation.is_clean()
    }

    fn skip(&mut self, msg: String) {
        log::warn!("{msg}");
        self.skipped.push(msg);
    }
}

/// Parse a project document, recovering from bad records.
pub fn from_json_str(json: &str) -> Result<(Project, LoadReport)> {
    let mut root: Value = serde_json::from_str(json)?;
    let inner = root
        .get_mut("Project")
        .map(Value::take)
        .ok_or_else(|| CanvasError::Validation("missing top-level \"Project\" object".into()))?;
    let raw: ProjectIn = serde_json::from_value(inner)?;
    let mut report = LoadReport::default();

    let mut nodes = NodeStore::new();
    for value in raw.nodes {
        match serde_json::from_value::<NodeDto>(value)
            .map_err(CanvasError::from)
            .and_then(Node::try_from)
        {
            Ok(node) => {
                if let Some(prev) = nodes.put(node) {
                    report.skip(format!("duplicate node [{}], keeping the last", prev.id));
                }
            }
            Err(err) => report.skip(format!("skipping node: {err}")),
        }
    }

    let mut tabs = Vec::new();
    for value in raw.tabs {
        let dto: TabDto = match serde_json::from_value(value) {
            Ok(dto) => dto,
            Err(err) => {
                report.skip(format!("skipping tab: {err}"));
                continue;
            }
        };
        tabs.push(tab_from_dto(dto, &mut report));
    }

    let selected = raw.selected_tab.as_str().map(TabId::intern);
    let tabs = if tabs.is_empty() {
        report.skip("project has no readable tabs, adding an empty one".into());
        let settings = CanvasSettings::default();
        TabRegistry::new(Tab::new(
            "Tab",
            settings.accent(),
            settings.default_viewport(),
        ))
    } else {
        TabRegistry::from_parts(tabs, selected)?
    };

    let mut project = Project {
        name: raw.project_name,
        canvas_size: Size::new(raw.canvas_size[0], raw.canvas_size[1]),
        nodes,
        tabs,
    };
    report.reconciliation = project.reconcile();
    Ok((project, report))
}

fn tab_from_dto(dto: TabDto, report: &mut LoadReport) -> Tab {
    let defaults = ViewportState::default();
    let color = Color::from_hex(&dto.tab_color).unwrap_or_else(|| {
        if !dto.tab_color.is_empty() {
            log::warn!("tab [{}]: bad colour {:?}", dto.tab_id, dto.tab_color);
        }
        CanvasSettings::default().accent()
    });
    let viewport = ViewportState {
        scroll: dto
            .viewport_pos
            .map(|[x, y]| Vec2::new(x, y))
            .unwrap_or(defaults.scroll),
        zoom: dto
            .viewport_zoom
            .filter(|z| z.is_finite() && *z > 0.0)
            .unwrap_or(defaults.zoom),
    };

    let mut items = Vec::with_capacity(dto.canvas_items.len());
    for value in dto.canvas_items {
        match serde_json::from_value::<ItemDto>(value)
            .map_err(CanvasError::from)
            .and_then(CanvasItemRecord::try_from)
        {
            Ok(record) => items.push(record),
            Err(err) => report.skip(format!("tab [{}]: skipping canvas item: {err}", dto.tab_id)),
        }
    }

    Tab {
        id: dto.tab_id,
        name: dto.tab_name,
        color,
        viewport,
        items,
    }
}

pub fn load_with_report(path: &Path) -> Result<(Project, LoadReport)> {
    let json = fs::read_to_string(path).map_err(|e| CanvasError::io(path, e))?;
    let loaded = from_json_str(&json)?;
    log::info!(
        "loaded {:?}: {} tab(s), {} node(s), {} placement(s)",
        path,
        loaded.0.tabs.len(),
        loaded.0.nodes.len(),
        loaded.0.item_count()
    );
    Ok(loaded)
}

pub fn load(path: &Path) -> Result<Project> {
    load_with_report(path).map(|(project, _)| project)
}

/// Load, or start a fresh project if the file is missing or unusable.
pub fn load_or_default(path: &Path, settings: &CanvasSettings) -> Project {
    match load(path) {
        Ok(project) => project,
        Err(err) => {
            log::error!("could not open project: {err}; starting a new one");
            Project::new("Project", settings)
        }
    }
}

// ─── Saving ──────────────────────────────────────────────────────────────

/// Serialize the whole project. Nodes are ordered by creation time.
pub fn to_json_string(project: &Project) -> Result<String> {
    let mut nodes: Vec<&Node> = project.nodes.iter().collect();
    nodes.sort_by(|a, b| {
        a.creation_time
            .cmp(&b.creation_time)
            .then_with(|| a.id.as_str().cmp(b.id.as_str()))
    });

    let file = ProjectFileOut {
        project: ProjectOut {
            project_name: &project.name,
            selected_tab: project.tabs.selected_id(),
            canvas_size: [project.canvas_size.width, project.canvas_size.height],
            tabs: project.tabs.iter().map(TabOut::from).collect(),
            nodes: nodes.into_iter().map(NodeDto::from).collect(),
        },
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Write the project to `path`, all or nothing: the document is written to a
/// sibling temp file and renamed over the target.
pub fn save(project: &Project, path: &Path) -> Result<()> {
    let json = to_json_string(project)?;
    let tmp = temp_sibling(path);
    fs::write(&tmp, json).map_err(|e| CanvasError::io(&tmp, e))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(CanvasError::io(path, err));
    }
    log::info!("saved project {:?} to {:?}", project.name, path);
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project.json".into());
    path.with_file_name(format!(".{name}.tmp"))
}

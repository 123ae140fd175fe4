//! JSON export and import of the whole document.

use super::{ElementStore, Overlay, StoreEvent};
use super::search::SearchState;
use crate::elements::{Element, ElementId};
use crate::layer::{DEFAULT_LAYER_ID, Layer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Current version of the file format.
pub const FORMAT_VERSION: u32 = 1;

/// Saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramFile {
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub elements: BTreeMap<ElementId, Element>,
    pub element_order: Vec<ElementId>,
    pub grid_size: f64,
    pub layers: Vec<Layer>,
    /// Derived index of frames and their members. Ignored on import.
    #[serde(default)]
    pub frames: Vec<FrameSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSummary {
    pub id: ElementId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub member_ids: Vec<ElementId>,
}

/// Why an import was rejected. The store is untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Invalid element {id}: {reason}")]
    InvalidElement { id: String, reason: String },
    #[error("Unsupported file version {0} (newest supported is {max})", max = FORMAT_VERSION)]
    UnsupportedVersion(u32),
}

/// Host-facing result of an import: `{ success, error? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), ImportError>> for ImportOutcome {
    fn from(result: Result<(), ImportError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Parsed but not yet repaired document state.
struct Parsed {
    elements: BTreeMap<ElementId, Element>,
    element_order: Vec<ElementId>,
    layers: Vec<Layer>,
    grid_size: Option<f64>,
}

fn parse(json: &str) -> Result<Parsed, ImportError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
    let Some(root) = value.as_object() else {
        return Err(ImportError::InvalidJson("expected a JSON object".into()));
    };

    if let Some(version) = root.get("version").and_then(Value::as_u64) {
        let version = u32::try_from(version).unwrap_or(u32::MAX);
        if version > FORMAT_VERSION {
            return Err(ImportError::UnsupportedVersion(version));
        }
    }

    let raw_elements = root
        .get("elements")
        .ok_or(ImportError::MissingField("elements"))?
        .as_object()
        .ok_or_else(|| ImportError::InvalidJson("`elements` must be an object".into()))?;
    let raw_order = root
        .get("elementOrder")
        .ok_or(ImportError::MissingField("elementOrder"))?;

    let mut elements = BTreeMap::new();
    for (key, raw) in raw_elements {
        let element: Element =
            serde_json::from_value(raw.clone()).map_err(|e| ImportError::InvalidElement {
                id: key.clone(),
                reason: e.to_string(),
            })?;
        if element.id.to_string() != *key {
            return Err(ImportError::InvalidElement {
                id: key.clone(),
                reason: format!("key does not match element id {}", element.id),
            });
        }
        elements.insert(element.id, element);
    }

    let element_order: Vec<ElementId> = serde_json::from_value(raw_order.clone())
        .map_err(|e| ImportError::InvalidJson(format!("`elementOrder`: {e}")))?;
    let layers: Vec<Layer> = match root.get("layers") {
        Some(raw) => serde_json::from_value(raw.clone())
            .map_err(|e| ImportError::InvalidJson(format!("`layers`: {e}")))?,
        None => Vec::new(),
    };
    let grid_size = root.get("gridSize").and_then(Value::as_f64);

    Ok(Parsed {
        elements,
        element_order,
        layers,
        grid_size,
    })
}

/// Fix every reference a hand-edited or older file may have broken.
/// Returns the number of repairs made.
fn repair(parsed: &mut Parsed) -> usize {
    let mut repairs = 0;

    // Layers: unique ids, default layer present.
    let mut seen_layers = HashSet::new();
    parsed.layers.retain(|l| seen_layers.insert(l.id.clone()));
    if !parsed.layers.iter().any(Layer::is_default) {
        parsed.layers.insert(0, Layer::default_layer());
        repairs += 1;
    }
    let layer_ids: HashSet<String> = parsed.layers.iter().map(|l| l.id.clone()).collect();

    // Order: known ids once each, then anything the order forgot.
    let mut seen = HashSet::new();
    let before = parsed.element_order.len();
    parsed
        .element_order
        .retain(|id| parsed.elements.contains_key(id) && seen.insert(*id));
    repairs += before - parsed.element_order.len();
    for id in parsed.elements.keys() {
        if !seen.contains(id) {
            parsed.element_order.push(*id);
            repairs += 1;
        }
    }

    let groups: HashSet<ElementId> = parsed
        .elements
        .values()
        .filter(|el| el.is_group())
        .map(|el| el.id)
        .collect();
    let frames: HashSet<ElementId> = parsed
        .elements
        .values()
        .filter(|el| el.is_frame())
        .map(|el| el.id)
        .collect();
    let existing: HashSet<ElementId> = parsed.elements.keys().copied().collect();

    for el in parsed.elements.values_mut() {
        el.clamp_invariants();
        if !layer_ids.contains(&el.layer_id) {
            el.layer_id = DEFAULT_LAYER_ID.to_string();
            repairs += 1;
        }
        if el.group_id.is_some_and(|g| g == el.id || !groups.contains(&g)) {
            el.group_id = None;
            repairs += 1;
        }
        if el.parent_id.is_some_and(|p| p == el.id || !frames.contains(&p)) {
            el.parent_id = None;
            repairs += 1;
        }
        let id = el.id;
        if let Some(line) = el.as_line_mut() {
            for conn in [&mut line.start_connection, &mut line.end_connection] {
                if conn.is_some_and(|c| c.element_id == id || !existing.contains(&c.element_id)) {
                    *conn = None;
                    repairs += 1;
                }
            }
        }
    }

    // Break group cycles: walking up from any element must end at a root.
    let mut parents: BTreeMap<ElementId, ElementId> = parsed
        .elements
        .values()
        .filter_map(|el| el.group_id.map(|g| (el.id, g)))
        .collect();
    let starts: Vec<ElementId> = parents.keys().copied().collect();
    for start in starts {
        let mut visited = HashSet::from([start]);
        let mut current = start;
        while let Some(&parent) = parents.get(&current) {
            if !visited.insert(parent) {
                parents.remove(&current);
                if let Some(el) = parsed.elements.get_mut(&current) {
                    el.group_id = None;
                    repairs += 1;
                }
                break;
            }
            current = parent;
        }
    }

    // Rebuild child lists from the children's own group_id, keeping the
    // listed order where it agrees.
    let mut claimed: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
    for id in &parsed.element_order {
        if let Some(gid) = parsed.elements.get(id).and_then(|el| el.group_id) {
            claimed.entry(gid).or_default().push(*id);
        }
    }
    for gid in &groups {
        let members = claimed.remove(gid).unwrap_or_default();
        let Some(group) = parsed.elements.get_mut(gid).and_then(Element::as_group_mut) else {
            continue;
        };
        let mut rebuilt: Vec<ElementId> = group
            .child_ids
            .iter()
            .copied()
            .filter(|c| members.contains(c))
            .collect();
        for m in members {
            if !rebuilt.contains(&m) {
                rebuilt.push(m);
            }
        }
        if rebuilt != group.child_ids {
            group.child_ids = rebuilt;
            repairs += 1;
        }
    }

    repairs
}

impl ElementStore {
    /// Snapshot of the document as a file.
    pub fn to_file(&self) -> DiagramFile {
        let frames = self
            .elements_ordered()
            .filter(|el| el.is_frame())
            .map(|frame| {
                let rect = frame.rect();
                FrameSummary {
                    id: frame.id,
                    name: match &frame.kind {
                        crate::elements::ElementKind::Frame(f) => f.name.clone(),
                        _ => String::new(),
                    },
                    x: rect.x0,
                    y: rect.y0,
                    width: rect.width(),
                    height: rect.height(),
                    member_ids: self.frame_members(frame.id),
                }
            })
            .collect();
        DiagramFile {
            version: FORMAT_VERSION,
            timestamp: now_millis(),
            elements: self
                .elements
                .iter()
                .map(|(id, el)| (*id, el.clone()))
                .collect(),
            element_order: self.element_order.clone(),
            grid_size: self.grid.size,
            layers: self.layers.clone(),
            frames,
        }
    }

    /// Serialize the document to JSON.
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_file())
    }

    /// Replace the whole document with the one in `json`.
    ///
    /// `elements` and `elementOrder` are required. Broken references are
    /// repaired rather than rejected. On success history, selection,
    /// search, inline editing and the overlay are reset; on error nothing
    /// changes.
    pub fn import_from_json(&mut self, json: &str) -> Result<(), ImportError> {
        let mut parsed = match parse(json) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("import rejected: {e}");
                return Err(e);
            }
        };
        let repairs = repair(&mut parsed);
        if repairs > 0 {
            log::warn!("import repaired {repairs} inconsistencies");
        }

        self.elements = parsed.elements.into_iter().collect();
        self.element_order = parsed.element_order;
        self.layers = parsed.layers;
        if let Some(size) = parsed.grid_size.filter(|s| s.is_finite() && *s > 0.0) {
            self.grid.size = size;
        }
        if self.layer(&self.active_layer).is_none() {
            self.active_layer = DEFAULT_LAYER_ID.to_string();
        }
        self.history.clear();
        self.selection.clear();
        self.editing = None;
        self.search = SearchState::default();
        self.overlay = Overlay::default();

        log::info!(
            "imported {} elements on {} layers",
            self.elements.len(),
            self.layers.len()
        );
        self.emit(StoreEvent::Replaced);
        Ok(())
    }

    /// [`import_from_json`](Self::import_from_json) reported as `{success, error}`.
    pub fn import_outcome(&mut self, json: &str) -> ImportOutcome {
        self.import_from_json(json).into()
    }
}

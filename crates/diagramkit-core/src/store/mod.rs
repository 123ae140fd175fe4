//! The Element Store: canonical diagram state and every action that mutates it.
//!
//! All mutation flows through [`ElementStore`]. Every action runs to
//! completion synchronously and then notifies subscribers with a
//! [`StoreEvent`], which is how a renderer learns that it is dirty.
//! Actions that reference ids which no longer exist are silent no-ops.

mod arrange;
mod clipboard;
mod delete;
mod editing;
mod factory;
mod grouping;
mod history;
mod layers;
mod order;
mod search;
mod serialize;
mod transform;

pub use factory::{CurrentStyle, ElementFactory, ToolConfig};
pub use serialize::{DiagramFile, FORMAT_VERSION, FrameSummary, ImportError, ImportOutcome};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::elements::{Element, ElementId, ElementPatch};
use crate::geometry::{self, ConnectionCandidate};
use crate::layer::{DEFAULT_LAYER_ID, Layer, LayerId};
use crate::snap::Guide;
use crate::tools::ToolKind;
use clipboard::Clipboard;
use history::History;
use kurbo::{Point, Rect, Vec2};
use search::SearchState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type SubscriptionId = u64;

/// What changed. Emitted synchronously after each action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    ElementsChanged,
    SelectionChanged,
    LayersChanged,
    ViewChanged,
    ToolChanged,
    OverlayChanged,
    /// The whole state was replaced by an import.
    Replaced,
}

/// Background grid and grid snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub size: f64,
    pub visible: bool,
    pub snap: bool,
}

impl GridSettings {
    /// Snap `point` if grid snapping is on.
    pub fn apply(&self, point: Point) -> Point {
        if self.snap {
            geometry::snap_to_grid(point, self.size)
        } else {
            point
        }
    }
}

/// Transient drawing state owned by the active tool. Never serialized and
/// never part of history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Ghost of an in-progress placement.
    pub preview: Option<Element>,
    /// Freehand stroke being drawn, in world coordinates.
    pub path_preview: Vec<Point>,
    pub marquee: Option<Rect>,
    pub guides: Vec<Guide>,
    /// Connection point the line tool would snap to.
    pub connection_hint: Option<ConnectionCandidate>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Canonical, serializable diagram state plus the view and tool state the
/// host UI reads and writes.
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    /// Z-order, back to front.
    element_order: Vec<ElementId>,
    layers: Vec<Layer>,
    active_layer: LayerId,
    selection: Vec<ElementId>,
    clipboard: Clipboard,
    camera: Camera,
    tool: ToolConfig,
    current_style: CurrentStyle,
    grid: GridSettings,
    overlay: Overlay,
    editing: Option<ElementId>,
    search: SearchState,
    history: History,
    config: EngineConfig,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ElementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementStore")
            .field("elements", &self.elements.len())
            .field("layers", &self.layers.len())
            .field("selection", &self.selection)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

impl ElementStore {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            elements: HashMap::new(),
            element_order: Vec::new(),
            layers: vec![Layer::default_layer()],
            active_layer: DEFAULT_LAYER_ID.to_string(),
            selection: Vec::new(),
            clipboard: Clipboard::default(),
            camera: Camera::new(),
            tool: ToolConfig::default(),
            current_style: CurrentStyle::default(),
            grid: GridSettings {
                size: config.grid_size,
                visible: true,
                snap: false,
            },
            overlay: Overlay::default(),
            editing: None,
            search: SearchState::default(),
            history: History::new(config.history_limit),
            config,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- subscriptions ---

    /// Register a callback invoked after every action.
    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    fn emit(&mut self, event: StoreEvent) {
        log::trace!("store event {event:?}");
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }

    // --- element access ---

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Z-order, back to front.
    pub fn element_order(&self) -> &[ElementId] {
        &self.element_order
    }

    /// Elements in z-order (back to front).
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.element_order
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the element exists, is unlocked and sits on an unlocked,
    /// visible layer.
    pub fn is_interactive(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|el| !el.locked && self.layer_is_interactive(&el.layer_id))
    }

    /// Whether the element exists, is visible and its layer is visible.
    pub fn is_displayed(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|el| el.visible && self.layer_is_visible(&el.layer_id))
    }

    // --- primitive mutation ---

    /// Insert an element at the top of the z-order.
    ///
    /// Numeric fields are clamped and references are validated: an unknown
    /// layer falls back to the default layer, a dangling group, frame or
    /// connection reference is dropped. Adding an id that already exists
    /// does nothing.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let id = element.id;
        if self.elements.contains_key(&id) {
            log::warn!("add_element: {id} already exists");
            return id;
        }
        element.clamp_invariants();
        if self.layer(&element.layer_id).is_none() {
            element.layer_id = DEFAULT_LAYER_ID.to_string();
        }
        if element.parent_id.is_some_and(|p| !self.elements.get(&p).is_some_and(Element::is_frame)) {
            element.parent_id = None;
        }
        self.drop_dangling_connections(&mut element);

        if let Some(gid) = element.group_id {
            match self.elements.get_mut(&gid).and_then(Element::as_group_mut) {
                Some(group) => {
                    if !group.contains(id) {
                        group.child_ids.push(id);
                    }
                }
                None => element.group_id = None,
            }
        }

        let ancestors = self.ancestors(element.group_id);
        let children = element.as_group_mut().map(|group| {
            let mut seen = HashSet::new();
            group.child_ids.retain(|c| {
                *c != id
                    && !ancestors.contains(c)
                    && self.elements.contains_key(c)
                    && seen.insert(*c)
            });
            group.child_ids.clone()
        });

        self.elements.insert(id, element);
        self.element_order.push(id);
        if let Some(children) = children {
            self.adopt_children(id, &children);
        }
        self.emit(StoreEvent::ElementsChanged);
        id
    }

    /// Group ids from `start` up to the top-level group.
    fn ancestors(&self, start: Option<ElementId>) -> HashSet<ElementId> {
        let mut found = HashSet::new();
        let mut current = start;
        while let Some(gid) = current {
            if !found.insert(gid) {
                break;
            }
            current = self.elements.get(&gid).and_then(|el| el.group_id);
        }
        found
    }

    /// Point each child at `group_id`, detaching it from its previous group.
    /// Groups left with fewer than two children collapse.
    fn adopt_children(&mut self, group_id: ElementId, children: &[ElementId]) {
        let mut previous = Vec::new();
        for &child in children {
            let Some(el) = self.elements.get_mut(&child) else {
                continue;
            };
            let old = el.group_id.replace(group_id);
            if let Some(old) = old.filter(|old| *old != group_id) {
                if let Some(old_group) = self.elements.get_mut(&old).and_then(Element::as_group_mut) {
                    old_group.remove_child(child);
                }
                previous.push(old);
            }
        }
        let removed = self.collapse_groups(previous);
        if removed > 0 {
            log::debug!("add_element: {removed} groups collapsed after adopting children");
        }
    }

    /// Apply a partial update. No-op if `id` does not exist.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) {
        let Some(mut element) = self.elements.get(&id).cloned() else {
            return;
        };
        patch.apply(&mut element);
        element.clamp_invariants();
        if self.layer(&element.layer_id).is_none() {
            element.layer_id = DEFAULT_LAYER_ID.to_string();
        }
        self.drop_dangling_connections(&mut element);
        if let Some(line) = element.as_line_mut() {
            // A connection never points at the line itself.
            line.disconnect(id);
        }
        let connections_changed = patch.start_connection.is_some() || patch.end_connection.is_some();
        self.elements.insert(id, element);

        if connections_changed {
            self.snap_line_to_connections(id);
        }
        if patch.touches_geometry() {
            self.reanchor_lines(&HashSet::from([id]));
        }
        let selection_before = self.selection.len();
        self.prune_selection();

        self.emit(StoreEvent::ElementsChanged);
        if selection_before != self.selection.len() {
            self.emit(StoreEvent::SelectionChanged);
        }
    }

    fn drop_dangling_connections(&self, element: &mut Element) {
        let exists = |id: ElementId| self.elements.contains_key(&id);
        if let Some(line) = element.as_line_mut() {
            if line.start_connection.is_some_and(|c| !exists(c.element_id)) {
                line.start_connection = None;
            }
            if line.end_connection.is_some_and(|c| !exists(c.element_id)) {
                line.end_connection = None;
            }
        }
    }

    // --- selection ---

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Select `id`. With `additive` the id's membership is toggled and the
    /// rest of the selection kept; otherwise the selection becomes `[id]`.
    /// Missing or locked elements are ignored.
    pub fn select_element(&mut self, id: ElementId, additive: bool) {
        if !self.is_interactive(id) {
            return;
        }
        if additive {
            if let Some(pos) = self.selection.iter().position(|&s| s == id) {
                self.selection.remove(pos);
            } else {
                self.selection.push(id);
            }
        } else {
            self.selection = vec![id];
        }
        self.emit(StoreEvent::SelectionChanged);
    }

    /// Replace the selection, keeping only existing interactive ids.
    pub fn set_selection(&mut self, ids: &[ElementId]) {
        let mut seen = HashSet::new();
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.is_interactive(*id) && seen.insert(*id))
            .collect();
        self.emit(StoreEvent::SelectionChanged);
    }

    /// Select every visible, interactive top-level element.
    pub fn select_all(&mut self) {
        self.selection = self.selectable_roots(|_| true);
        self.emit(StoreEvent::SelectionChanged);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.emit(StoreEvent::SelectionChanged);
    }

    /// Replace the selection with every visible, interactive element whose
    /// bounds intersect `rect`, promoted to its top-level group. A
    /// zero-area rectangle does nothing.
    pub fn select_by_lasso(&mut self, rect: Rect) {
        let rect = rect.abs();
        if rect.is_zero_area() {
            return;
        }
        self.selection =
            self.selectable_roots(|el| geometry::rects_intersect(el.bounds(), rect));
        self.emit(StoreEvent::SelectionChanged);
    }

    fn selectable_roots(&self, accept: impl Fn(&Element) -> bool) -> Vec<ElementId> {
        let mut roots = Vec::new();
        for el in self.elements_ordered() {
            if el.is_group() || !self.is_displayed(el.id) || !self.is_interactive(el.id) {
                continue;
            }
            if !accept(el) {
                continue;
            }
            let root = self.top_level_group(el.id);
            if self.is_interactive(root) && !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Drop ids that no longer exist or are no longer interactive.
    fn prune_selection(&mut self) {
        let keep: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.is_interactive(*id))
            .collect();
        self.selection = keep;
    }

    // --- view ---

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.camera.pan = pan;
        self.emit(StoreEvent::ViewChanged);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan_by(delta);
        self.emit(StoreEvent::ViewChanged);
    }

    /// Set the zoom level (clamped).
    pub fn set_zoom(&mut self, zoom: f64) {
        self.camera.set_zoom(zoom);
        self.emit(StoreEvent::ViewChanged);
    }

    /// Zoom by `factor` about a fixed screen point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.camera.zoom_at(screen_point, factor);
        self.emit(StoreEvent::ViewChanged);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.camera.set_zoom(camera.zoom);
        self.emit(StoreEvent::ViewChanged);
    }

    // --- tool state ---

    pub fn tool_config(&self) -> &ToolConfig {
        &self.tool
    }

    pub fn tool(&self) -> ToolKind {
        self.tool.tool
    }

    /// Switch the active tool. Clears any transient overlay.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool.tool == tool {
            return;
        }
        self.tool.tool = tool;
        self.clear_overlay();
        self.emit(StoreEvent::ToolChanged);
    }

    pub fn set_tool_config(&mut self, config: ToolConfig) {
        let tool_changed = config.tool != self.tool.tool;
        self.tool = config;
        if tool_changed {
            self.clear_overlay();
        }
        self.emit(StoreEvent::ToolChanged);
    }

    pub fn current_style(&self) -> &CurrentStyle {
        &self.current_style
    }

    pub fn set_current_style(&mut self, style: CurrentStyle) {
        self.current_style = style;
        self.emit(StoreEvent::ToolChanged);
    }

    /// Factory seeding new elements from the current style, tool
    /// configuration and active layer.
    pub fn factory(&self) -> ElementFactory<'_> {
        ElementFactory::new(&self.current_style, &self.tool, &self.active_layer)
    }

    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    pub fn set_grid(&mut self, grid: GridSettings) {
        self.grid = grid;
        if !self.grid.size.is_finite() || self.grid.size <= 0.0 {
            self.grid.size = self.config.grid_size;
        }
        self.emit(StoreEvent::ViewChanged);
    }

    // --- overlay ---

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Mutate the transient overlay and notify subscribers.
    pub fn update_overlay(&mut self, update: impl FnOnce(&mut Overlay)) {
        update(&mut self.overlay);
        self.emit(StoreEvent::OverlayChanged);
    }

    pub fn clear_overlay(&mut self) {
        if self.overlay.is_empty() {
            return;
        }
        self.overlay = Overlay::default();
        self.emit(StoreEvent::OverlayChanged);
    }

    // --- structure queries ---

    /// World bounds of an element. Group bounds are the union of their
    /// descendants; an empty group has none.
    pub fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        let el = self.elements.get(&id)?;
        if el.is_group() {
            geometry::union_rects(
                self.descendants(id)
                    .into_iter()
                    .filter_map(|d| self.elements.get(&d))
                    .filter(|d| !d.is_group())
                    .map(Element::bounds),
            )
        } else {
            Some(el.bounds())
        }
    }

    /// Union of the bounds of every selected element.
    pub fn selection_bounds(&self) -> Option<Rect> {
        geometry::union_rects(self.selection.iter().filter_map(|id| self.element_bounds(*id)))
    }

    /// Union of the bounds of every displayed element.
    pub fn content_bounds(&self) -> Option<Rect> {
        geometry::union_rects(
            self.elements_ordered()
                .filter(|el| !el.is_group() && self.is_displayed(el.id))
                .map(Element::bounds),
        )
    }

    /// Every transitive child of a group, depth first. Empty for non-groups.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(group) = self.elements.get(&current).and_then(Element::as_group) else {
                continue;
            };
            for &child in group.child_ids.iter().rev() {
                if visited.insert(child) && self.elements.contains_key(&child) {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }

    /// The outermost group containing `id`, or `id` itself.
    pub fn top_level_group(&self, id: ElementId) -> ElementId {
        let mut current = id;
        for _ in 0..=self.elements.len() {
            match self.elements.get(&current).and_then(|el| el.group_id) {
                Some(parent) if self.elements.contains_key(&parent) => current = parent,
                _ => break,
            }
        }
        current
    }

    /// `ids` plus group descendants (and frame members when asked), in z-order.
    pub(crate) fn expand_ids(&self, ids: &[ElementId], with_frame_members: bool) -> Vec<ElementId> {
        let mut set = HashSet::new();
        let mut stack: Vec<ElementId> = ids.to_vec();
        while let Some(id) = stack.pop() {
            let Some(el) = self.elements.get(&id) else {
                continue;
            };
            if !set.insert(id) {
                continue;
            }
            if let Some(group) = el.as_group() {
                stack.extend(group.child_ids.iter().copied());
            }
            if with_frame_members && el.is_frame() {
                stack.extend(
                    self.elements
                        .values()
                        .filter(|e| e.parent_id == Some(id))
                        .map(|e| e.id),
                );
            }
        }
        self.element_order
            .iter()
            .copied()
            .filter(|id| set.contains(id))
            .collect()
    }
}

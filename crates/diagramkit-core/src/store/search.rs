//! Text search over the document.

use super::{ElementStore, StoreEvent};
use crate::elements::{Element, ElementId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(super) struct SearchState {
    query: String,
    results: Vec<ElementId>,
    current: Option<usize>,
}

impl SearchState {
    /// Drop results for elements that no longer exist.
    pub(super) fn retain_existing(&mut self, elements: &HashMap<ElementId, Element>) {
        let current_id = self.current.and_then(|i| self.results.get(i).copied());
        self.results.retain(|id| elements.contains_key(id));
        self.current = match current_id {
            _ if self.results.is_empty() => None,
            Some(id) => self.results.iter().position(|r| *r == id).or(Some(0)),
            None => None,
        };
    }
}

impl ElementStore {
    /// Find every displayed element whose text matches `query`
    /// (case-insensitive), in z-order. Returns the number of matches.
    /// An empty query clears the search.
    pub fn search(&mut self, query: &str) -> usize {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            self.clear_search();
            return 0;
        }
        let results: Vec<ElementId> = self
            .elements_ordered()
            .filter(|el| self.is_displayed(el.id))
            .filter(|el| {
                el.searchable_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .map(|el| el.id)
            .collect();
        log::debug!("search {query:?}: {} results", results.len());
        self.search = SearchState {
            query: query.to_string(),
            current: (!results.is_empty()).then_some(0),
            results,
        };
        self.emit(StoreEvent::OverlayChanged);
        self.search.results.len()
    }

    pub fn search_query(&self) -> &str {
        &self.search.query
    }

    /// Matching ids of the last search, in z-order.
    pub fn search_results(&self) -> &[ElementId] {
        &self.search.results
    }

    /// The result currently focused, if any.
    pub fn current_search_result(&self) -> Option<ElementId> {
        self.search
            .current
            .and_then(|i| self.search.results.get(i).copied())
    }

    /// Advance to the next result, wrapping around, and return it.
    pub fn next_search_result(&mut self) -> Option<ElementId> {
        if self.search.results.is_empty() {
            return None;
        }
        let next = self
            .search
            .current
            .map_or(0, |i| (i + 1) % self.search.results.len());
        self.search.current = Some(next);
        self.emit(StoreEvent::OverlayChanged);
        self.current_search_result()
    }

    pub fn clear_search(&mut self) {
        if self.search.query.is_empty() && self.search.results.is_empty() {
            return;
        }
        self.search = SearchState::default();
        self.emit(StoreEvent::OverlayChanged);
    }
}

#[cfg(test)]
mod tests {
    use crate::store::ElementStore;
    use kurbo::Rect;

    #[test]
    fn test_search_is_case_insensitive() {
        let mut store = ElementStore::new();
        let a = store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), "Pump Station"));
        store.add_element(store.factory().text(Rect::new(0.0, 100.0, 100.0, 140.0), "Valve"));
        let c = store.add_element(store.factory().text(Rect::new(0.0, 200.0, 100.0, 240.0), "pump"));

        assert_eq!(store.search("PUMP"), 2);
        assert_eq!(store.search_results(), &[a, c]);
        assert_eq!(store.current_search_result(), Some(a));
        assert_eq!(store.next_search_result(), Some(c));
        assert_eq!(store.next_search_result(), Some(a));
    }

    #[test]
    fn test_search_matches_plm_node_id() {
        let mut store = ElementStore::new();
        let mut el = store.factory().shape(Rect::new(0.0, 0.0, 50.0, 50.0));
        el.plm_node_id = Some("NODE-42".into());
        let id = store.add_element(el);
        assert_eq!(store.search("node-42"), 1);
        assert_eq!(store.search_results(), &[id]);
    }

    #[test]
    fn test_delete_prunes_results() {
        let mut store = ElementStore::new();
        let a = store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), "alpha"));
        let b = store.add_element(store.factory().text(Rect::new(0.0, 100.0, 100.0, 140.0), "alpha"));
        store.search("alpha");
        store.delete_elements(&[a]);
        assert_eq!(store.search_results(), &[b]);
        assert_eq!(store.current_search_result(), Some(b));
    }

    #[test]
    fn test_empty_query_clears() {
        let mut store = ElementStore::new();
        store.add_element(store.factory().text(Rect::new(0.0, 0.0, 100.0, 40.0), "alpha"));
        store.search("alpha");
        assert_eq!(store.search("  "), 0);
        assert!(store.search_results().is_empty());
        assert_eq!(store.next_search_result(), None);
    }
}

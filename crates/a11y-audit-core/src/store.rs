//! Cross-element state stores.
//!
//! Stores let per-element checks answer questions about the whole
//! document (duplicate alt text, fragment targets, heading outline). They
//! are owned by the [`Engine`](crate::Engine), which clears them at the
//! start of every scan.
//!
//! | Store | Key normalisation | Value |
//! |-------|-------------------|-------|
//! | [`AltTextStore`] | lowercase, whitespace collapsed, trimmed | elements in registration order |
//! | [`AnchorTargetStore`] | exact (ids are case-sensitive) | presence |
//! | [`HeadingIndex`] | document order | `(node, level)` |

use crate::utils::text::normalize_key;
use ego_tree::NodeId;
use std::collections::{HashMap, HashSet};

/// Common lifecycle for scan-scoped stores.
pub trait CrossElementStore {
    /// Removes every entry.
    fn clear(&mut self);

    /// Returns true if the store holds no entries.
    fn is_empty(&self) -> bool;
}

/// Alt text seen so far in the scan, keyed by normalised text.
#[derive(Debug, Default, Clone)]
pub struct AltTextStore {
    entries: HashMap<String, Vec<NodeId>>,
}

impl AltTextStore {
    /// Records `node` under the normalised `alt` text.
    ///
    /// Returns true if another element was already registered under the
    /// same key. Registering the same node twice is a no-op.
    pub fn register(&mut self, alt: &str, node: NodeId) -> bool {
        let nodes = self.entries.entry(normalize_key(alt)).or_default();
        let seen_other = nodes.iter().any(|n| *n != node);
        if !nodes.contains(&node) {
            nodes.push(node);
        }
        seen_other
    }

    /// Returns the elements registered under the normalised `alt` text.
    #[must_use]
    pub fn lookup(&self, alt: &str) -> &[NodeId] {
        self.entries
            .get(&normalize_key(alt))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl CrossElementStore for AltTextStore {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fragment targets present in the document: every `id` plus legacy
/// `<a name>` values.
#[derive(Debug, Default, Clone)]
pub struct AnchorTargetStore {
    targets: HashSet<String>,
    indexed: bool,
}

impl AnchorTargetStore {
    /// Records a target name.
    pub fn register(&mut self, name: &str) {
        self.targets.insert(name.to_string());
    }

    /// Returns true if `name` is a known target.
    #[must_use]
    pub fn lookup(&self, name: &str) -> bool {
        self.targets.contains(name)
    }

    /// Returns true once the document has been indexed this scan.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Marks the store as fully populated for the current document.
    pub fn mark_indexed(&mut self) {
        self.indexed = true;
    }
}

impl CrossElementStore for AnchorTargetStore {
    fn clear(&mut self) {
        self.targets.clear();
        self.indexed = false;
    }

    fn is_empty(&self) -> bool {
        self.targets.is_empty() && !self.indexed
    }
}

/// Headings in document order with their resolved levels.
#[derive(Debug, Default, Clone)]
pub struct HeadingIndex {
    headings: Vec<(NodeId, u8)>,
    indexed: bool,
}

impl HeadingIndex {
    /// Appends a heading.
    pub fn register(&mut self, node: NodeId, level: u8) {
        self.headings.push((node, level));
    }

    /// All headings in document order.
    #[must_use]
    pub fn headings(&self) -> &[(NodeId, u8)] {
        &self.headings
    }

    /// Returns the level of the heading that precedes `node`.
    #[must_use]
    pub fn previous_level(&self, node: NodeId) -> Option<u8> {
        let pos = self.headings.iter().position(|(n, _)| *n == node)?;
        pos.checked_sub(1).map(|i| self.headings[i].1)
    }

    /// Returns true once the document has been indexed this scan.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Marks the index as complete for the current document.
    pub fn mark_indexed(&mut self) {
        self.indexed = true;
    }
}

impl CrossElementStore for HeadingIndex {
    fn clear(&mut self) {
        self.headings.clear();
        self.indexed = false;
    }

    fn is_empty(&self) -> bool {
        self.headings.is_empty() && !self.indexed
    }
}

/// Every store the engine owns, cleared together.
#[derive(Debug, Default, Clone)]
pub struct ScanStores {
    /// Normalised alt text registry.
    pub alt_text: AltTextStore,
    /// Fragment target registry.
    pub anchors: AnchorTargetStore,
    /// Heading outline.
    pub headings: HeadingIndex,
}

impl ScanStores {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrossElementStore for ScanStores {
    fn clear(&mut self) {
        self.alt_text.clear();
        self.anchors.clear();
        self.headings.clear();
    }

    fn is_empty(&self) -> bool {
        self.alt_text.is_empty() && self.anchors.is_empty() && self.headings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn two_nodes() -> (Document, NodeId, NodeId) {
        let doc = Document::parse("<img id=a><img id=b>");
        let a = doc.element_by_id("a").unwrap().id();
        let b = doc.element_by_id("b").unwrap().id();
        (doc, a, b)
    }

    #[test]
    fn alt_text_keys_are_normalised() {
        let (_doc, a, b) = two_nodes();
        let mut store = AltTextStore::default();
        assert!(!store.register("  A   Cat ", a));
        assert!(store.register("a cat", b));
        assert_eq!(store.lookup("A CAT"), &[a, b]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn alt_text_same_node_is_not_a_duplicate() {
        let (_doc, a, _) = two_nodes();
        let mut store = AltTextStore::default();
        assert!(!store.register("x", a));
        assert!(!store.register("x", a));
        assert_eq!(store.lookup("x").len(), 1);
    }

    #[test]
    fn clear_empties_every_store() {
        let (_doc, a, _) = two_nodes();
        let mut stores = ScanStores::new();
        stores.alt_text.register("x", a);
        stores.anchors.register("top");
        stores.anchors.mark_indexed();
        stores.headings.register(a, 2);
        assert!(!stores.is_empty());

        stores.clear();
        assert!(stores.is_empty());
        assert!(!stores.anchors.lookup("top"));
        assert!(!stores.headings.is_indexed());
    }

    #[test]
    fn heading_previous_level() {
        let (_doc, a, b) = two_nodes();
        let mut index = HeadingIndex::default();
        index.register(a, 1);
        index.register(b, 3);
        assert_eq!(index.previous_level(a), None);
        assert_eq!(index.previous_level(b), Some(1));
    }
}

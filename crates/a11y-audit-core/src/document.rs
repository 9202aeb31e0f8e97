//! Parsed HTML documents and element lookup.

use crate::style::Stylesheet;
use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use std::cell::RefCell;
use std::collections::HashMap;
use url::Url;

type CascadeCache = HashMap<(NodeId, String), Option<String>>;

/// A parsed HTML document together with its author stylesheet.
///
/// Elements are addressed by their tree [`NodeId`], which stays valid for
/// the lifetime of the document and is what violations carry back to the
/// host.
pub struct Document {
    html: Html,
    stylesheet: Stylesheet,
    base_url: Option<Url>,
    cascade: RefCell<CascadeCache>,
}

impl Document {
    /// Parses a complete HTML document.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self::from_html(Html::parse_document(source))
    }

    /// Parses an HTML fragment (no implied `<head>`/`<body>`).
    #[must_use]
    pub fn parse_fragment(source: &str) -> Self {
        Self::from_html(Html::parse_fragment(source))
    }

    fn from_html(html: Html) -> Self {
        let stylesheet = Stylesheet::from_html(&html);
        Self {
            html,
            stylesheet,
            base_url: None,
            cascade: RefCell::default(),
        }
    }

    /// Sets the URL that relative resource references resolve against.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Returns the underlying `scraper` document.
    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Returns the author stylesheet collected from `<style>` blocks.
    #[must_use]
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Returns the cascaded value of `property` for `element`, memoised per
    /// node so ancestor walks over the same subtree match each style rule once.
    #[must_use]
    pub fn cascaded_value(&self, element: ElementRef<'_>, property: &str) -> Option<String> {
        let key = (element.id(), property.to_string());
        if let Some(hit) = self.cascade.borrow().get(&key) {
            return hit.clone();
        }
        let value = self.stylesheet.cascaded_value(element, property);
        self.cascade.borrow_mut().insert(key, value.clone());
        value
    }

    /// Returns the base URL, if one was supplied.
    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Returns the root element (`<html>`).
    #[must_use]
    pub fn root_element(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Looks up an element by its tree node id.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(node).and_then(ElementRef::wrap)
    }

    /// Returns the first element whose `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.elements().find(|el| el.value().id() == Some(id))
    }

    /// Iterates every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("style_rules", &self.stylesheet.len())
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_lookup_by_id() {
        let doc = Document::parse(r#"<p id="a">one</p><p id="b">two</p>"#);
        let el = doc.element_by_id("b").expect("element b");
        assert_eq!(el.text().collect::<String>(), "two");
        assert!(doc.element_by_id("missing").is_none());
    }

    #[test]
    fn node_id_round_trips() {
        let doc = Document::parse("<main><img src=a.png></main>");
        let img = doc
            .elements()
            .find(|el| el.value().name() == "img")
            .expect("img");
        let again = doc.element(img.id()).expect("same node");
        assert_eq!(again.value().name(), "img");
    }

    #[test]
    fn cascaded_values_are_memoised_per_node() {
        let doc = Document::parse(
            "<style>.x { display: none } p { visibility: hidden }</style>\
             <div class=x><p id=a>a</p><p id=b style='visibility:visible'>b</p></div>",
        );
        let a = doc.element_by_id("a").expect("a");
        let b = doc.element_by_id("b").expect("b");
        let div = doc.elements().find(|el| el.value().name() == "div").expect("div");

        for _ in 0..2 {
            assert_eq!(doc.cascaded_value(div, "display").as_deref(), Some("none"));
            assert_eq!(doc.cascaded_value(a, "visibility").as_deref(), Some("hidden"));
            assert_eq!(doc.cascaded_value(b, "visibility").as_deref(), Some("visible"));
            assert_eq!(doc.cascaded_value(a, "display"), None);
        }
        assert_eq!(doc.cascade.borrow().len(), 4);
        assert_eq!(
            doc.cascaded_value(b, "visibility"),
            doc.stylesheet().cascaded_value(b, "visibility")
        );
    }

    #[test]
    fn fragment_has_html_root() {
        let doc = Document::parse_fragment("<span>hi</span>");
        assert_eq!(doc.root_element().value().name(), "html");
    }
}

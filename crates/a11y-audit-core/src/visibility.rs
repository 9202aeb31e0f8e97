//! The visibility oracle.
//!
//! Every rule that opts out of hidden elements goes through
//! [`Visibility::is_effectively_hidden`]; checks must not carry their own
//! partial visibility logic.

use crate::document::Document;
use crate::utils::attributes::is_aria_hidden;
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Elements the user agent stylesheet renders with `display: none`.
const UA_HIDDEN_ELEMENTS: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base", "datalist",
];

/// Elements whose text never contributes to rendered content.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Elements whose boundaries separate words in rendered text. Inline
/// elements (`b`, `span`, `a`, ...) join their text to the neighbours.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "details", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "td", "th", "tr", "ul",
];

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Read-only visibility queries against a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Visibility<'a> {
    document: &'a Document,
}

impl<'a> Visibility<'a> {
    /// Creates an oracle for `document`.
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns true if `element` is hidden from users.
    ///
    /// An element is hidden when it, or any ancestor, has a `display` of
    /// `none`; when its inherited `visibility` is `hidden` or `collapse`; or
    /// when it carries `aria-hidden="true"` itself. Elements that are not
    /// attached to a document tree are reported as hidden.
    #[must_use]
    pub fn is_effectively_hidden(&self, element: ElementRef<'_>) -> bool {
        if !is_attached(*element) {
            return true;
        }
        if is_aria_hidden(element) {
            return true;
        }
        if self.computed_visibility_hidden(element) {
            return true;
        }
        std::iter::once(element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|el| self.display_none(el))
    }

    /// Returns true if the element itself (ignoring ancestors) is removed
    /// from rendering: `display: none`, own `visibility: hidden`, or
    /// `aria-hidden="true"`.
    #[must_use]
    pub fn is_self_hidden(&self, element: ElementRef<'_>) -> bool {
        if is_aria_hidden(element) || self.display_none(element) {
            return true;
        }
        matches!(
            self.document.cascaded_value(element, "visibility").as_deref(),
            Some("hidden" | "collapse")
        )
    }

    /// Returns true if the element's own `display` resolves to `none`.
    #[must_use]
    pub fn display_none(&self, element: ElementRef<'_>) -> bool {
        match self.document.cascaded_value(element, "display") {
            Some(value) => value == "none",
            None => ua_hidden(element),
        }
    }

    /// Resolves the inherited `visibility` property.
    fn computed_visibility_hidden(&self, element: ElementRef<'_>) -> bool {
        for el in std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap)) {
            match self.document.cascaded_value(el, "visibility").as_deref() {
                Some("hidden" | "collapse") => return true,
                Some("visible") => return false,
                _ => {}
            }
        }
        false
    }

    /// Concatenates the rendered text of `element`, skipping script/style
    /// content and descendants that are themselves hidden.
    #[must_use]
    pub fn visible_text(&self, element: ElementRef<'_>) -> String {
        let mut out = String::new();
        self.collect_text(*element, &mut out);
        out
    }

    fn collect_text(&self, node: NodeRef<'_, Node>, out: &mut String) {
        for child in node.children() {
            match child.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => {
                    if NON_TEXT_ELEMENTS.contains(&el.name()) {
                        continue;
                    }
                    if let Some(child_el) = ElementRef::wrap(child) {
                        if self.is_self_hidden(child_el) {
                            continue;
                        }
                    }
                    let block = is_block(el.name());
                    if block {
                        out.push(' ');
                    }
                    self.collect_text(child, out);
                    if block {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
    }
}

/// Returns the raw text content of `element` (all descendants, excluding
/// script and style), regardless of visibility.
#[must_use]
pub fn text_content(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_all_text(*element, &mut out);
    out
}

fn collect_all_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if !NON_TEXT_ELEMENTS.contains(&el.name()) => {
                let block = is_block(el.name());
                if block {
                    out.push(' ');
                }
                collect_all_text(child, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn ua_hidden(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() {
        return true;
    }
    if el.name() == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return true;
    }
    UA_HIDDEN_ELEMENTS.contains(&el.name())
}

fn is_attached(node: NodeRef<'_, Node>) -> bool {
    let root = node.ancestors().last().unwrap_or(node);
    matches!(root.value(), Node::Document | Node::Fragment)
}

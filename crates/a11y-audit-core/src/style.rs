//! Author stylesheet collection and a minimal cascade.
//!
//! Only what the visibility and styling checks need is modelled: `<style>`
//! blocks and inline `style` attributes, ordered by importance, origin,
//! specificity, and source order. Inheritance is left to the callers that
//! need it (see [`crate::visibility`]).

use cssparser::{ParseError, Parser, ParserInput, Token};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Selector specificity as `(ids, classes/attributes/pseudo-classes, types)`.
pub type Specificity = (u32, u32, u32);

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Trimmed value with any `!important` flag removed.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

#[derive(Debug)]
struct StyleRule {
    selector: Selector,
    specificity: Specificity,
    declarations: Vec<Declaration>,
}

/// Style rules gathered from a document's `<style>` elements.
#[derive(Debug, Default)]
pub struct Stylesheet {
    rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parses a CSS source string. Unparseable selectors are skipped.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::default();
        sheet.append(css);
        sheet
    }

    /// Collects every `<style>` block in document order.
    #[must_use]
    pub fn from_html(html: &Html) -> Self {
        let mut sheet = Self::default();
        if let Ok(style) = Selector::parse("style") {
            for element in html.select(&style) {
                let css: String = element.text().collect();
                sheet.append(&css);
            }
        }
        sheet
    }

    /// Returns the number of (selector, declaration block) rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn append(&mut self, css: &str) {
        let mut blocks = Vec::new();
        collect_blocks(css, &mut blocks);

        for (prelude, body) in blocks {
            let declarations = parse_declarations(&body);
            if declarations.is_empty() {
                continue;
            }
            for selector_text in split_top_level(&prelude, ',') {
                let selector_text = selector_text.trim();
                if selector_text.is_empty() {
                    continue;
                }
                match Selector::parse(selector_text) {
                    Ok(selector) => self.rules.push(StyleRule {
                        selector,
                        specificity: specificity(selector_text),
                        declarations: declarations.clone(),
                    }),
                    Err(e) => debug!("Skipping unsupported CSS selector {selector_text:?}: {e:?}"),
                }
            }
        }
    }

    /// Returns the cascaded (not inherited) value of `property` for `element`.
    ///
    /// The winning declaration is the maximum of
    /// `(important, inline, specificity, source order)`.
    #[must_use]
    pub fn cascaded_value(&self, element: ElementRef<'_>, property: &str) -> Option<String> {
        let mut best: Option<(CascadeKey, String)> = None;
        let mut order = 0usize;

        for rule in &self.rules {
            for decl in &rule.declarations {
                order += 1;
                if decl.property == property && rule.selector.matches(&element) {
                    keep_winner(
                        &mut best,
                        (decl.important, false, rule.specificity, order),
                        &decl.value,
                    );
                }
            }
        }

        if let Some(style) = element.value().attr("style") {
            for decl in parse_declarations(style) {
                order += 1;
                if decl.property == property {
                    keep_winner(&mut best, (decl.important, true, (0, 0, 0), order), &decl.value);
                }
            }
        }

        best.map(|(_, value)| value.to_ascii_lowercase())
    }
}

type CascadeKey = (bool, bool, Specificity, usize);

fn keep_winner(best: &mut Option<(CascadeKey, String)>, key: CascadeKey, value: &str) {
    if best.as_ref().map_or(true, |(current, _)| key >= *current) {
        *best = Some((key, value.to_string()));
    }
}

/// Splits a declaration block (or inline `style` attribute) into declarations.
#[must_use]
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|raw| {
            let (property, value) = raw.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }
            let value = value.trim();
            let (value, important) = match value.to_ascii_lowercase().rfind("!important") {
                Some(idx) => (value[..idx].trim(), true),
                None => (value, false),
            };
            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

/// Computes the specificity of a single compound/complex selector.
#[must_use]
pub fn specificity(selector: &str) -> Specificity {
    let (mut ids, mut classes, mut types) = (0, 0, 0);
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;
    let mut at_compound_start = true;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                ids += 1;
                i = skip_ident(&chars, i + 1);
                at_compound_start = false;
                continue;
            }
            '.' => {
                classes += 1;
                i = skip_ident(&chars, i + 1);
                at_compound_start = false;
                continue;
            }
            '[' => {
                classes += 1;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                at_compound_start = false;
            }
            ':' => {
                if chars.get(i + 1) == Some(&':') {
                    types += 1;
                    i += 1;
                } else {
                    classes += 1;
                }
                i = skip_ident(&chars, i + 1);
                if chars.get(i) == Some(&'(') {
                    let mut depth = 0;
                    while i < chars.len() {
                        match chars[i] {
                            '(' => depth += 1,
                            ')' => depth -= 1,
                            _ => {}
                        }
                        i += 1;
                        if depth == 0 {
                            break;
                        }
                    }
                }
                at_compound_start = false;
                continue;
            }
            ' ' | '>' | '+' | '~' | '\t' | '\n' => at_compound_start = true,
            '*' => at_compound_start = false,
            c if at_compound_start && (c.is_alphabetic() || c == '_' || c == '-') => {
                types += 1;
                i = skip_ident(&chars, i);
                at_compound_start = false;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    (ids, classes, types)
}

fn skip_ident(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '-' || chars[i] == '_') {
        i += 1;
    }
    i
}

/// Splits `input` on `separator`, ignoring separators inside quotes,
/// parentheses, or brackets.
#[must_use]
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Collects `(prelude, body)` pairs for every qualified rule, descending into
/// screen-applicable `@media` and `@supports` blocks.
fn collect_blocks(css: &str, out: &mut Vec<(String, String)>) {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    collect_from_parser(&mut parser, out);
}

fn collect_from_parser<'i>(parser: &mut Parser<'i, '_>, out: &mut Vec<(String, String)>) {
    loop {
        let start = parser.position();
        let mut is_block = false;
        let mut at_end = false;

        loop {
            match parser.next() {
                Ok(Token::CurlyBracketBlock) => {
                    is_block = true;
                    break;
                }
                Ok(Token::Semicolon) => break,
                Ok(_) => {}
                Err(_) => {
                    at_end = true;
                    break;
                }
            }
        }

        if is_block {
            let prelude = strip_comments(parser.slice_from(start).trim_end_matches('{'));
            let body = parser
                .parse_nested_block(|block| {
                    let inner = block.position();
                    while block.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<_, ParseError<'i, ()>>(block.slice_from(inner).to_string())
                })
                .unwrap_or_default();
            let body = body.trim_end_matches('}').to_string();

            if let Some(at_rule) = prelude.strip_prefix('@') {
                if at_rule_applies(at_rule) {
                    collect_blocks(&body, out);
                }
            } else {
                out.push((prelude, body));
            }
        }

        if at_end {
            break;
        }
    }
}

fn at_rule_applies(at_rule: &str) -> bool {
    let lower = at_rule.to_ascii_lowercase();
    if lower.starts_with("supports") {
        return true;
    }
    if let Some(query) = lower.strip_prefix("media") {
        let query = query.trim();
        let only_non_screen = (query.contains("print") || query.contains("speech"))
            && !query.contains("screen")
            && !query.contains("all");
        return !only_non_screen;
    }
    false
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(html: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn specificity_counts() {
        assert_eq!(specificity("p"), (0, 0, 1));
        assert_eq!(specificity("div p"), (0, 0, 2));
        assert_eq!(specificity(".a"), (0, 1, 0));
        assert_eq!(specificity("#x .a p"), (1, 1, 1));
        assert_eq!(specificity("a[href]:hover"), (0, 2, 1));
        assert_eq!(specificity("p::before"), (0, 0, 2));
    }

    #[test]
    fn declarations_parse_important() {
        let decls = parse_declarations("display: none !important; color:red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "display");
        assert_eq!(decls[0].value, "none");
        assert!(decls[0].important);
        assert!(!decls[1].important);
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(
            split_top_level(r#"a[title="x,y"], :is(b, c), d"#, ','),
            vec![r#"a[title="x,y"]"#, " :is(b, c)", " d"]
        );
    }

    #[test]
    fn more_specific_rule_wins() {
        let html = Html::parse_document(
            "<style>.hide { visibility: hidden } #keep.hide { visibility: visible }</style>\
             <p id=keep class=hide>x</p>",
        );
        let sheet = Stylesheet::from_html(&html);
        let p = first(&html, "p");
        assert_eq!(sheet.cascaded_value(p, "visibility").as_deref(), Some("visible"));
    }

    #[test]
    fn inline_beats_sheet_unless_important() {
        let html = Html::parse_document(
            "<style>p { display: none !important } span { display: none }</style>\
             <p style='display:block'>a</p><span style='display:inline'>b</span>",
        );
        let sheet = Stylesheet::from_html(&html);
        assert_eq!(sheet.cascaded_value(first(&html, "p"), "display").as_deref(), Some("none"));
        assert_eq!(sheet.cascaded_value(first(&html, "span"), "display").as_deref(), Some("inline"));
    }

    #[test]
    fn media_blocks_and_comments() {
        let sheet = Stylesheet::parse(
            "/* lead */ @media screen { .a { display: none } } \
             @media print { .b { display: none } } \
             @font-face { font-family: x; src: url(x.woff) } .c { color: red }",
        );
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn later_rule_wins_on_tie() {
        let html = Html::parse_document(
            "<style>p { text-align: left } p { text-align: justify }</style><p>x</p>",
        );
        let sheet = Stylesheet::from_html(&html);
        assert_eq!(
            sheet.cascaded_value(first(&html, "p"), "text-align").as_deref(),
            Some("justify")
        );
    }
}

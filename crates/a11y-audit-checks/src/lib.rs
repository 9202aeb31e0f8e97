//! # a11y-audit-checks
//!
//! Built-in accessibility checks and rules for a11y-audit.
//!
//! Checks are small [`FnCheck`] predicates returning pass, fail, or
//! inapplicable. Rules bind them to candidate selectors with a combination
//! mode and severity.
//!
//! ## Available Rules
//!
//! | Slug | Severity | Description |
//! |------|----------|-------------|
//! | `img_alt_missing` | error | Image or image input without `alt` |
//! | `img_alt_empty` | warning | `alt=""` without a caption |
//! | `img_alt_invalid` | warning | Boilerplate or file-name alt text |
//! | `img_alt_long` | warning | Alt text over `max_length` characters |
//! | `img_alt_redundant` | warning | Alt text repeating another image, link, title, or caption |
//! | `img_linked_alt_missing` | error | Sole image in a link without `alt` |
//! | `img_linked_alt_empty` | error | Sole image in a link with empty `alt` |
//! | `img_animated` | warning | Image verified to be animated |
//! | `empty_button` | error | Button without an accessible name |
//! | `empty_link` | error | Link without an accessible name |
//! | `empty_heading_tag` | error | Heading without text |
//! | `empty_table_header` | error | `th` without text |
//! | `broken_skip_anchor_link` | error | `href="#id"` with no target |
//! | `broken_aria_reference` | error | Dangling ARIA id reference |
//! | `missing_table_header` | error | Data cells without headers |
//! | `incorrect_heading_order` | error | Skipped heading level |
//! | `missing_headings` | warning | Long content without headings |
//! | `long_description_invalid` | warning | Unusable `longdesc` |
//! | `underlined_text` | warning | Underline outside links |
//! | `text_justified` | warning | Justified text |
//! | `link_blank` | warning | `target="_blank"` without warning |
//! | `link_text_url` | warning | Link text echoing its URL |
//! | `link_improper` | error | Anchor without usable `href` |
//! | `video_present` | warning | Video for manual review |
//! | `audio_present` | warning | Audio for manual review |
//! | `slider_present` | warning | Slider for manual review |
//! | `missing_transcript` | error | Media without a nearby transcript |
//! | `iframe_missing_title` | error | Iframe without a title |
//! | `missing_lang_attr` | error | Document without `lang` |
//!
//! ## Usage
//!
//! ```ignore
//! use a11y_audit_checks::{registry, Preset};
//! use a11y_audit_core::{Document, Engine};
//!
//! let mut engine = Engine::builder()
//!     .registry(registry(Preset::Recommended)?)
//!     .build();
//! let report = engine.scan(&Document::parse(html))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accessible_name;
pub mod alt_text;
pub mod animation;
mod catalog;
pub mod links;
pub mod media;
mod presets;
pub mod references;
pub mod structure;
pub mod styling;

#[cfg(test)]
mod test_support;

pub use catalog::{builtin_rule, BuiltinRule, BUILTIN_RULES};
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};

use a11y_audit_core::{CheckRegistry, FnCheck, RuleError, RuleRegistry};

/// Every library check, addressable by id from declarative rules.
pub const CHECKS: &[FnCheck] = &[
    accessible_name::HAS_ARIA_LABEL,
    accessible_name::HAS_ARIA_LABELLEDBY,
    accessible_name::HAS_VISIBLE_TEXT,
    accessible_name::HAS_TITLE,
    accessible_name::HAS_IMAGE_ALT,
    accessible_name::HAS_VALUE,
    accessible_name::HAS_ACCESSIBLE_NAME,
    alt_text::ALT_PRESENT,
    alt_text::ALT_NOT_EMPTY,
    alt_text::ALT_NOT_BOILERPLATE,
    alt_text::ALT_LENGTH,
    alt_text::ALT_NOT_REDUNDANT,
    alt_text::LINKED_ALT_PRESENT,
    alt_text::LINKED_ALT_NOT_EMPTY,
    animation::IMAGE_NOT_ANIMATED,
    structure::TABLE_HEADERS_COMPLETE,
    structure::HEADING_SEQUENTIAL,
    structure::LONG_CONTENT_HAS_HEADINGS,
    references::ARIA_REFERENCES_RESOLVE,
    references::ANCHOR_TARGET_EXISTS,
    links::NEW_WINDOW_WARNING,
    links::LINK_TEXT_NOT_URL,
    links::LINK_HAS_HREF,
    styling::LONGDESC_VALID,
    styling::NOT_UNDERLINED,
    styling::NOT_JUSTIFIED,
    styling::IFRAME_TITLE,
    styling::DOCUMENT_LANG,
    media::VIDEO_PRESENT,
    media::AUDIO_PRESENT,
    media::SLIDER_PRESENT,
    media::TRANSCRIPT_NEARBY,
    media::ELEMENT_PRESENT,
];

/// Returns a [`CheckRegistry`] holding every library check.
#[must_use]
pub fn check_library() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    for check in CHECKS {
        registry.register(*check);
    }
    registry
}

/// Returns a rule registry with the library checks and the rules of
/// `preset` registered.
///
/// # Errors
///
/// Returns a [`RuleError`] if a built-in definition fails validation.
pub fn registry(preset: Preset) -> Result<RuleRegistry, RuleError> {
    let mut registry = RuleRegistry::with_checks(check_library());
    for definition in preset.rules() {
        registry.register(definition)?;
    }
    Ok(registry)
}

/// Re-export core types for convenience.
pub use a11y_audit_core::{Check, Rule, Severity, Verdict, Violation};

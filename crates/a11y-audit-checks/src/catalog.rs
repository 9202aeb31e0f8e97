//! The built-in rule catalog.

use crate::accessible_name::{
    HAS_ACCESSIBLE_NAME, HAS_ARIA_LABEL, HAS_ARIA_LABELLEDBY, HAS_IMAGE_ALT, HAS_TITLE, HAS_VALUE,
    HAS_VISIBLE_TEXT,
};
use crate::alt_text::{
    ALT_LENGTH, ALT_NOT_BOILERPLATE, ALT_NOT_EMPTY, ALT_NOT_REDUNDANT, ALT_PRESENT,
    LINKED_ALT_NOT_EMPTY, LINKED_ALT_PRESENT,
};
use crate::animation::IMAGE_NOT_ANIMATED;
use crate::links::{LINK_HAS_HREF, LINK_TEXT_NOT_URL, NEW_WINDOW_WARNING};
use crate::media::{AUDIO_PRESENT, SLIDER_PRESENT, TRANSCRIPT_NEARBY, VIDEO_PRESENT};
use crate::references::{ANCHOR_TARGET_EXISTS, ARIA_REFERENCES_RESOLVE};
use crate::structure::{HEADING_SEQUENTIAL, LONG_CONTENT_HAS_HEADINGS, TABLE_HEADERS_COMPLETE};
use crate::styling::{DOCUMENT_LANG, IFRAME_TITLE, LONGDESC_VALID, NOT_JUSTIFIED, NOT_UNDERLINED};
use a11y_audit_core::{
    CombinationMode, FnCheck, RuleDefinition, RuleMetadata, Severity, VisibilityPolicy,
};
use std::collections::BTreeMap;

use CombinationMode::{AllMustPass as All, AnyMustPass as Any};
use Severity::{Error, Warning};
use VisibilityPolicy::{IncludeHidden, SkipHidden};

const BUTTONS: &[&str] = &[
    "button",
    "input[type=submit]",
    "input[type=button]",
    "input[type=reset]",
    "[role=button]",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "[role=heading]"];

const MEDIA: &[&str] = &["video", "audio", "iframe", "embed", "object"];

const NAME_SOURCES: &[FnCheck] = &[
    HAS_ARIA_LABEL,
    HAS_ARIA_LABELLEDBY,
    HAS_VISIBLE_TEXT,
    HAS_TITLE,
    HAS_IMAGE_ALT,
    HAS_VALUE,
];

/// A catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRule {
    /// Stable slug.
    pub slug: &'static str,
    /// Human title.
    pub title: &'static str,
    /// Remediation summary.
    pub help: &'static str,
    /// Candidate selectors.
    pub selectors: &'static [&'static str],
    /// Checks evaluated in order.
    pub checks: &'static [FnCheck],
    /// How check verdicts combine.
    pub mode: CombinationMode,
    /// Whether hidden candidates are skipped.
    pub visibility: VisibilityPolicy,
    /// Default severity.
    pub severity: Severity,
    /// Affected-user tags.
    pub tags: &'static [&'static str],
    /// WCAG success criterion.
    pub wcag: &'static str,
    /// Presence rules that always need manual review.
    pub advisory: bool,
}

impl BuiltinRule {
    /// Builds the rule definition for this entry.
    #[must_use]
    pub fn definition(&self) -> RuleDefinition {
        let metadata = RuleMetadata {
            title: Some(self.title.to_string()),
            help: Some(self.help.to_string()),
            tags: self.tags.iter().map(|t| (*t).to_string()).collect(),
            extra: BTreeMap::from([("wcag".to_string(), self.wcag.to_string())]),
        };
        let definition = self
            .selectors
            .iter()
            .fold(RuleDefinition::new(self.slug), |def, s| def.selector(*s));
        self.checks
            .iter()
            .fold(definition, |def, check| def.check(*check))
            .mode(self.mode)
            .visibility(self.visibility)
            .severity(self.severity)
            .metadata(metadata)
    }
}

const fn rule(
    slug: &'static str,
    title: &'static str,
    selectors: &'static [&'static str],
    checks: &'static [FnCheck],
    severity: Severity,
) -> BuiltinRule {
    BuiltinRule {
        slug,
        title,
        help: "",
        selectors,
        checks,
        mode: All,
        visibility: SkipHidden,
        severity,
        tags: &[],
        wcag: "",
        advisory: false,
    }
}

impl BuiltinRule {
    const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    const fn any(mut self) -> Self {
        self.mode = Any;
        self
    }

    const fn include_hidden(mut self) -> Self {
        self.visibility = IncludeHidden;
        self
    }

    const fn tags(mut self, tags: &'static [&'static str]) -> Self {
        self.tags = tags;
        self
    }

    const fn wcag(mut self, criterion: &'static str) -> Self {
        self.wcag = criterion;
        self
    }

    const fn advisory(mut self) -> Self {
        self.advisory = true;
        self
    }
}

/// Every built-in rule, in registration order.
pub const BUILTIN_RULES: &[BuiltinRule] = &[
    rule(
        "img_alt_missing",
        "Image Missing Alternative Text",
        &["img", "input[type=image]"],
        &[ALT_PRESENT],
        Error,
    )
    .help("Add an alt attribute describing the image, or alt=\"\" if it is decorative.")
    .tags(&["blind", "low-vision"])
    .wcag("1.1.1"),
    rule(
        "img_alt_empty",
        "Image Has Empty Alternative Text",
        &["img[alt]"],
        &[ALT_NOT_EMPTY],
        Warning,
    )
    .help("Confirm the image is decorative, or describe it in the alt attribute.")
    .tags(&["blind"])
    .wcag("1.1.1"),
    rule(
        "img_alt_invalid",
        "Low-quality Alternative Text",
        &["img[alt]"],
        &[ALT_NOT_BOILERPLATE],
        Warning,
    )
    .help("Describe the image content instead of its file name or type.")
    .tags(&["blind"])
    .wcag("1.1.1"),
    rule("img_alt_long", "Image Alternative Text Is Long", &["img[alt]"], &[ALT_LENGTH], Warning)
        .help("Shorten the alt text and move long descriptions into the page.")
        .tags(&["blind"])
        .wcag("1.1.1"),
    rule(
        "img_alt_redundant",
        "Duplicate Alternative Text",
        &["img[alt]"],
        &[ALT_NOT_REDUNDANT],
        Warning,
    )
    .help("Give each image unique alt text that does not repeat nearby text.")
    .tags(&["blind"])
    .wcag("1.1.1"),
    rule(
        "img_linked_alt_missing",
        "Linked Image Missing Alternative Text",
        &["a img"],
        &[LINKED_ALT_PRESENT],
        Error,
    )
    .help("Add alt text describing where the link goes.")
    .tags(&["blind"])
    .wcag("2.4.4"),
    rule(
        "img_linked_alt_empty",
        "Linked Image Has Empty Alternative Text",
        &["a img[alt]"],
        &[LINKED_ALT_NOT_EMPTY],
        Error,
    )
    .help("Describe the link destination in the image alt text.")
    .tags(&["blind"])
    .wcag("2.4.4"),
    rule("img_animated", "Animated Image", &["img[src]"], &[IMAGE_NOT_ANIMATED], Warning)
        .help("Provide a way to pause the animation or use a still image.")
        .tags(&["cognitive", "vestibular", "seizure"])
        .wcag("2.2.2"),
    rule("empty_button", "Empty Button", BUTTONS, NAME_SOURCES, Error)
        .any()
        .help("Give the button visible text, an aria-label, or an image with alt text.")
        .tags(&["blind", "mobility"])
        .wcag("4.1.2"),
    rule("empty_link", "Empty Link", &["a[href]"], NAME_SOURCES, Error)
        .any()
        .help("Give the link text that describes its destination.")
        .tags(&["blind", "mobility"])
        .wcag("2.4.4"),
    rule("empty_heading_tag", "Empty Heading Tag", HEADINGS, &[HAS_ACCESSIBLE_NAME], Error)
        .help("Remove the empty heading or give it text.")
        .tags(&["blind"])
        .wcag("1.3.1"),
    rule("empty_table_header", "Empty Table Header", &["th"], &[HAS_ACCESSIBLE_NAME], Error)
        .help("Label every header cell.")
        .tags(&["blind"])
        .wcag("1.3.1"),
    rule(
        "broken_skip_anchor_link",
        "Broken Skip or Anchor Link",
        &["a[href^='#']"],
        &[ANCHOR_TARGET_EXISTS],
        Error,
    )
    .help("Point the link at an element id that exists on the page.")
    .tags(&["blind", "mobility"])
    .wcag("2.4.1"),
    rule(
        "broken_aria_reference",
        "Broken ARIA Reference",
        &["[aria-labelledby]", "[aria-describedby]", "[aria-owns]"],
        &[ARIA_REFERENCES_RESOLVE],
        Error,
    )
    .include_hidden()
    .help("Make every referenced id exist and contain text.")
    .tags(&["blind"])
    .wcag("4.1.2"),
    rule(
        "missing_table_header",
        "Missing Table Header",
        &["table"],
        &[TABLE_HEADERS_COMPLETE],
        Error,
    )
    .help("Add th cells so every data cell has a header, or use headers/id pairs.")
    .tags(&["blind"])
    .wcag("1.3.1"),
    rule(
        "incorrect_heading_order",
        "Incorrect Heading Order",
        HEADINGS,
        &[HEADING_SEQUENTIAL],
        Error,
    )
    .help("Do not skip heading levels.")
    .tags(&["blind", "cognitive"])
    .wcag("1.3.1"),
    rule(
        "missing_headings",
        "No Heading Structure",
        &["body"],
        &[LONG_CONTENT_HAS_HEADINGS],
        Warning,
    )
    .help("Break long content into sections with headings.")
    .tags(&["blind", "cognitive"])
    .wcag("2.4.6"),
    rule(
        "long_description_invalid",
        "Long Description May Not Have Valid URL",
        &["img[longdesc]"],
        &[LONGDESC_VALID],
        Warning,
    )
    .include_hidden()
    .help("Point longdesc at a page describing the image.")
    .tags(&["blind"])
    .wcag("1.1.1"),
    rule("underlined_text", "Underlined Text", &["body *"], &[NOT_UNDERLINED], Warning)
        .help("Reserve underlines for links.")
        .tags(&["cognitive", "low-vision"])
        .wcag("1.3.1"),
    rule("text_justified", "Text Justified", &["body *"], &[NOT_JUSTIFIED], Warning)
        .help("Align text to one side instead of justifying it.")
        .tags(&["cognitive", "low-vision"])
        .wcag("1.4.8"),
    rule(
        "link_blank",
        "Link Opens New Window or Tab",
        &["a[target]"],
        &[NEW_WINDOW_WARNING],
        Warning,
    )
    .include_hidden()
    .help("Mention \"new window\" or \"new tab\" in the link text or label.")
    .tags(&["blind", "cognitive"])
    .wcag("3.2.5"),
    rule("link_text_url", "Link Text Is a URL", &["a[href]"], &[LINK_TEXT_NOT_URL], Warning)
        .help("Describe the link destination instead of repeating the URL.")
        .tags(&["blind", "cognitive"])
        .wcag("2.4.4"),
    rule("link_improper", "Improper Use of Link", &["a"], &[LINK_HAS_HREF], Error)
        .help("Use a button for actions, or give the link a real href.")
        .tags(&["blind", "mobility"])
        .wcag("4.1.2"),
    rule("video_present", "Video Present", MEDIA, &[VIDEO_PRESENT], Warning)
        .advisory()
        .help("Check that the video has captions and audio description.")
        .tags(&["deaf", "blind"])
        .wcag("1.2.2"),
    rule("audio_present", "Audio Present", MEDIA, &[AUDIO_PRESENT], Warning)
        .advisory()
        .help("Check that the audio has a text alternative.")
        .tags(&["deaf"])
        .wcag("1.2.1"),
    rule("slider_present", "Slider Present", &["body *"], &[SLIDER_PRESENT], Warning)
        .advisory()
        .help("Check the slider can be paused and operated by keyboard.")
        .tags(&["mobility", "cognitive", "blind"])
        .wcag("2.2.2"),
    rule(
        "missing_transcript",
        "Missing Transcript",
        &["video", "audio", "iframe", "embed", "object", "a[href]"],
        &[TRANSCRIPT_NEARBY],
        Error,
    )
    .help("Provide a transcript next to the media.")
    .tags(&["deaf", "deaf-blind"])
    .wcag("1.2.1"),
    rule("iframe_missing_title", "iFrame Missing Title", &["iframe"], &[IFRAME_TITLE], Error)
        .help("Describe the frame content in a title attribute.")
        .tags(&["blind"])
        .wcag("4.1.2"),
    rule("missing_lang_attr", "Missing Language Declaration", &["html"], &[DOCUMENT_LANG], Error)
        .include_hidden()
        .help("Add a lang attribute to the html element.")
        .tags(&["blind"])
        .wcag("3.1.1"),
];

/// Looks up a catalog entry by slug.
#[must_use]
pub fn builtin_rule(slug: &str) -> Option<&'static BuiltinRule> {
    BUILTIN_RULES.iter().find(|r| r.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_audit_core::{CheckRegistry, Rule};
    use std::collections::HashSet;

    #[test]
    fn every_builtin_rule_compiles() {
        for entry in BUILTIN_RULES {
            let rule = Rule::compile(entry.definition(), &CheckRegistry::new())
                .unwrap_or_else(|e| panic!("{}: {e}", entry.slug));
            assert_eq!(rule.severity(), entry.severity);
            assert_eq!(rule.metadata().title.as_deref(), Some(entry.title));
        }
    }

    #[test]
    fn slugs_are_unique() {
        let unique: HashSet<_> = BUILTIN_RULES.iter().map(|r| r.slug).collect();
        assert_eq!(unique.len(), BUILTIN_RULES.len());
        assert_eq!(BUILTIN_RULES.len(), 29);
    }

    #[test]
    fn only_img_animated_needs_the_pre_scan() {
        let needing: Vec<_> = BUILTIN_RULES
            .iter()
            .filter(|entry| {
                Rule::compile(entry.definition(), &CheckRegistry::new())
                    .unwrap()
                    .requires_animation_results()
            })
            .map(|entry| entry.slug)
            .collect();
        assert_eq!(needing, vec!["img_animated"]);
    }

    #[test]
    fn lookup_by_slug() {
        assert_eq!(builtin_rule("empty_button").map(|r| r.mode), Some(Any));
        assert!(builtin_rule("nope").is_none());
    }
}

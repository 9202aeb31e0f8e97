//! Image alternative-text checks.
//!
//! Missing and empty `alt` are separate checks: an image with no `alt`
//! attribute leaves screen readers guessing from the file name, while
//! `alt=""` explicitly marks the image as decorative.

use crate::accessible_name::{labelledby_text, name_from, NameSource};
use a11y_audit_core::utils::{
    closest, collapse_whitespace, is_aria_hidden, is_presentational, normalize_key,
};
use a11y_audit_core::{text_content, CheckError, ElementRef, FnCheck, ScanContext, Verdict};

/// Default upper bound on alt text length, in characters.
pub const DEFAULT_MAX_ALT_LENGTH: usize = 300;

/// Alt text consisting of exactly one of these words says nothing.
const BANNED_EXACT: &[&str] = &[
    "image", "img", "photo", "picture", "graphic", "photograph", "logo", "icon", "spacer",
    "placeholder", "untitled", "blank", "alt", "thumbnail", "banner",
];

/// Leading boilerplate.
const BANNED_PREFIXES: &[&str] = &[
    "image of",
    "an image of",
    "photo of",
    "a photo of",
    "picture of",
    "a picture of",
    "graphic of",
    "photograph of",
    "image:",
    "photo:",
    "picture:",
];

/// Trailing boilerplate words.
const BANNED_SUFFIXES: &[&str] = &[" image", " photo", " picture", " graphic", " photograph"];

/// File extensions that indicate a file name was used as alt text.
const FILE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp", ".tif", ".tiff", ".avif",
    ".apng", ".ico", ".heic",
];

/// Returns the reason `alt` is boilerplate, if it is.
#[must_use]
pub fn boilerplate_reason(alt: &str) -> Option<&'static str> {
    let key = normalize_key(alt);
    if key.is_empty() {
        return None;
    }
    if BANNED_EXACT.contains(&key.as_str()) {
        return Some("generic word");
    }
    if BANNED_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return Some("leading boilerplate");
    }
    if BANNED_SUFFIXES.iter().any(|s| key.ends_with(s)) {
        return Some("trailing boilerplate");
    }
    if FILE_EXTENSIONS.iter().any(|ext| key.contains(ext)) {
        return Some("file extension");
    }
    if key.contains('_') {
        return Some("file name");
    }
    None
}

/// Text of the caption of the nearest `<figure>` or WordPress caption
/// container.
fn caption_text(element: ElementRef<'_>) -> Option<String> {
    let container = closest(element, |el| {
        el.value().name() == "figure"
            || el
                .value()
                .classes()
                .any(|c| c == "wp-caption" || c == "wp-block-image")
    })?;
    let caption = container.descendants().filter_map(ElementRef::wrap).find(|el| {
        el.value().name() == "figcaption"
            || el.value().classes().any(|c| c == "wp-caption-text")
    })?;
    let text = collapse_whitespace(&text_content(caption));
    (!text.is_empty()).then_some(text)
}

fn nearest_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    closest(element, |el| el.value().name() == "a" && el.value().attr("href").is_some())
}

fn exempt(element: ElementRef<'_>) -> bool {
    is_presentational(element) || is_aria_hidden(element)
}

fn alt_present(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if exempt(element) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(element.value().attr("alt").is_some()))
}

fn alt_not_empty(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    let Some(alt) = element.value().attr("alt") else {
        return Ok(Verdict::Inapplicable);
    };
    if exempt(element) {
        return Ok(Verdict::Inapplicable);
    }
    if !alt.trim().is_empty() || caption_text(element).is_some() {
        return Ok(Verdict::Pass);
    }
    Ok(Verdict::Fail)
}

fn alt_not_boilerplate(
    element: ElementRef<'_>,
    _: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(alt) = element.value().attr("alt").filter(|a| !a.trim().is_empty()) else {
        return Ok(Verdict::Inapplicable);
    };
    if exempt(element) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(boilerplate_reason(alt).is_none()))
}

fn alt_length(element: ElementRef<'_>, ctx: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    let Some(alt) = element.value().attr("alt").filter(|a| !a.trim().is_empty()) else {
        return Ok(Verdict::Inapplicable);
    };
    if exempt(element) {
        return Ok(Verdict::Inapplicable);
    }
    let max = ctx.option_usize("max_length", DEFAULT_MAX_ALT_LENGTH)?;
    Ok(Verdict::from_pass(alt.trim().chars().count() <= max))
}

/// Flags the later of two images with the same alt text, and alt text
/// that repeats the surrounding link text, the image title, or the
/// figure caption.
fn alt_not_redundant(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(alt) = element.value().attr("alt").filter(|a| !a.trim().is_empty()) else {
        return Ok(Verdict::Inapplicable);
    };
    if exempt(element) {
        return Ok(Verdict::Inapplicable);
    }
    if ctx.alt_text().register(alt, element.id()) {
        return Ok(Verdict::Fail);
    }

    let key = normalize_key(alt);
    let echoes = |text: Option<String>| text.is_some_and(|t| normalize_key(&t) == key);

    let document = ctx.document();
    if echoes(nearest_link(element).and_then(|a| name_from(NameSource::VisibleText, a, document))) {
        return Ok(Verdict::Fail);
    }
    if echoes(element.value().attr("title").map(str::to_string)) || echoes(caption_text(element)) {
        return Ok(Verdict::Fail);
    }
    Ok(Verdict::Pass)
}

/// True when the link around `element` is named by something other than
/// its images.
fn link_named_elsewhere(link: ElementRef<'_>, ctx: &ScanContext<'_>) -> bool {
    let document = ctx.document();
    name_from(NameSource::AriaLabel, link, document).is_some()
        || labelledby_text(link, document).is_some()
        || name_from(NameSource::VisibleText, link, document).is_some()
}

fn linked_alt_present(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(link) = nearest_link(element) else {
        return Ok(Verdict::Inapplicable);
    };
    if link_named_elsewhere(link, ctx) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(element.value().attr("alt").is_some()))
}

fn linked_alt_not_empty(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let (Some(link), Some(alt)) = (nearest_link(element), element.value().attr("alt")) else {
        return Ok(Verdict::Inapplicable);
    };
    if link_named_elsewhere(link, ctx) {
        return Ok(Verdict::Inapplicable);
    }
    if !alt.trim().is_empty() {
        return Ok(Verdict::Pass);
    }
    // Another image in the same link may carry the name.
    Ok(Verdict::from_pass(
        name_from(NameSource::ImageAlt, link, ctx.document()).is_some(),
    ))
}

/// `alt` attribute is present.
pub const ALT_PRESENT: FnCheck =
    FnCheck::new("alt_present", "Image has an alt attribute", alt_present);

/// `alt` is not empty, unless a caption describes the image.
pub const ALT_NOT_EMPTY: FnCheck = FnCheck::new(
    "alt_not_empty",
    "Image alt is not empty unless captioned",
    alt_not_empty,
);

/// `alt` is not a placeholder, filename, or boilerplate phrase.
pub const ALT_NOT_BOILERPLATE: FnCheck = FnCheck::new(
    "alt_not_boilerplate",
    "Image alt is not boilerplate or a file name",
    alt_not_boilerplate,
);

/// `alt` is at most `max_length` characters (default 300).
pub const ALT_LENGTH: FnCheck = FnCheck::new(
    "alt_length",
    "Image alt does not exceed max_length characters",
    alt_length,
);

/// `alt` does not duplicate other nearby text.
pub const ALT_NOT_REDUNDANT: FnCheck = FnCheck::new(
    "alt_not_redundant",
    "Image alt does not repeat another image, link text, title, or caption",
    alt_not_redundant,
);

/// Linked image without other link text has `alt`.
pub const LINKED_ALT_PRESENT: FnCheck = FnCheck::new(
    "linked_alt_present",
    "Image that names its link has an alt attribute",
    linked_alt_present,
);

/// Linked image without other link text has non-empty `alt`.
pub const LINKED_ALT_NOT_EMPTY: FnCheck = FnCheck::new(
    "linked_alt_not_empty",
    "Image that names its link has non-empty alt",
    linked_alt_not_empty,
);

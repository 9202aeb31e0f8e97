//! Media-presence checks and the transcript-proximity check.
//!
//! Presence checks are advisory: a match always fails so that a person
//! reviews captions, audio description, and motion controls by hand.

use a11y_audit_core::utils::closest;
use a11y_audit_core::{text_content, CheckError, ElementRef, FnCheck, ScanContext, Verdict};

/// Hosts whose embeds carry video.
pub const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "dai.ly",
    "wistia.com",
    "wistia.net",
    "ted.com",
    "twitch.tv",
    "loom.com",
    "facebook.com/plugins/video",
];

/// Hosts whose embeds carry audio.
pub const AUDIO_HOSTS: &[&str] = &[
    "soundcloud.com",
    "open.spotify.com",
    "mixcloud.com",
    "bandcamp.com",
    "podbean.com",
    "anchor.fm",
    "simplecast.com",
    "buzzsprout.com",
];

/// Linked file extensions that are audio or video.
const MEDIA_EXTENSIONS: &[&str] = &[
    ".mp3", ".wav", ".ogg", ".oga", ".m4a", ".aac", ".flac", ".mp4", ".m4v", ".mov", ".webm",
    ".avi", ".wmv", ".mkv", ".ogv",
];

/// Class-name substrings that mark slider and carousel widgets.
pub const SLIDER_CLASS_VOCABULARY: &[&str] = &[
    "slider",
    "carousel",
    "slideshow",
    "swiper",
    "slick",
    "flexslider",
    "glide",
    "splide",
    "flickity",
    "bxslider",
    "cycle-slideshow",
    "royalslider",
    "rev_slider",
    "metaslider",
];

/// Data attributes whose value is matched against the slider vocabulary.
const SLIDER_DATA_ATTRIBUTES: &[&str] = &[
    "data-ride",
    "data-slick",
    "data-flickity",
    "data-cycle-fx",
    "data-swiper",
    "data-glide",
    "data-plugin",
    "data-widget",
    "data-component",
];

/// Data attributes that mark a slider by presence alone.
const SLIDER_MARKER_ATTRIBUTES: &[&str] = &["data-slick", "data-flickity", "data-cycle-fx"];

/// Word searched for near media.
const TRANSCRIPT_WORD: &str = "transcript";

/// How many ancestor levels the transcript search climbs. The search
/// never reaches `<body>`.
const TRANSCRIPT_SEARCH_DEPTH: usize = 3;

fn embed_source(element: ElementRef<'_>) -> Option<String> {
    match element.value().name() {
        "iframe" | "embed" => element.value().attr("src"),
        "object" => element.value().attr("data"),
        _ => None,
    }
    .map(str::to_lowercase)
}

fn embeds_from(element: ElementRef<'_>, hosts: &[&str]) -> bool {
    embed_source(element).is_some_and(|src| hosts.iter().any(|h| src.contains(h)))
}

/// Returns true for `<video>` and video-host embeds.
#[must_use]
pub fn is_video(element: ElementRef<'_>) -> bool {
    element.value().name() == "video" || embeds_from(element, VIDEO_HOSTS)
}

/// Returns true for `<audio>` and audio-host embeds.
#[must_use]
pub fn is_audio(element: ElementRef<'_>) -> bool {
    element.value().name() == "audio" || embeds_from(element, AUDIO_HOSTS)
}

fn links_to_media(element: ElementRef<'_>) -> bool {
    if element.value().name() != "a" {
        return false;
    }
    element.value().attr("href").is_some_and(|href| {
        let href = href.to_lowercase();
        let path = href.split(['?', '#']).next().unwrap_or_default();
        MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    })
}

/// Returns true if the element's own markup identifies a slider.
#[must_use]
pub fn has_slider_markup(element: ElementRef<'_>) -> bool {
    let el = element.value();
    let matches_vocabulary =
        |value: &str| SLIDER_CLASS_VOCABULARY.iter().any(|word| value.contains(word));

    if el.classes().any(|c| matches_vocabulary(&c.to_lowercase())) {
        return true;
    }
    if SLIDER_MARKER_ATTRIBUTES.iter().any(|a| el.attr(a).is_some()) {
        return true;
    }
    SLIDER_DATA_ATTRIBUTES
        .iter()
        .filter_map(|a| el.attr(a))
        .any(|value| matches_vocabulary(&value.to_lowercase()))
}

fn video_present(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    Ok(if is_video(element) { Verdict::Fail } else { Verdict::Inapplicable })
}

fn audio_present(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    Ok(if is_audio(element) { Verdict::Fail } else { Verdict::Inapplicable })
}

/// Only the outermost element of a slider is reported.
fn slider_present(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if !has_slider_markup(element) || closest(element, has_slider_markup).is_some() {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::Fail)
}

fn transcript_nearby(
    element: ElementRef<'_>,
    _: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    if !(is_video(element) || is_audio(element) || links_to_media(element)) {
        return Ok(Verdict::Inapplicable);
    }
    let found = std::iter::once(element)
        .chain(
            element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|el| !matches!(el.value().name(), "body" | "html"))
                .take(TRANSCRIPT_SEARCH_DEPTH),
        )
        .any(|scope| text_content(scope).to_lowercase().contains(TRANSCRIPT_WORD));
    Ok(Verdict::from_pass(found))
}

fn element_present(_: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    Ok(Verdict::Fail)
}

/// Advisory: video needs captions and audio description.
pub const VIDEO_PRESENT: FnCheck = FnCheck::new(
    "video_present",
    "Flags video elements and video-host embeds for manual review",
    video_present,
);

/// Advisory: audio needs a text alternative.
pub const AUDIO_PRESENT: FnCheck = FnCheck::new(
    "audio_present",
    "Flags audio elements and audio-host embeds for manual review",
    audio_present,
);

/// Advisory: sliders need pause controls and keyboard support.
pub const SLIDER_PRESENT: FnCheck = FnCheck::new(
    "slider_present",
    "Flags the outermost element of slider or carousel markup",
    slider_present,
);

/// Media has the word "transcript" close by.
pub const TRANSCRIPT_NEARBY: FnCheck = FnCheck::new(
    "transcript_nearby",
    "Audio, video, or linked media has a transcript nearby",
    transcript_nearby,
);

/// Fails for every candidate; pairs with a selector to flag elements by
/// presence.
pub const ELEMENT_PRESENT: FnCheck = FnCheck::new(
    "element_present",
    "Flags every element the rule selects",
    element_present,
);

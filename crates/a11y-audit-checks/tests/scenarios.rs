//! End-to-end scans of the built-in catalog against inline documents.

use a11y_audit_checks::{registry, Preset};
use a11y_audit_core::verifier::{FetchError, ResourceFetcher};
use a11y_audit_core::{
    AnimationResults, AnimationVerifier, Document, Engine, RuleDefinition, ScanError, ScanReport,
    ScanRequest, Severity,
};
use image::codecs::gif::GifEncoder;
use image::{Frame, Rgba, RgbaImage};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

fn engine() -> Engine {
    Engine::builder()
        .registry(registry(Preset::Strict).expect("built-in rules register"))
        .build()
}

fn scan_rules(html: &str, rules: &[&str]) -> ScanReport {
    let document = Document::parse(html);
    let results = AnimationResults::unverified();
    let request = ScanRequest::new()
        .rules(rules.iter().copied())
        .animations(&results);
    engine().run_scan(&document, &request).expect("scan succeeds")
}

fn rule_hits(report: &ScanReport) -> Vec<(&str, &str)> {
    report
        .violations
        .iter()
        .map(|v| (v.rule.as_str(), v.location.path.as_str()))
        .collect()
}

#[test]
fn boilerplate_alt_is_invalid() {
    let report = scan_rules(
        r#"<img src="x.jpg" alt="image of a cat">"#,
        &["img_alt_invalid", "img_alt_missing"],
    );
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule, "img_alt_invalid");
    assert_eq!(report.violations[0].severity, Severity::Warning);
}

#[test]
fn captioned_empty_alt_passes() {
    let report = scan_rules(
        r#"<figure><img src="x.jpg" alt=""><figcaption>Cat</figcaption></figure>
           <img src="y.jpg" alt="">"#,
        &["img_alt_empty"],
    );
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].location.snippet.contains("y.jpg"));
}

#[test]
fn dangling_fragment_link_is_broken() {
    let report = scan_rules(
        r##"<a href="#missing">go</a><a href="#here">ok</a><h2 id="here">Here</h2>"##,
        &["broken_skip_anchor_link"],
    );
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].location.snippet.contains("#missing"));
}

#[test]
fn labelled_empty_button_passes() {
    let report = scan_rules(
        r#"<button aria-label="Submit"></button><button></button><button> - </button>"#,
        &["empty_button"],
    );
    assert_eq!(report.violations.len(), 2);
    assert!(report.violations.iter().all(|v| v.severity == Severity::Error));
    assert_eq!(
        report.violations[0].failed_checks,
        vec![
            "has_aria_label",
            "has_aria_labelledby",
            "has_visible_text",
            "has_title",
            "has_image_alt"
        ]
    );
}

#[test]
fn aria_hidden_candidates_are_skipped() {
    let report = scan_rules(
        r#"<div aria-hidden="true"><a href="/x"></a></div><a href="/y" aria-hidden="true"></a>"#,
        &["empty_link"],
    );
    // The inner link is not itself aria-hidden, so only the second is skipped.
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.skipped_hidden, 1);
}

#[test]
fn duplicate_alt_flags_second_occurrence() {
    let report = scan_rules(
        r#"<img src="a.png" alt="Team photo 2024"><p><img src="b.png" alt=" team PHOTO 2024"></p>"#,
        &["img_alt_redundant"],
    );
    assert_eq!(rule_hits(&report), vec![("img_alt_redundant", "html > body > p > img")]);
}

#[test]
fn custom_rule_reusing_redundancy_check_flags_only_the_later_image() {
    let mut rules = registry(Preset::Strict).unwrap();
    rules
        .register(
            RuleDefinition::new("dup_alt_again")
                .selector("img[alt]")
                .check_id("alt_not_redundant"),
        )
        .unwrap();
    let mut engine = Engine::builder().registry(rules).build();

    let document = Document::parse(r#"<img alt="Cat"><img alt="cat">"#);
    let results = AnimationResults::unverified();
    let request = ScanRequest::new()
        .rules(["img_alt_redundant", "dup_alt_again"])
        .animations(&results);
    let report = engine.run_scan(&document, &request).unwrap();

    let second = "html > body > img:nth-of-type(2)";
    assert_eq!(
        rule_hits(&report),
        vec![("img_alt_redundant", second), ("dup_alt_again", second)]
    );
}

#[test]
fn new_window_warning_vocabulary() {
    let report = scan_rules(
        r#"<a href="/a" target="_blank">Docs (opens in new tab)</a>
           <a href="/b" target="_blank">Docs</a>"#,
        &["link_blank"],
    );
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].location.snippet.contains("/b"));
}

#[test]
fn table_headers_with_spans() {
    let report = scan_rules(
        r#"<table id="ok">
             <tr><th colspan="2">Totals</th></tr>
             <tr><td>1</td><td>2</td></tr>
           </table>
           <table id="bad">
             <tr><th>Name</th></tr>
             <tr><td>Ann</td><td>30</td></tr>
           </table>"#,
        &["missing_table_header"],
    );
    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].location.snippet.contains(r#"id="bad""#));
}

#[test]
fn violations_follow_rule_then_document_order() {
    let html = r#"<html><body>
        <img src="a.png"><a href="/"></a><img src="b.png">
    </body></html>"#;
    let report = scan_rules(html, &["empty_link", "img_alt_missing"]);
    let rules: Vec<_> = report.violations.iter().map(|v| v.rule.as_str()).collect();
    // Rules run in catalog order: img_alt_missing precedes empty_link.
    assert_eq!(rules, vec!["img_alt_missing", "img_alt_missing", "empty_link"]);
}

#[test]
fn repeated_scans_are_identical() {
    let html = r##"<html><body>
        <img src="a.png" alt="logo"><img src="b.png" alt="Logo">
        <a href="#nowhere">x</a><h1>T</h1><h3>S</h3>
        <p style="text-align: justify">text</p>
    </body></html>"##;
    let document = Document::parse(html);
    let results = AnimationResults::unverified();
    let request = ScanRequest::new().animations(&results);
    let mut engine = engine();

    let first = engine.run_scan(&document, &request).unwrap();
    let second = engine.run_scan(&document, &request).unwrap();
    assert!(!first.violations.is_empty());
    assert_eq!(rule_hits(&first), rule_hits(&second));
    assert!(first.failing_rules().contains(&"img_alt_redundant"));
    assert!(first.failing_rules().contains(&"incorrect_heading_order"));
    assert!(first.failing_rules().contains(&"missing_lang_attr"));
}

#[test]
fn animated_rule_requires_pre_scan() {
    let document = Document::parse(r#"<img src="https://cdn.test/a.gif" alt="spinner">"#);
    let err = engine().scan(&document).unwrap_err();
    assert!(matches!(err, ScanError::MissingAnimationResults { ref rule } if rule == "img_animated"));
}

struct Fixture(HashMap<&'static str, Vec<u8>>);

impl ResourceFetcher for Fixture {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.0.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn animated_gif() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .encode_frames((0..3u8).map(|i| {
                Frame::new(RgbaImage::from_pixel(1, 1, Rgba([i * 80, 0, 0, 255])))
            }))
            .unwrap();
    }
    buf
}

#[tokio::test]
async fn animated_image_flagged_and_unreachable_image_not() {
    let verifier =
        AnimationVerifier::with_fetcher(Fixture(HashMap::from([("https://cdn.test/spin.gif", animated_gif())])));
    let document = Document::parse(
        r#"<img src="spin.gif" alt="Loading"><img src="missing.gif" alt="Broken">"#,
    )
    .with_base_url(Url::parse("https://cdn.test/").unwrap());

    let results = verifier.pre_scan(&document, Duration::from_secs(2)).await;
    let request = ScanRequest::new().rules(["img_animated"]).animations(&results);
    let report = engine().run_scan(&document, &request).unwrap();

    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].location.snippet.contains("spin.gif"));
}

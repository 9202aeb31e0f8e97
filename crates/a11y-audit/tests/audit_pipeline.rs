//! Config-to-report runs through [`Auditor`], including the HTTP pre-scan.

use a11y_audit::{AuditError, Auditor, Severity};
use image::codecs::gif::GifEncoder;
use image::{Frame, Rgba, RgbaImage};

fn gif(frames: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .encode_frames((0..frames).map(|i| {
                Frame::new(RgbaImage::from_pixel(2, 2, Rgba([i * 60, 0, 0, 255])))
            }))
            .unwrap();
    }
    buf
}

const PAGE: &str = r#"<html lang="en"><body>
<h1>Cats</h1>
<img src="dance.gif" alt="A cat dancing">
<img src="nap.gif" alt="A cat napping">
<marquee>Sale!</marquee>
</body></html>"#;

#[tokio::test]
async fn animated_gif_is_flagged_after_pre_scan() {
    let mut server = mockito::Server::new_async().await;
    let dance = server
        .mock("GET", "/dance.gif")
        .with_status(200)
        .with_body(gif(3))
        .expect(1)
        .create_async()
        .await;
    let nap = server
        .mock("GET", "/nap.gif")
        .with_status(200)
        .with_body(gif(1))
        .expect(1)
        .create_async()
        .await;

    let toml = format!(
        "[scan]\nbase_url = \"{}/\"\nanimation_timeout_ms = 2000\n",
        server.url()
    );
    let mut auditor = Auditor::from_toml(&toml).unwrap();
    let document = auditor.document(PAGE);
    let report = auditor.audit(&document).await.unwrap();

    let animated: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.rule == "img_animated")
        .map(|v| v.location.snippet.as_str())
        .collect();
    assert_eq!(animated.len(), 1);
    assert!(animated[0].contains("dance.gif"));

    // A second audit reuses the verifier cache.
    let report = auditor.audit(&document).await.unwrap();
    assert_eq!(report.by_rule("img_animated").len(), 1);
    dance.assert_async().await;
    nap.assert_async().await;
}

#[tokio::test]
async fn custom_rules_and_overrides_apply() {
    let toml = r#"
preset = "minimal"
fail_on = "warning"

[scan]
fetch_remote = false

[rules.missing_lang_attr]
enabled = false

[[custom-rule]]
slug = "no_marquee"
selectors = ["marquee"]
checks = ["element_present"]
severity = "warning"
title = "Marquee element"
"#;
    let mut auditor = Auditor::from_toml(toml).unwrap();
    assert_eq!(auditor.fail_on(), Severity::Warning);

    let document = auditor.document(r#"<html><body><marquee>Hi</marquee></body></html>"#);
    let report = auditor.audit(&document).await.unwrap();

    let rules: Vec<_> = report.violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, vec!["no_marquee"]);
    assert!(report.has_violations_at(auditor.fail_on()));
}

#[test]
fn unknown_preset_is_a_configuration_error() {
    let err = Auditor::from_toml("preset = \"lenient\"").unwrap_err();
    assert!(matches!(err, AuditError::Preset(_)));
}

#[test]
fn malformed_custom_rule_is_reported() {
    let err = Auditor::from_toml(
        "[scan]\nfetch_remote = false\n[[custom-rule]]\nslug = \"x\"\nselectors = [\"div\"]\nchecks = [\"no_such_check\"]\n",
    )
    .unwrap_err();
    assert!(matches!(err, AuditError::CustomRules(_)));
}

#[test]
fn offline_audit_never_flags_animation() {
    let mut auditor = Auditor::from_toml("preset = \"strict\"\n[scan]\nfetch_remote = false\n").unwrap();
    let document = auditor.document(PAGE);
    let report = auditor.audit_offline(&document).unwrap();
    assert!(report.by_rule("img_animated").is_empty());
    assert!(report.rules_run > 0);
}

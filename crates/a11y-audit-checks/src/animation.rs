//! Animated-image check, backed by the asynchronous pre-scan.
//!
//! The check cannot run until [`AnimationVerifier::pre_scan`] has resolved;
//! the engine refuses a scan that selects it without results.
//!
//! [`AnimationVerifier::pre_scan`]: a11y_audit_core::AnimationVerifier::pre_scan

use a11y_audit_core::{CheckError, ElementRef, FnCheck, Requirement, ScanContext, Verdict};

fn image_not_animated(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(src) = element.value().attr("src") else {
        return Ok(Verdict::Inapplicable);
    };
    let results = ctx.animations()?;
    let base = ctx.document().base_url();
    Ok(Verdict::from_pass(!results.is_animated(src, base)))
}

/// Image was not verified as animated. Unverifiable images pass.
pub const IMAGE_NOT_ANIMATED: FnCheck = FnCheck::new(
    "image_not_animated",
    "Image was not verified to contain more than one frame",
    image_not_animated,
)
.requiring(Requirement::AnimationResults);

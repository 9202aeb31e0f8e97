//! List rules command implementation.

use a11y_audit::rules::{Preset, BUILTIN_RULES, CHECKS};
use a11y_audit::Check;

/// Runs the list-rules command.
pub fn run(with_checks: bool) {
    println!("Available rules:\n");
    println!("{:<26} {:<8} {:<7} {:<13} Title", "Slug", "Severity", "WCAG", "Presets");
    println!("{}", "-".repeat(96));

    for rule in BUILTIN_RULES {
        println!(
            "{:<26} {:<8} {:<7} {:<13} {}",
            rule.slug,
            rule.severity.to_string(),
            rule.wcag,
            presets_of(rule),
            rule.title
        );
    }

    println!("\nPresets:");
    println!("  recommended  - every rule except advisory presence checks (default)");
    println!("  strict       - every rule");
    println!("  minimal      - error-severity rules only (for gradual adoption)");

    if with_checks {
        println!("\nChecks usable in [[custom-rule]] sections:\n");
        let mut checks: Vec<_> = CHECKS.iter().collect();
        checks.sort_by_key(|c| c.id());
        for check in checks {
            println!("  {:<28} {}", check.id(), check.description());
        }
    }

    println!("\nUse --rules to run specific rules, e.g.:");
    println!("  a11y-audit check --rules img_alt_missing,empty_link site/");
}

/// Short preset membership marker, e.g. `R S M`.
fn presets_of(rule: &a11y_audit::rules::BuiltinRule) -> String {
    [
        (Preset::Recommended, "R"),
        (Preset::Strict, "S"),
        (Preset::Minimal, "M"),
    ]
    .iter()
    .filter(|(preset, _)| preset.includes(rule))
    .map(|(_, mark)| *mark)
    .collect::<Vec<_>>()
    .join(" ")
}

//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_FILE_NAME: &str = "a11y-audit.toml";

const DEFAULT_CONFIG: &str = r#"# a11y-audit configuration

# recommended (default), strict or minimal
preset = "recommended"

# Lowest severity that makes `a11y-audit check` exit non-zero
fail_on = "error"

[scan]
# Relative image sources resolve against this URL for the animated-image check
# base_url = "https://example.com/"

# Fetch images to detect animation; disable for offline runs
fetch_remote = true
animation_timeout_ms = 5000

# Per-rule settings: enabled, severity, and rule options

[rules.img_alt_long]
max_length = 300

[rules.missing_headings]
min_words = 400

# [rules.slider_present]
# enabled = false

# [rules.link_blank]
# severity = "info"

# Site-specific rules built from named checks (see `a11y-audit list-rules --checks`)
# [[custom-rule]]
# slug = "icon_button_label"
# selectors = ["button.icon"]
# checks = ["has_aria_label", "has_title"]
# mode = "any"
# severity = "error"
# title = "Icon button without a label"
"#;

/// Writes a starter config into `dir`.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or on I/O
/// failure.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to choose a preset and tune rules");
    println!("  2. Run: a11y-audit check path/to/site");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_audit::Auditor;
    use tempfile::TempDir;

    #[test]
    fn starter_config_builds_an_auditor() {
        let auditor = Auditor::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(auditor.fail_on(), a11y_audit::Severity::Error);
        let config = auditor.engine().config();
        assert_eq!(config.rule_config("img_alt_long").unwrap().get_int("max_length", 0), 300);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();
        assert!(run(tmp.path(), false).is_err());
        run(tmp.path(), true).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(CONFIG_FILE_NAME)).unwrap(),
            DEFAULT_CONFIG
        );
    }
}

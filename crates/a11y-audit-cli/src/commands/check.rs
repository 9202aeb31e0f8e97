//! Check command implementation.

use a11y_audit::{Auditor, ScanReport};
use anyhow::{Context, Result};
use clap::Args;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use super::output::{self, FileReport};
use crate::config_resolver::{self, LoadedConfig};
use crate::OutputFormat;

/// Arguments of `a11y-audit check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// HTML file or directory to audit (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Only run specific rules (comma-separated slugs)
    #[arg(long)]
    pub rules: Option<String>,

    /// Preset: recommended, strict or minimal
    #[arg(long)]
    pub preset: Option<String>,

    /// Base URL that relative image sources resolve against
    #[arg(long, env = "A11Y_AUDIT_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-image fetch timeout for the animated-image pre-scan
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Skip fetching images; nothing is reported as animated
    #[arg(long)]
    pub no_fetch: bool,

    /// Minimum severity that makes the command fail
    #[arg(long)]
    pub fail_on: Option<String>,
}

/// Runs the check command. Returns `false` if any file has violations at
/// or above the failure threshold.
///
/// # Errors
///
/// Returns an error for unusable configuration or unreadable files.
pub async fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<bool> {
    let loaded = config_resolver::load(config_resolver::resolve(&args.path, config_path))?;
    let mut auditor = build_auditor(args, loaded)?;

    let files = collect_html_files(&args.path)?;
    tracing::info!(
        "Auditing {} file(s) under {:?} with the {} preset",
        files.len(),
        args.path,
        auditor.preset()
    );

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let html = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let document = auditor.document(&html);
        let report: ScanReport = auditor
            .audit(&document)
            .await
            .with_context(|| format!("Audit failed: {}", file.display()))?;
        reports.push(FileReport { file, report });
    }

    output::print(&reports, args.format)?;

    let fail_on = auditor.fail_on();
    Ok(!reports.iter().any(|r| r.report.has_violations_at(fail_on)))
}

/// Applies command-line overrides on top of the loaded config.
fn build_auditor(args: &CheckArgs, loaded: LoadedConfig) -> Result<Auditor> {
    let LoadedConfig {
        mut config,
        content,
        source,
    } = loaded;
    tracing::debug!(?source, "configuration resolved");

    if let Some(base_url) = &args.base_url {
        config.scan.base_url = Some(base_url.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.scan.animation_timeout_ms = timeout_ms;
    }
    if args.no_fetch {
        config.scan.fetch_remote = false;
    }
    if let Some(fail_on) = &args.fail_on {
        config.fail_on = Some(fail_on.clone());
    }

    let auditor = Auditor::new(config, &content, args.preset.as_deref())
        .context("Failed to configure auditor")?;
    Ok(match &args.rules {
        Some(filter) => auditor.only_rules(
            filter
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        ),
        None => auditor,
    })
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// HTML files under `root`, sorted, honouring `.gitignore`.
fn collect_html_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = entry.context("Failed to walk directory")?;
        if entry.file_type().is_some_and(|t| t.is_file()) && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_resolver::ConfigSource;
    use a11y_audit::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn args(path: &Path) -> CheckArgs {
        CheckArgs {
            path: path.to_path_buf(),
            format: OutputFormat::Compact,
            rules: None,
            preset: None,
            base_url: None,
            timeout_ms: None,
            no_fetch: true,
            fail_on: None,
        }
    }

    fn defaults() -> LoadedConfig {
        LoadedConfig {
            config: a11y_audit::Config::default(),
            content: String::new(),
            source: ConfigSource::Default,
        }
    }

    #[test]
    fn collects_only_html_files_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("blog")).unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        fs::write(tmp.path().join("blog/post.HTM"), "").unwrap();
        fs::write(tmp.path().join("style.css"), "").unwrap();

        let files = collect_html_files(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("blog/post.HTM"), PathBuf::from("index.html")]
        );
    }

    #[test]
    fn single_file_is_audited_directly() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("page.xhtml");
        fs::write(&file, "").unwrap();
        assert_eq!(collect_html_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn flags_override_config() {
        let mut a = args(Path::new("."));
        a.fail_on = Some("warning".to_string());
        a.preset = Some("minimal".to_string());
        let auditor = build_auditor(&a, defaults()).unwrap();
        assert_eq!(auditor.fail_on(), Severity::Warning);
        assert_eq!(auditor.preset(), a11y_audit::rules::Preset::Minimal);
        assert!(!auditor.engine().config().scan.fetch_remote);
    }

    #[test]
    fn rule_filter_limits_pre_scan() {
        let mut a = args(Path::new("."));
        a.rules = Some("img_alt_missing, empty_link".to_string());
        let auditor = build_auditor(&a, defaults()).unwrap();
        assert!(!auditor.needs_pre_scan());
    }

    #[test]
    fn bad_preset_is_an_error() {
        let mut a = args(Path::new("."));
        a.preset = Some("loose".to_string());
        assert!(build_auditor(&a, defaults()).is_err());
    }

    #[tokio::test]
    async fn failing_page_fails_the_run() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("ok.html"),
            r#"<html lang="en"><body><h1>Fine</h1></body></html>"#,
        )
        .unwrap();
        let a = args(tmp.path());
        assert!(run(&a, None).await.unwrap());

        fs::write(
            tmp.path().join("bad.html"),
            r#"<html lang="en"><body><img src="x.png"></body></html>"#,
        )
        .unwrap();
        assert!(!run(&a, None).await.unwrap());
    }
}

//! # a11y-audit
//!
//! Rule-based accessibility auditing for HTML documents.
//!
//! This is the main facade crate that re-exports the core engine and the
//! built-in checks, and provides [`Auditor`] to run the whole pipeline:
//!
//! ```text
//! a11y-audit.toml → Config + preset + [[custom-rule]]s → RuleRegistry
//! HTML → Document → AnimationVerifier::pre_scan → Engine::run_scan → ScanReport
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use a11y_audit::Auditor;
//!
//! let mut auditor = Auditor::from_toml(r#"preset = "strict""#)?;
//! let document = auditor.document(html);
//! let report = auditor.audit(&document).await?;
//! println!("{}", report.format_test_report(auditor.fail_on()));
//! ```
//!
//! ## `cargo test` Integration
//!
//! ```rust,ignore
//! #[test]
//! fn landing_page_is_accessible() {
//!     a11y_audit::assert_accessible(include_str!("../site/index.html"), "recommended");
//! }
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use a11y_audit_core::*;

/// Built-in checks, rules and presets.
pub mod rules {
    pub use a11y_audit_checks::*;
}

mod runner;

pub use runner::{assert_accessible, AuditError, Auditor};

//! # a11y-audit-core
//!
//! Core framework for rule-based accessibility auditing of HTML documents.
//!
//! This crate provides the foundational traits and types for building
//! accessibility checkers. It includes:
//!
//! - [`Document`] with a parsed stylesheet for computed-style queries
//! - [`Visibility`] for deciding whether an element is hidden from users
//! - [`Check`] trait for per-element predicates returning a [`Verdict`]
//! - [`RuleDefinition`] / [`Rule`] binding selectors to checks
//! - [`Engine`] for running rules over a document or subtree
//! - [`AnimationVerifier`] for the asynchronous animated-image pre-scan
//!
//! ## Example
//!
//! ```ignore
//! use a11y_audit_core::{Document, Engine, RuleDefinition};
//!
//! let mut engine = Engine::builder().build();
//! engine.register(
//!     RuleDefinition::new("img_alt")
//!         .selector("img")
//!         .check(MyAltCheck),
//! )?;
//!
//! let document = Document::parse(html);
//! let report = engine.scan(&document)?;
//! println!("{}", report.format_test_report(Severity::Warning));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod config;
mod context;
mod document;
mod engine;
mod registry;
mod rule;
mod selector;
mod store;
mod style;
mod types;
mod visibility;

/// Declarative rules loaded from `[[custom-rule]]` TOML sections.
pub mod declarative;
/// Utility modules for check implementations.
pub mod utils;
pub mod verifier;

pub use check::{
    Check, CheckError, CheckFn, CheckRef, CheckRegistry, FnCheck, Requirement, Verdict,
};
pub use config::{Config, ConfigError, RuleConfig, ScanConfig, DEFAULT_ANIMATION_TIMEOUT_MS};
pub use context::ScanContext;
pub use document::Document;
pub use engine::{Engine, EngineBuilder, ScanError, ScanPhase, ScanRequest};
pub use registry::RuleRegistry;
pub use rule::{
    CombinationMode, Rule, RuleDefinition, RuleError, RuleMetadata, VisibilityPolicy,
};
pub use selector::{find_candidates, CandidateSelector, SelectorError};
pub use store::{AltTextStore, AnchorTargetStore, CrossElementStore, HeadingIndex, ScanStores};
pub use style::{parse_declarations, specificity, Declaration, Specificity, Stylesheet};
pub use types::{CheckFailure, ElementLocation, ScanReport, Severity, Violation};
pub use verifier::{AnimationResults, AnimationVerifier};
pub use visibility::{text_content, Visibility};

// Re-exported so check crates share the same tree types.
pub use ego_tree::NodeId;
pub use scraper::ElementRef;

//! The `Check` trait and check registry.

use crate::context::ScanContext;
use scraper::ElementRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of evaluating one check against one candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The element satisfies the check.
    Pass,
    /// The element violates the check.
    Fail,
    /// The check does not apply to this element and must not affect the
    /// rule outcome.
    Inapplicable,
}

impl Verdict {
    /// Maps a boolean "is acceptable" result to `Pass`/`Fail`.
    #[must_use]
    pub fn from_pass(pass: bool) -> Self {
        if pass {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Returns true for [`Verdict::Fail`].
    #[must_use]
    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Inapplicable => write!(f, "inapplicable"),
        }
    }
}

/// Scan resources a check needs before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Nothing beyond the document and cross-element stores.
    #[default]
    None,
    /// Resolved results from the animated-image pre-scan.
    AnimationResults,
}

/// A recoverable failure raised while evaluating a check.
///
/// The engine treats the candidate as inapplicable for that check and
/// records the failure in the report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// A scan resource the check relies on was not available.
    #[error("required scan resource unavailable: {0}")]
    MissingResource(&'static str),

    /// A rule option had the wrong type or an out-of-range value.
    #[error("invalid option `{option}`: {message}")]
    InvalidOption {
        /// Option key.
        option: String,
        /// What was wrong with it.
        message: String,
    },

    /// Any other evaluation failure.
    #[error("{0}")]
    Other(String),
}

/// An atomic evaluator reusable across rules.
///
/// Checks are stateless with respect to the element they receive, but may
/// read and write the cross-element stores exposed through the
/// [`ScanContext`].
pub trait Check: Send + Sync {
    /// Stable identifier used by rules and declarative configuration.
    fn id(&self) -> &'static str;

    /// Brief description of what the check verifies.
    fn description(&self) -> &'static str {
        ""
    }

    /// Resources that must be ready before this check is evaluated.
    fn requires(&self) -> Requirement {
        Requirement::None
    }

    /// Evaluates the check against a candidate element.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the check cannot reach a verdict.
    fn evaluate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut ScanContext<'_>,
    ) -> Result<Verdict, CheckError>;
}

/// Shared handle to a check.
pub type CheckRef = Arc<dyn Check>;

/// Signature of a function-backed check.
pub type CheckFn = fn(ElementRef<'_>, &mut ScanContext<'_>) -> Result<Verdict, CheckError>;

/// A [`Check`] backed by a plain function pointer.
///
/// Most library checks are free functions; this adapter gives them an id.
#[derive(Clone, Copy)]
pub struct FnCheck {
    id: &'static str,
    description: &'static str,
    requires: Requirement,
    eval: CheckFn,
}

impl FnCheck {
    /// Creates a check with no special requirements.
    #[must_use]
    pub const fn new(id: &'static str, description: &'static str, eval: CheckFn) -> Self {
        Self {
            id,
            description,
            requires: Requirement::None,
            eval,
        }
    }

    /// Declares a scan resource this check depends on.
    #[must_use]
    pub const fn requiring(mut self, requirement: Requirement) -> Self {
        self.requires = requirement;
        self
    }
}

impl std::fmt::Debug for FnCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCheck")
            .field("id", &self.id)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

impl Check for FnCheck {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn requires(&self) -> Requirement {
        self.requires
    }

    fn evaluate(
        &self,
        element: ElementRef<'_>,
        ctx: &mut ScanContext<'_>,
    ) -> Result<Verdict, CheckError> {
        (self.eval)(element, ctx)
    }
}

/// Lookup table of checks by id, used to resolve checks named in
/// declarative rules.
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: HashMap<&'static str, CheckRef>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check, replacing any previous check with the same id.
    pub fn register(&mut self, check: impl Check + 'static) -> &mut Self {
        self.register_ref(Arc::new(check))
    }

    /// Registers an already shared check.
    pub fn register_ref(&mut self, check: CheckRef) -> &mut Self {
        if self.checks.insert(check.id(), Arc::clone(&check)).is_some() {
            tracing::debug!(check = check.id(), "replaced check registration");
        }
        self
    }

    /// Returns the check with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<CheckRef> {
        self.checks.get(id).cloned()
    }

    /// Returns the registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.checks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.ids())
            .finish()
    }
}

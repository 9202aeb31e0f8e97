//! Utility functions for check implementations.

pub mod attributes;
pub mod paths;
pub mod text;

// Re-export commonly used utilities for check implementations
#[doc(inline)]
pub use attributes::{
    closest, has_role, heading_level, id_refs, is_aria_hidden, is_presentational, non_empty_attr,
    role,
};
#[doc(inline)]
pub use paths::{element_path, element_snippet};
#[doc(inline)]
pub use text::{collapse_whitespace, is_placeholder_text, normalize_key, truncate_chars, word_count};

//! Scoped slug generation.
//!
//! A slug is derived from a title and must be unique within a scope: the
//! owning playlist for videos, the whole table for playlists and topics. This
//! module owns normalization and suffix allocation. The repository layer
//! supplies the slugs already taken in the scope and performs the write.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// How many candidate slugs a single write may try before the collision is
/// reported as a consistency fault.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// First numeric suffix appended on collision (`title`, `title-2`, `title-3`...).
pub const FIRST_SUFFIX: u32 = 2;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a title into a URL-safe slug.
///
/// Transliterates to ASCII, lowercases, collapses every run of
/// non-alphanumeric characters to a single hyphen and trims hyphens from both
/// ends. A title that normalizes to nothing (e.g. only punctuation) is a
/// validation error.
pub fn normalize(title: &str) -> Result<String, CoreError> {
    let ascii = deunicode::deunicode_with_tofu(title, "-").to_lowercase();
    let collapsed = NON_ALNUM_RUN.replace_all(&ascii, "-");
    let slug = collapsed.trim_matches('-');

    if slug.is_empty() {
        return Err(CoreError::Validation(format!(
            "Title '{title}' does not contain any characters usable in a slug"
        )));
    }
    validate_slug(slug)?;
    Ok(slug.to_string())
}

/// Validate a stored or user-provided slug (non-empty, `[a-z0-9-]` only).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

/// Whether an update must re-derive the slug.
///
/// Only a changed title triggers regeneration; an untouched or identical title
/// keeps the existing slug so published links stay stable.
pub fn needs_regeneration(current_title: &str, new_title: Option<&str>) -> bool {
    matches!(new_title, Some(title) if title != current_title)
}

// ---------------------------------------------------------------------------
// Collision resolution
// ---------------------------------------------------------------------------

/// Pick the first free slug for `base` given the slugs taken in its scope.
///
/// Returns `base` itself when free, otherwise `base-N` for the smallest
/// `N >= 2` not already taken.
pub fn next_available(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (FIRST_SUFFIX..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Tracks candidate slugs for one write against one scope.
///
/// The repository asks for a [`candidate`](Self::candidate), attempts the
/// write, and on a uniqueness violation calls [`reject`](Self::reject) before
/// asking again. After [`MAX_SLUG_ATTEMPTS`] rejections the allocator gives
/// up with [`CoreError::Consistency`].
#[derive(Debug, Clone)]
pub struct SlugAllocator {
    base: String,
    taken: HashSet<String>,
    attempts: usize,
}

impl SlugAllocator {
    pub fn new(base: String, taken: impl IntoIterator<Item = String>) -> Self {
        Self {
            base,
            taken: taken.into_iter().collect(),
            attempts: 0,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn candidate(&self) -> String {
        next_available(&self.base, &self.taken)
    }

    /// Record that `slug` lost a race for the scope.
    pub fn reject(&mut self, slug: String) -> Result<(), CoreError> {
        self.attempts += 1;
        if self.attempts >= MAX_SLUG_ATTEMPTS {
            return Err(CoreError::Consistency(format!(
                "Slug '{}' still collides after {} attempts",
                self.base, self.attempts
            )));
        }
        self.taken.insert(slug);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

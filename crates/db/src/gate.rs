//! SQL form of the publication gate.
//!
//! Every query that lists, counts or looks up videos for a reader binds
//! [`Audience::cutoff`](vidcat_core::visibility::Audience::cutoff) and filters
//! through [`published_by`]. A `NULL` cutoff (admin) disables the filter.

/// `(${param}::TIMESTAMPTZ IS NULL OR {column} <= ${param})`
pub fn published_by(column: &str, param: u8) -> String {
    format!("(${param}::TIMESTAMPTZ IS NULL OR {column} <= ${param})")
}

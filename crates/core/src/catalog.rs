//! Field rules for playlists and topics.

use crate::error::CoreError;

/// Maximum length for playlist and topic titles.
pub const MAX_CATALOG_TITLE_LEN: usize = 200;

/// Fail if `value` is empty or whitespace only.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn validate_catalog_title(title: &str) -> Result<(), CoreError> {
    require_text("Title", title)?;
    if title.chars().count() > MAX_CATALOG_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_CATALOG_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate playlist fields. `None` means "not being set" (patch semantics).
pub fn validate_playlist(
    title: Option<&str>,
    description: Option<&str>,
    external_media_ref: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(title) = title {
        validate_catalog_title(title)?;
    }
    if let Some(description) = description {
        require_text("Description", description)?;
    }
    if let Some(reference) = external_media_ref {
        require_text("External media reference", reference)?;
    }
    Ok(())
}

/// Validate topic fields. `None` means "not being set" (patch semantics).
pub fn validate_topic(title: Option<&str>, description: Option<&str>) -> Result<(), CoreError> {
    if let Some(title) = title {
        validate_catalog_title(title)?;
    }
    if let Some(description) = description {
        require_text("Description", description)?;
    }
    Ok(())
}

//! Video field rules and the natural-duration codec.
//!
//! Validation runs before any store access so a rejected create or update
//! never leaves a partial write behind.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::require_text;
use crate::error::CoreError;
use crate::types::Timestamp;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1500;
pub const MAX_EXTERNAL_MEDIA_ID_LEN: usize = 15;

/// `[[H:]M:]S` where minutes and seconds after a colon are at most two digits.
static NATURAL_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:(\d+):)?(\d{1,2}):)?(\d+)$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

fn check_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    require_text(field, value)?;
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    check_len("Title", title, MAX_TITLE_LEN)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    check_len("Description", description, MAX_DESCRIPTION_LEN)
}

pub fn validate_external_media_id(id: &str) -> Result<(), CoreError> {
    check_len("External media id", id, MAX_EXTERNAL_MEDIA_ID_LEN)
}

pub fn validate_duration(duration_secs: i32) -> Result<(), CoreError> {
    if duration_secs <= 0 {
        return Err(CoreError::Validation(
            "Duration must be greater than 0 seconds".into(),
        ));
    }
    Ok(())
}

/// Publication time is mandatory; a missing value never means "always visible".
pub fn require_published_at(published_at: Option<Timestamp>) -> Result<Timestamp, CoreError> {
    published_at.ok_or_else(|| CoreError::Validation("Publication date is required".into()))
}

/// Fields of a video create or patch, borrowed from the caller's DTO.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoInput<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub external_media_id: Option<&'a str>,
    pub duration_secs: Option<i32>,
    pub natural_duration: Option<&'a str>,
    pub published_at: Option<Timestamp>,
}

/// Values a validated new video needs beyond its text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedNewVideo {
    pub duration_secs: i32,
    pub published_at: Timestamp,
}

/// Validate a new video. Every field is required.
pub fn validate_new(input: &VideoInput<'_>) -> Result<ValidatedNewVideo, CoreError> {
    validate_title(input.title.unwrap_or_default())?;
    validate_description(input.description.unwrap_or_default())?;
    validate_external_media_id(input.external_media_id.unwrap_or_default())?;
    let duration_secs = resolve_duration(input.duration_secs, input.natural_duration)?
        .ok_or_else(|| CoreError::Validation("Duration is required".into()))?;
    let published_at = require_published_at(input.published_at)?;
    Ok(ValidatedNewVideo {
        duration_secs,
        published_at,
    })
}

/// Validate the fields present in a patch. Returns the resolved duration when
/// one was supplied in either form.
pub fn validate_patch(input: &VideoInput<'_>) -> Result<Option<i32>, CoreError> {
    if let Some(title) = input.title {
        validate_title(title)?;
    }
    if let Some(description) = input.description {
        validate_description(description)?;
    }
    if let Some(id) = input.external_media_id {
        validate_external_media_id(id)?;
    }
    resolve_duration(input.duration_secs, input.natural_duration)
}

/// Pick the duration from either its numeric or its natural form.
///
/// Supplying both is rejected rather than guessing which one wins.
pub fn resolve_duration(
    duration_secs: Option<i32>,
    natural: Option<&str>,
) -> Result<Option<i32>, CoreError> {
    let secs = match (duration_secs, natural) {
        (Some(_), Some(_)) => {
            return Err(CoreError::Validation(
                "Provide either duration_secs or natural_duration, not both".into(),
            ))
        }
        (Some(secs), None) => secs,
        (None, Some(text)) => parse_natural_duration(text)?,
        (None, None) => return Ok(None),
    };
    validate_duration(secs)?;
    Ok(Some(secs))
}

// ---------------------------------------------------------------------------
// Natural duration
// ---------------------------------------------------------------------------

/// Format seconds as `HH:MM:SS`.
pub fn format_natural_duration(duration_secs: i32) -> String {
    let secs = duration_secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Parse `S`, `M:SS` or `H:MM:SS` into whole seconds.
pub fn parse_natural_duration(text: &str) -> Result<i32, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid duration '{text}'"));
    let caps = NATURAL_DURATION.captures(text.trim()).ok_or_else(invalid)?;

    let field = |index: usize| -> Result<Option<i64>, CoreError> {
        caps.get(index)
            .map(|m| m.as_str().parse::<i64>().map_err(|_| invalid()))
            .transpose()
    };
    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?.ok_or_else(invalid)?;

    if minutes.is_some() && (seconds >= 60 || caps[3].len() > 2) {
        return Err(invalid());
    }
    if hours.is_some() && minutes.is_some_and(|m| m >= 60) {
        return Err(invalid());
    }

    let total = hours
        .unwrap_or(0)
        .checked_mul(3600)
        .zip(minutes.unwrap_or(0).checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(invalid)?;
    i32::try_from(total).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn full_input<'a>() -> VideoInput<'a> {
        VideoInput {
            title: Some("Sample"),
            description: Some("A sample video"),
            external_media_id: Some("dQw4w9WgXcQ"),
            duration_secs: Some(212),
            natural_duration: None,
            published_at: Some(Utc::now()),
        }
    }

    // -- validate_new --------------------------------------------------------

    #[test]
    fn complete_video_is_valid() {
        let validated = validate_new(&full_input()).unwrap();
        assert_eq!(validated.duration_secs, 212);
    }

    #[test]
    fn missing_title_is_invalid() {
        let input = VideoInput {
            title: None,
            ..full_input()
        };
        assert_matches!(validate_new(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_title_is_invalid() {
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn title_length_limit() {
        assert!(validate_title(&"A".repeat(100)).is_ok());
        assert!(validate_title(&"A".repeat(101)).is_err());
    }

    #[test]
    fn title_limit_counts_characters_not_bytes() {
        assert!(validate_title(&"á".repeat(100)).is_ok());
    }

    #[test]
    fn description_length_limit() {
        assert!(validate_description(&"A".repeat(1500)).is_ok());
        assert!(validate_description(&"A".repeat(1501)).is_err());
    }

    #[test]
    fn external_media_id_length_limit() {
        assert!(validate_external_media_id(&"A".repeat(15)).is_ok());
        assert!(validate_external_media_id(&"A".repeat(16)).is_err());
        assert!(validate_external_media_id("").is_err());
    }

    #[test]
    fn zero_and_negative_durations_are_invalid() {
        for secs in [0, -1] {
            let input = VideoInput {
                duration_secs: Some(secs),
                ..full_input()
            };
            assert_matches!(validate_new(&input), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn missing_duration_is_invalid() {
        let input = VideoInput {
            duration_secs: None,
            ..full_input()
        };
        assert_matches!(validate_new(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn missing_publication_date_is_invalid() {
        let input = VideoInput {
            published_at: None,
            ..full_input()
        };
        assert_matches!(validate_new(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn natural_duration_is_accepted_on_create() {
        let input = VideoInput {
            duration_secs: None,
            natural_duration: Some("1:42"),
            ..full_input()
        };
        assert_eq!(validate_new(&input).unwrap().duration_secs, 102);
    }

    #[test]
    fn both_duration_forms_are_rejected() {
        assert!(resolve_duration(Some(10), Some("0:10")).is_err());
    }

    // -- validate_patch ------------------------------------------------------

    #[test]
    fn empty_patch_is_valid() {
        assert_eq!(validate_patch(&VideoInput::default()).unwrap(), None);
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let input = VideoInput {
            description: Some("Updated"),
            ..VideoInput::default()
        };
        assert!(validate_patch(&input).is_ok());

        let input = VideoInput {
            title: Some(""),
            ..VideoInput::default()
        };
        assert!(validate_patch(&input).is_err());
    }

    // -- natural duration ----------------------------------------------------

    #[test]
    fn formats_natural_duration() {
        assert_eq!(format_natural_duration(12), "00:00:12");
        assert_eq!(format_natural_duration(61), "00:01:01");
        assert_eq!(format_natural_duration(102), "00:01:42");
        assert_eq!(format_natural_duration(3600), "01:00:00");
    }

    #[test]
    fn parses_natural_duration() {
        assert_eq!(parse_natural_duration("0:12").unwrap(), 12);
        assert_eq!(parse_natural_duration("1:01").unwrap(), 61);
        assert_eq!(parse_natural_duration("1:42").unwrap(), 102);
        assert_eq!(parse_natural_duration("59:59").unwrap(), 3599);
        assert_eq!(parse_natural_duration("1:00:00").unwrap(), 3600);
        assert_eq!(parse_natural_duration("9:59:59").unwrap(), 35999);
        assert_eq!(parse_natural_duration("10:00:00").unwrap(), 36000);
    }

    #[test]
    fn parses_bare_seconds() {
        assert_eq!(parse_natural_duration("45").unwrap(), 45);
        assert_eq!(parse_natural_duration(" 90 ").unwrap(), 90);
    }

    #[test]
    fn rejects_malformed_natural_duration() {
        for text in ["", "abc", "1:60", "1:2:3:4", "1:75:00", ":30", "1:123"] {
            assert!(parse_natural_duration(text).is_err(), "{text:?} should fail");
        }
    }

    #[test]
    fn rejects_durations_that_overflow() {
        for text in [
            "9999999999999999:00:00",
            "1152921504606846976:00:42",
            "99999999999999999999:00:00",
            "596524:00:00",
        ] {
            assert_matches!(
                parse_natural_duration(text),
                Err(CoreError::Validation(_)),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn natural_duration_round_trip_for_known_values() {
        for secs in [12, 3599, 36000] {
            assert_eq!(
                parse_natural_duration(&format_natural_duration(secs)).unwrap(),
                secs
            );
        }
    }
}

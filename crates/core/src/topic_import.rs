//! Topic seed files.
//!
//! A seed file is a YAML sequence of topics:
//!
//! ```yaml
//! - title: Git
//!   description: Version control from the ground up
//!   color: "#f05033"
//! - title: Rust
//!   description: Systems programming
//! ```
//!
//! Parsing and validation happen here; the repository inserts the whole
//! batch in one transaction.

use serde::Deserialize;

use crate::catalog::validate_topic;
use crate::error::CoreError;

/// One topic entry of a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicSeed {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Parse and validate a YAML seed document.
pub fn parse_topic_seeds(yaml: &str) -> Result<Vec<TopicSeed>, CoreError> {
    let seeds: Vec<TopicSeed> = serde_yaml::from_str(yaml)
        .map_err(|e| CoreError::Validation(format!("Invalid topic seed file: {e}")))?;

    for (index, seed) in seeds.iter().enumerate() {
        validate_topic(Some(&seed.title), Some(&seed.description)).map_err(|e| match e {
            CoreError::Validation(msg) => {
                CoreError::Validation(format!("Topic #{} ({}): {msg}", index + 1, seed.title))
            }
            other => other,
        })?;
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_seed_list() {
        let yaml = r##"
- title: Git
  description: Version control
  color: "#f05033"
- title: Rust
  description: Systems programming
"##;
        let seeds = parse_topic_seeds(yaml).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].title, "Git");
        assert_eq!(seeds[0].color.as_deref(), Some("#f05033"));
        assert_eq!(seeds[1].color, None);
    }

    #[test]
    fn empty_document_list_is_allowed() {
        assert!(parse_topic_seeds("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_validation_error() {
        assert_matches!(
            parse_topic_seeds("- title: [unterminated"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn missing_description_is_rejected() {
        assert_matches!(
            parse_topic_seeds("- title: Git\n"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn blank_title_names_the_offending_entry() {
        let yaml = "- title: Git\n  description: ok\n- title: \"\"\n  description: nope\n";
        let err = parse_topic_seeds(yaml).unwrap_err();
        assert!(err.to_string().contains("Topic #2"), "got: {err}");
    }
}

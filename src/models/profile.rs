//! Shared profile helpers: completeness scoring and URL validation.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// How much of a profile has been filled in.
///
/// Stored as JSON in the `profile_completeness` column of each profile table.
///
/// ```json
/// { "percent": 75, "missing": ["bio", "image_url"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompleteness {
    pub percent: u8,
    pub missing: Vec<String>,
}

impl ProfileCompleteness {
    /// Score a list of `(field name, is filled)` pairs.
    pub fn from_fields(fields: &[(&str, bool)]) -> Self {
        if fields.is_empty() {
            return Self {
                percent: 100,
                missing: Vec::new(),
            };
        }

        let missing: Vec<String> = fields
            .iter()
            .filter(|(_, filled)| !filled)
            .map(|(name, _)| name.to_string())
            .collect();

        let filled = fields.len() - missing.len();
        let percent = (filled * 100 / fields.len()) as u8;

        Self { percent, missing }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "percent": self.percent,
            "missing": self.missing,
        })
    }
}

/// True when an optional text field holds something other than whitespace.
pub fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// True when a JSON field is a non-empty object or array.
pub fn json_is_filled(value: &Option<serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Object(map)) => !map.is_empty(),
        Some(serde_json::Value::Array(items)) => !items.is_empty(),
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Validate an optional profile link. Only http and https URLs are accepted.
pub fn validate_profile_url(field: &str, url: &Option<String>) -> Result<(), AppError> {
    let Some(raw) = url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return Ok(());
    };

    if raw.len() > 2048 {
        return Err(AppError::InvalidRequest(format!(
            "{field} exceeds 2048 characters"
        )));
    }

    let parsed = url::Url::parse(raw)
        .map_err(|_| AppError::InvalidRequest(format!("{field} is not a valid URL")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(AppError::InvalidRequest(format!(
            "{field} must use http or https"
        ))),
    }
}

/// Validate that every value in a `socials` object is a usable link.
pub fn validate_socials(socials: &Option<serde_json::Value>) -> Result<(), AppError> {
    let Some(value) = socials else {
        return Ok(());
    };

    let map = value
        .as_object()
        .ok_or_else(|| AppError::InvalidRequest("socials must be an object".to_string()))?;

    for (network, link) in map {
        let link = link.as_str().map(str::to_string);
        validate_profile_url(&format!("socials.{network}"), &link)?;
    }

    Ok(())
}

/// Profile display names must be non-empty and reasonably short.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > 120 {
        return Err(AppError::InvalidRequest(
            "name must be at most 120 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completeness_counts_filled_fields() {
        let score = ProfileCompleteness::from_fields(&[
            ("name", true),
            ("bio", false),
            ("city", true),
            ("image_url", false),
        ]);
        assert_eq!(score.percent, 50);
        assert_eq!(score.missing, vec!["bio", "image_url"]);
    }

    #[test]
    fn completeness_rounds_down() {
        let score = ProfileCompleteness::from_fields(&[("a", true), ("b", true), ("c", false)]);
        assert_eq!(score.percent, 66);
    }

    #[test]
    fn whitespace_does_not_count_as_filled() {
        assert!(!is_filled(&Some("   ".to_string())));
        assert!(is_filled(&Some("Berlin".to_string())));
        assert!(!is_filled(&None));
    }

    #[test]
    fn empty_socials_object_is_not_filled() {
        assert!(!json_is_filled(&Some(json!({}))));
        assert!(json_is_filled(&Some(json!({"instagram": "https://instagram.com/x"}))));
    }

    #[test]
    fn profile_urls_must_be_http() {
        assert!(validate_profile_url("image_url", &Some("https://cdn.example.com/a.png".into())).is_ok());
        assert!(validate_profile_url("image_url", &None).is_ok());
        assert!(validate_profile_url("image_url", &Some("ftp://example.com/a.png".into())).is_err());
        assert!(validate_profile_url("image_url", &Some("not a url".into())).is_err());
    }

    #[test]
    fn socials_values_are_validated() {
        assert!(validate_socials(&Some(json!({"spotify": "https://open.spotify.com/artist/1"}))).is_ok());
        assert!(validate_socials(&Some(json!({"spotify": "javascript:alert(1)"}))).is_err());
        assert!(validate_socials(&Some(json!(["https://x.com"]))).is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("The Owls").is_ok());
    }
}

//! Shared wire types used by more than one catalog entity.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A link from one record to another.
///
/// The backend returns references either as a bare id or, when the relation is
/// populated, as an embedded object. Both decode to this type.
///
/// # Examples
///
/// ```rust
/// use catalog_backoffice::types::Reference;
///
/// let bare: Reference = serde_json::from_str(r#""65a1""#).unwrap();
/// let populated: Reference =
///     serde_json::from_str(r#"{"_id":"65a1","name":"Nina Simone"}"#).unwrap();
///
/// assert_eq!(bare.id(), "65a1");
/// assert_eq!(populated.id(), "65a1");
/// assert_eq!(populated.label(), Some("Nina Simone"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Populated { id, .. } => id,
        }
    }

    /// Display name of the referenced record, when the backend embedded it
    pub fn label(&self) -> Option<&str> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated { name, title, .. } => name.as_deref().or(title.as_deref()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or_else(|| self.id()))
    }
}

/// Normalize a backend date (`2021-03-04` or `2021-03-04T00:00:00.000Z`) to the
/// `YYYY-MM-DD` form used by date inputs.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.split('T').next().unwrap_or(raw).to_string()
}

/// Deserialize a number that may arrive as a JSON number or a numeric string
/// (`"1234"`, `"85%"`, `"7.5 GB"`). Returns `None` when nothing numeric is found.
pub fn deserialize_loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Null,
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Number(n)) => Some(n),
        Some(Loose::Text(text)) => parse_leading_number(&text),
        Some(Loose::Null) | None => None,
    })
}

/// Parse the leading decimal number of `text`, ignoring any unit suffix.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_decoding() {
        let refs: Vec<Reference> = serde_json::from_str(
            r#"["a1", {"_id": "b2", "title": "Blue"}, {"_id": "c3"}]"#,
        )
        .unwrap();
        assert_eq!(refs[0], Reference::Id("a1".to_string()));
        assert_eq!(refs[1].id(), "b2");
        assert_eq!(refs[1].label(), Some("Blue"));
        assert_eq!(refs[2].label(), None);
        assert_eq!(refs[2].to_string(), "c3");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2021-03-04T00:00:00.000Z"), "2021-03-04");
        assert_eq!(normalize_date("2021-03-04"), "2021-03-04");
        assert_eq!(normalize_date("2021-03-04T10:00"), "2021-03-04");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("85%"), Some(85.0));
        assert_eq!(parse_leading_number("7.5 GB"), Some(7.5));
        assert_eq!(parse_leading_number(" 512 MB"), Some(512.0));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("n/a"), None);
    }

    #[test]
    fn test_loose_number_field() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "deserialize_loose_number")]
            value: Option<f64>,
        }

        let cases = [
            (r#"{"value": 12}"#, Some(12.0)),
            (r#"{"value": "12"}"#, Some(12.0)),
            (r#"{"value": null}"#, None),
            (r#"{}"#, None),
        ];
        for (json, expected) in cases {
            let wrapper: Wrapper = serde_json::from_str(json).unwrap();
            assert_eq!(wrapper.value, expected, "{json}");
        }
    }
}

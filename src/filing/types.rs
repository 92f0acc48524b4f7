//! Type definitions for raw ECFS filings.

use serde::{Deserialize, Deserializer, Serialize};

/// Submission type that marks an original numbering authorization application.
pub const APPLICATION: &str = "APPLICATION";

/// Reported when a filing carries no submission type.
pub const UNKNOWN_SUBMISSION_TYPE: &str = "UNKNOWN";

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named party on a filing (filer, author, law firm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub name: Option<String>,
}

impl Party {
    pub fn new(name: &str) -> Self {
        Party {
            name: Some(name.to_string()),
        }
    }

    /// Trimmed name, `None` when missing or blank.
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Proceeding (docket) a filing was submitted under
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proceeding {
    /// Docket identifier, e.g. "WC 20-151"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Document attached to a filing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub filename: Option<String>,
    /// Viewer URL as published by ECFS
    #[serde(default)]
    pub src: Option<String>,
}

/// `{ "description": ... }` wrapper used for submission type and filing status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub description: Option<String>,
}

/// One regulatory submission as returned by an ECFS query.
///
/// Every field is optional at the wire level: a filing missing its id, filers
/// or submission type still parses, and the pipeline stages count and exclude
/// it where needed instead of failing the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFiling {
    #[serde(default, alias = "id_submission")]
    pub submission_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub filers: Vec<Party>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub proceedings: Vec<Proceeding>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Document>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Party>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub lawfirms: Vec<Party>,

    #[serde(default, alias = "submissiontype")]
    pub submission_type: Option<Description>,

    #[serde(default, alias = "filingstatus")]
    pub filing_status: Option<Description>,

    #[serde(default)]
    pub date_received: Option<String>,
}

impl RawFiling {
    /// Submission id, `None` when missing or blank
    pub fn id(&self) -> Option<&str> {
        self.submission_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn submission_type(&self) -> Option<&str> {
        self.submission_type
            .as_ref()
            .and_then(|st| st.description.as_deref())
            .filter(|st| !st.trim().is_empty())
    }

    pub fn filing_status(&self) -> Option<&str> {
        self.filing_status
            .as_ref()
            .and_then(|fs| fs.description.as_deref())
    }

    pub fn is_application(&self) -> bool {
        self.submission_type() == Some(APPLICATION)
    }

    /// Name of the first listed filer, trimmed. Later filers are co-signers
    /// and never decide identity.
    pub fn primary_filer(&self) -> Option<&str> {
        self.filers.first().and_then(Party::trimmed_name)
    }

    /// Received date truncated to `YYYY-MM-DD`; empty when absent.
    pub fn date(&self) -> String {
        normalize_date(self.date_received.as_deref().unwrap_or(""))
    }
}

/// Drop any time component from an ISO date or date-time string.
pub fn normalize_date(raw: &str) -> String {
    raw.trim().chars().take(10).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_source_field_spellings() {
        let json = r#"{
            "id_submission": "1030155470598",
            "filers": [{"name": "Acme VoIP LLC"}],
            "submissiontype": {"description": "APPLICATION"},
            "filingstatus": {"description": "ACCEPTED"},
            "date_received": "2021-03-01T00:00:00Z"
        }"#;
        let filing: RawFiling = serde_json::from_str(json).unwrap();

        assert_eq!(filing.id(), Some("1030155470598"));
        assert_eq!(filing.primary_filer(), Some("Acme VoIP LLC"));
        assert!(filing.is_application());
        assert_eq!(filing.filing_status(), Some("ACCEPTED"));
        assert_eq!(filing.date(), "2021-03-01");
    }

    #[test]
    fn test_nulls_and_missing_fields_are_tolerated() {
        let json = r#"{
            "submission_id": null,
            "filers": null,
            "proceedings": [{"name": "WC 20-151", "description": null}],
            "documents": null
        }"#;
        let filing: RawFiling = serde_json::from_str(json).unwrap();

        assert_eq!(filing.id(), None);
        assert!(filing.filers.is_empty());
        assert!(filing.documents.is_empty());
        assert_eq!(filing.proceedings[0].description, None);
        assert_eq!(filing.submission_type(), None);
        assert!(!filing.is_application());
        assert_eq!(filing.date(), "");
    }

    #[test]
    fn test_blank_values_read_as_absent() {
        let filing = RawFiling {
            submission_id: Some("  ".to_string()),
            filers: vec![Party::new("   ")],
            submission_type: Some(Description {
                description: Some(" ".to_string()),
            }),
            ..Default::default()
        };

        assert_eq!(filing.id(), None);
        assert_eq!(filing.primary_filer(), None);
        assert_eq!(filing.submission_type(), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2022-01-15T00:00:00Z"), "2022-01-15");
        assert_eq!(normalize_date("2022-01-15"), "2022-01-15");
        assert_eq!(normalize_date(" 2022-01 "), "2022-01");
        assert_eq!(normalize_date(""), "");
    }
}

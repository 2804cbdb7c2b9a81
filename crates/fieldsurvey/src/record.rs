//! Survey record types.
//!
//! A [`SurveyDraft`] is the in-progress form for one submission. Once the
//! archive accepts it, the store answers with a [`SyncReceipt`]; the stored
//! entity itself belongs to the archive and is never read back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Province where the linguistic data was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    /// Punjab.
    Punjab,
    /// Sindh.
    Sindh,
    /// Khyber Pakhtunkhwa.
    #[serde(rename = "KPK")]
    Kpk,
    /// Balochistan.
    Balochistan,
    /// Gilgit-Baltistan.
    #[serde(rename = "GB")]
    Gb,
    /// Azad Kashmir.
    Kashmir,
}

impl Province {
    /// All provinces, in tile order.
    pub const ALL: [Self; 6] = [
        Self::Punjab,
        Self::Sindh,
        Self::Kpk,
        Self::Balochistan,
        Self::Gb,
        Self::Kashmir,
    ];

    /// The token stored in the archive.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Punjab => "Punjab",
            Self::Sindh => "Sindh",
            Self::Kpk => "KPK",
            Self::Balochistan => "Balochistan",
            Self::Gb => "GB",
            Self::Kashmir => "Kashmir",
        }
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Province {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTokenError::new("province", s))
    }
}

/// Sociolinguistic health of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalityStatus {
    /// Speaker base is growing.
    Growing,
    /// Speaker base is stable.
    Stable,
    /// Speaker base is shrinking.
    Endangered,
}

impl VitalityStatus {
    /// All statuses, in radio order.
    pub const ALL: [Self; 3] = [Self::Growing, Self::Stable, Self::Endangered];

    /// The token stored in the archive.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Growing => "Growing",
            Self::Stable => "Stable",
            Self::Endangered => "Endangered",
        }
    }
}

impl fmt::Display for VitalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for VitalityStatus {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTokenError::new("vitality status", s))
    }
}

/// A string did not name one of the fixed tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseTokenError {
    kind: &'static str,
    value: String,
}

impl ParseTokenError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// The free-text fields of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// Respondent's full name or official id.
    IdentityLabel,
    /// Name of the dialect being recorded.
    DialectName,
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityLabel => write!(f, "name"),
            Self::DialectName => write!(f, "dialect"),
        }
    }
}

/// Any field of a draft; used to report what is still missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// A free-text field.
    Text(TextField),
    /// The province tile group.
    Region,
    /// The vitality radio group.
    Vitality,
}

impl DraftField {
    /// Every field of a draft, in form order.
    pub const ALL: [Self; 4] = [
        Self::Text(TextField::IdentityLabel),
        Self::Region,
        Self::Text(TextField::DialectName),
        Self::Vitality,
    ];
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(field) => fmt::Display::fmt(field, f),
            Self::Region => write!(f, "region"),
            Self::Vitality => write!(f, "vitality"),
        }
    }
}

/// The in-progress, unsaved form data for one survey submission.
///
/// Field names on the wire match the archive collection (`name`, `region`,
/// `dialect`, `vitality`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDraft {
    /// Respondent's full name or official id.
    #[serde(rename = "name")]
    pub identity_label: String,

    /// Province the data was collected in.
    pub region: Option<Province>,

    /// Dialect name.
    #[serde(rename = "dialect")]
    pub dialect_name: String,

    /// Dialect vitality.
    pub vitality: Option<VitalityStatus>,
}

impl SurveyDraft {
    /// Read a free-text field.
    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::IdentityLabel => &self.identity_label,
            TextField::DialectName => &self.dialect_name,
        }
    }

    /// Overwrite a free-text field.
    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let slot = match field {
            TextField::IdentityLabel => &mut self.identity_label,
            TextField::DialectName => &mut self.dialect_name,
        };
        *slot = value.into();
    }

    /// Whether the given field holds a value. Text is not trimmed.
    #[must_use]
    pub fn is_filled(&self, field: DraftField) -> bool {
        match field {
            DraftField::Text(text) => !self.text(text).is_empty(),
            DraftField::Region => self.region.is_some(),
            DraftField::Vitality => self.vitality.is_some(),
        }
    }

    /// The first of `fields` that is still empty.
    #[must_use]
    pub fn first_missing(&self, fields: &[DraftField]) -> Option<DraftField> {
        fields.iter().copied().find(|f| !self.is_filled(*f))
    }

    /// Whether every field is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.first_missing(&DraftField::ALL).is_none()
    }

    /// Whether the draft equals its initial empty value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What the archive answered after accepting a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReceipt {
    /// Store-generated document id.
    pub document_id: String,
    /// Server-assigned creation time.
    pub committed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> SurveyDraft {
        SurveyDraft {
            identity_label: "Dr. A. Khan".to_string(),
            region: Some(Province::Sindh),
            dialect_name: "Hindko".to_string(),
            vitality: Some(VitalityStatus::Endangered),
        }
    }

    #[test]
    fn test_province_tokens() {
        let tokens: Vec<_> = Province::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            tokens,
            ["Punjab", "Sindh", "KPK", "Balochistan", "GB", "Kashmir"]
        );
    }

    #[test]
    fn test_province_from_str() {
        assert_eq!("sindh".parse::<Province>().unwrap(), Province::Sindh);
        assert_eq!(" KPK ".parse::<Province>().unwrap(), Province::Kpk);
        assert_eq!("gb".parse::<Province>().unwrap(), Province::Gb);

        let err = "Islamabad".parse::<Province>().unwrap_err();
        assert_eq!(err.to_string(), "unknown province: 'Islamabad'");
    }

    #[test]
    fn test_vitality_from_str() {
        assert_eq!(
            "endangered".parse::<VitalityStatus>().unwrap(),
            VitalityStatus::Endangered
        );
        assert!("Extinct".parse::<VitalityStatus>().is_err());
    }

    #[test]
    fn test_draft_default_is_empty() {
        let draft = SurveyDraft::default();
        assert!(draft.is_empty());
        assert!(!draft.is_complete());
    }

    #[test]
    fn test_set_text_overwrites() {
        let mut draft = SurveyDraft::default();
        draft.set_text(TextField::DialectName, "Saraiki");
        draft.set_text(TextField::DialectName, "Hindko");
        assert_eq!(draft.text(TextField::DialectName), "Hindko");
        assert_eq!(draft.text(TextField::IdentityLabel), "");
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let mut draft = SurveyDraft::default();
        draft.set_text(TextField::IdentityLabel, " ");
        assert!(draft.is_filled(DraftField::Text(TextField::IdentityLabel)));
    }

    #[test]
    fn test_first_missing_reports_in_order() {
        let mut draft = complete_draft();
        assert!(draft.is_complete());

        draft.vitality = None;
        draft.dialect_name.clear();
        assert_eq!(
            draft.first_missing(&[DraftField::Text(TextField::DialectName), DraftField::Vitality]),
            Some(DraftField::Text(TextField::DialectName))
        );
    }

    #[test]
    fn test_draft_wire_names() {
        let json = serde_json::to_value(complete_draft()).unwrap();
        assert_eq!(json["name"], "Dr. A. Khan");
        assert_eq!(json["region"], "Sindh");
        assert_eq!(json["dialect"], "Hindko");
        assert_eq!(json["vitality"], "Endangered");
    }

    #[test]
    fn test_province_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&Province::Kpk).unwrap(), "\"KPK\"");
        assert_eq!(serde_json::to_string(&Province::Gb).unwrap(), "\"GB\"");
    }
}

pub mod store;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use store::{LoadedProgress, ProgressLoadError, ProgressSaveError, ProgressStore, SaveAck};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnknownFieldError {
    #[error("unknown requirement key: {0}")]
    Requirement(String),
    #[error("unknown university field: {0}")]
    UniversityField(String),
    #[error("no progress entry for university: {0}")]
    University(String),
}

/// Application-wide checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Requirement {
    Gre,
    Toefl,
    Transcripts,
    Sop,
    Resume,
    Lors,
}

impl Requirement {
    pub const ALL: [Requirement; 6] = [
        Requirement::Gre,
        Requirement::Toefl,
        Requirement::Transcripts,
        Requirement::Sop,
        Requirement::Resume,
        Requirement::Lors,
    ];

    /// Key used in the persisted snapshot.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Gre => "GRE",
            Self::Toefl => "TOEFL",
            Self::Transcripts => "Transcripts",
            Self::Sop => "SOP",
            Self::Resume => "Resume",
            Self::Lors => "LORs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Gre => "GRE",
            Self::Toefl => "TOEFL",
            Self::Transcripts => "Transcripts",
            Self::Sop => "Statement of Purpose",
            Self::Resume => "Resume",
            Self::Lors => "Letters of Recommendation",
        }
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for Requirement {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "gre" => Ok(Self::Gre),
            "toefl" => Ok(Self::Toefl),
            "transcripts" | "transcript" => Ok(Self::Transcripts),
            "sop" | "statement-of-purpose" => Ok(Self::Sop),
            "resume" | "cv" => Ok(Self::Resume),
            "lors" | "lor" | "letters-of-recommendation" => Ok(Self::Lors),
            _ => Err(UnknownFieldError::Requirement(s.to_string())),
        }
    }
}

/// The four per-university application stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniversityField {
    ApplicationStarted,
    DocumentsUploaded,
    ApplicationSubmitted,
    FeePaid,
}

impl UniversityField {
    pub const ALL: [UniversityField; 4] = [
        UniversityField::ApplicationStarted,
        UniversityField::DocumentsUploaded,
        UniversityField::ApplicationSubmitted,
        UniversityField::FeePaid,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::ApplicationStarted => "Application_Started",
            Self::DocumentsUploaded => "Documents_Uploaded",
            Self::ApplicationSubmitted => "Application_Submitted",
            Self::FeePaid => "Fee_Paid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ApplicationStarted => "Application Started",
            Self::DocumentsUploaded => "Documents Uploaded",
            Self::ApplicationSubmitted => "Application Submitted",
            Self::FeePaid => "Fee Paid",
        }
    }
}

impl Display for UniversityField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for UniversityField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "application_started" | "started" | "start" => Ok(Self::ApplicationStarted),
            "documents_uploaded" | "documents" | "docs" => Ok(Self::DocumentsUploaded),
            "application_submitted" | "submitted" | "submit" => Ok(Self::ApplicationSubmitted),
            "fee_paid" | "fee" | "paid" => Ok(Self::FeePaid),
            _ => Err(UnknownFieldError::UniversityField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UniversityProgress {
    #[serde(rename = "Application_Started")]
    pub application_started: bool,
    #[serde(rename = "Documents_Uploaded")]
    pub documents_uploaded: bool,
    #[serde(rename = "Application_Submitted")]
    pub application_submitted: bool,
    #[serde(rename = "Fee_Paid")]
    pub fee_paid: bool,
}

impl UniversityProgress {
    pub fn get(&self, field: UniversityField) -> bool {
        match field {
            UniversityField::ApplicationStarted => self.application_started,
            UniversityField::DocumentsUploaded => self.documents_uploaded,
            UniversityField::ApplicationSubmitted => self.application_submitted,
            UniversityField::FeePaid => self.fee_paid,
        }
    }

    pub fn set(&mut self, field: UniversityField, value: bool) {
        match field {
            UniversityField::ApplicationStarted => self.application_started = value,
            UniversityField::DocumentsUploaded => self.documents_uploaded = value,
            UniversityField::ApplicationSubmitted => self.application_submitted = value,
            UniversityField::FeePaid => self.fee_paid = value,
        }
    }

    pub fn completed_count(&self) -> usize {
        UniversityField::ALL
            .iter()
            .filter(|field| self.get(**field))
            .count()
    }
}

/// Checklist state for one session. Serializes to the
/// `requirements_checked` object of the progress snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChecklistState {
    #[serde(rename = "GRE")]
    pub gre: bool,
    #[serde(rename = "TOEFL")]
    pub toefl: bool,
    #[serde(rename = "Transcripts")]
    pub transcripts: bool,
    #[serde(rename = "SOP")]
    pub sop: bool,
    #[serde(rename = "Resume")]
    pub resume: bool,
    #[serde(rename = "LORs")]
    pub lors: bool,
    #[serde(rename = "University_Specific")]
    pub university_specific: BTreeMap<String, UniversityProgress>,
}

impl ChecklistState {
    pub fn requirement(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Gre => self.gre,
            Requirement::Toefl => self.toefl,
            Requirement::Transcripts => self.transcripts,
            Requirement::Sop => self.sop,
            Requirement::Resume => self.resume,
            Requirement::Lors => self.lors,
        }
    }

    pub fn set(&mut self, requirement: Requirement, value: bool) {
        let slot = match requirement {
            Requirement::Gre => &mut self.gre,
            Requirement::Toefl => &mut self.toefl,
            Requirement::Transcripts => &mut self.transcripts,
            Requirement::Sop => &mut self.sop,
            Requirement::Resume => &mut self.resume,
            Requirement::Lors => &mut self.lors,
        };
        *slot = value;
    }

    pub fn set_requirement(&mut self, key: &str, value: bool) -> Result<(), UnknownFieldError> {
        let requirement = key.parse::<Requirement>()?;
        self.set(requirement, value);
        Ok(())
    }

    /// Inserts a zeroed entry for `name` unless one already exists.
    pub fn ensure_university(&mut self, name: &str) -> &mut UniversityProgress {
        if !self.university_specific.contains_key(name) {
            debug!("tracking progress for {name}");
        }
        self.university_specific.entry(name.to_string()).or_default()
    }

    pub fn university(&self, name: &str) -> Option<&UniversityProgress> {
        self.university_specific.get(name)
    }

    /// Fails when `name` has not been passed to [`Self::ensure_university`].
    pub fn set_university_field(
        &mut self,
        name: &str,
        field: &str,
        value: bool,
    ) -> Result<(), UnknownFieldError> {
        let field = field.parse::<UniversityField>()?;
        let progress = self
            .university_specific
            .get_mut(name)
            .ok_or_else(|| UnknownFieldError::University(name.to_string()))?;
        progress.set(field, value);
        Ok(())
    }

    pub fn completed_requirements(&self) -> usize {
        Requirement::ALL
            .iter()
            .filter(|requirement| self.requirement(**requirement))
            .count()
    }
}

/// Share of generic requirements checked, over a fixed denominator of six.
pub fn overall_progress(state: &ChecklistState) -> f64 {
    state.completed_requirements() as f64 / Requirement::ALL.len() as f64
}

/// Share of the four application stages completed for one university.
pub fn university_progress(record: &UniversityProgress) -> f64 {
    record.completed_count() as f64 / UniversityField::ALL.len() as f64
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{
        overall_progress, university_progress, ChecklistState, Requirement, UniversityField,
        UniversityProgress, UnknownFieldError,
    };

    #[test]
    fn overall_progress_is_monotone_over_seven_steps() {
        let mut state = ChecklistState::default();
        let mut seen = vec![overall_progress(&state)];
        for requirement in Requirement::ALL {
            state.set(requirement, true);
            seen.push(overall_progress(&state));
        }
        assert_eq!(seen.len(), 7);
        for (k, value) in seen.iter().enumerate() {
            assert!((value - k as f64 / 6.0).abs() < 1e-12);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn three_of_six_is_half() {
        let mut state = ChecklistState::default();
        state.set(Requirement::Gre, true);
        state.set(Requirement::Sop, true);
        state.set(Requirement::Lors, true);
        assert_eq!(overall_progress(&state), 0.5);
    }

    #[test]
    fn university_progress_takes_quarter_steps() {
        let mut record = UniversityProgress::default();
        assert_eq!(university_progress(&record), 0.0);
        let expected = [0.25, 0.5, 0.75, 1.0];
        for (field, want) in UniversityField::ALL.into_iter().zip(expected) {
            record.set(field, true);
            assert_eq!(university_progress(&record), want);
        }
    }

    #[test]
    fn ensure_university_is_idempotent() {
        let mut state = ChecklistState::default();
        state.ensure_university("UC Davis").fee_paid = true;
        state.ensure_university("UC Davis");
        assert_eq!(state.university_specific.len(), 1);
        let entry = state.university("UC Davis").expect("entry should exist");
        assert!(entry.fee_paid);
        assert!(!entry.application_started);
    }

    #[test]
    fn string_keys_resolve_to_fixed_schema() {
        let mut state = ChecklistState::default();
        state.set_requirement("LORs", true).expect("LORs is a known key");
        state
            .set_requirement("statement of purpose", true)
            .expect("SOP alias should resolve");
        assert!(state.lors && state.sop);
        assert_eq!(
            state.set_requirement("IELTS", true),
            Err(UnknownFieldError::Requirement("IELTS".to_string()))
        );
        for requirement in Requirement::ALL {
            assert_eq!(Requirement::from_str(requirement.as_key()).unwrap(), requirement);
        }
        for field in UniversityField::ALL {
            assert_eq!(UniversityField::from_str(field.as_key()).unwrap(), field);
            assert_eq!(UniversityField::from_str(field.label()).unwrap(), field);
        }
    }

    #[test]
    fn university_fields_need_an_ensured_entry() {
        let mut state = ChecklistState::default();
        assert_eq!(
            state.set_university_field("UT Austin", "Fee_Paid", true),
            Err(UnknownFieldError::University("UT Austin".to_string()))
        );
        state.ensure_university("UT Austin");
        state
            .set_university_field("UT Austin", "documents-uploaded", true)
            .expect("field should resolve");
        assert!(state.university("UT Austin").unwrap().documents_uploaded);
        assert_eq!(
            state.set_university_field("UT Austin", "Interview", true),
            Err(UnknownFieldError::UniversityField("Interview".to_string()))
        );
    }

    #[test]
    fn serializes_with_snapshot_keys() {
        let mut state = ChecklistState::default();
        state.toefl = true;
        state.ensure_university("Texas A&M").application_submitted = true;
        let value = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(value["TOEFL"], true);
        assert_eq!(value["LORs"], false);
        assert_eq!(
            value["University_Specific"]["Texas A&M"]["Application_Submitted"],
            true
        );
        assert_eq!(value["University_Specific"]["Texas A&M"]["Fee_Paid"], false);
    }
}

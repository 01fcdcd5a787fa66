//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Patient gender as captured by the intake form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

/// Raw intake form input, before validation.
///
/// Everything is a string here because that is what the form hands over;
/// [`crate::intake`] turns this into a [`PatientRecord`] or rejects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientFields {
    pub name: String,
    /// ISO date string (YYYY-MM-DD)
    pub date_of_birth: String,
    pub gender: String,
    pub symptoms: Option<String>,
}

/// A validated patient record as persisted by intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Local UUID, generated at submission
    pub record_id: String,
    /// Patient name
    pub name: String,
    /// Date of birth (never in the future)
    pub date_of_birth: NaiveDate,
    /// Gender
    pub gender: Gender,
    /// Age in years, derived once at submission by year subtraction.
    /// Not re-derived later; can be off by one around birthdays
    /// (documented accuracy limitation).
    pub age: u32,
    /// Free-text symptoms, optional
    pub symptoms: Option<String>,
    /// Submission timestamp
    pub created_at: String,
}

impl PatientRecord {
    /// Build a record from already-validated parts.
    pub fn new(
        name: String,
        date_of_birth: NaiveDate,
        gender: Gender,
        age: u32,
        symptoms: Option<String>,
    ) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            name,
            date_of_birth,
            gender,
            age,
            symptoms,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

//! Patient intake: validation and submission.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{Gender, PatientFields, PatientRecord};
use crate::store::{keys, Storage, StoreError};

/// Intake errors.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Check the form without persisting anything.
///
/// Fails listing every blank required field (`name`, `date_of_birth`,
/// `gender`); symptoms are always valid. The date must parse as
/// YYYY-MM-DD and must not be in the future.
pub fn validate(fields: &PatientFields) -> IntakeResult<()> {
    parse_fields(fields, Utc::now().date_naive()).map(|_| ())
}

/// Validate, derive the age, and persist the resulting record.
///
/// The only side effect is the write under the patient key; no network
/// call happens here.
pub fn submit(fields: &PatientFields, storage: &Storage) -> IntakeResult<PatientRecord> {
    submit_at(fields, storage, Utc::now().date_naive())
}

/// [`submit`] with an explicit "today", so age derivation is
/// deterministic under test.
pub fn submit_at(
    fields: &PatientFields,
    storage: &Storage,
    today: NaiveDate,
) -> IntakeResult<PatientRecord> {
    let (date_of_birth, gender) = parse_fields(fields, today)?;

    // Year subtraction only, per the product's documented simplification;
    // month and day are ignored.
    let age = (today.year() - date_of_birth.year()) as u32;

    let record = PatientRecord::new(
        fields.name.trim().to_string(),
        date_of_birth,
        gender,
        age,
        fields
            .symptoms
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    );
    storage.save(keys::PATIENT, &record)?;
    Ok(record)
}

fn parse_fields(fields: &PatientFields, today: NaiveDate) -> IntakeResult<(NaiveDate, Gender)> {
    let mut missing = Vec::new();
    if fields.name.trim().is_empty() {
        missing.push("name".to_string());
    }
    if fields.date_of_birth.trim().is_empty() {
        missing.push("date_of_birth".to_string());
    }
    if fields.gender.trim().is_empty() {
        missing.push("gender".to_string());
    }
    if !missing.is_empty() {
        return Err(IntakeError::MissingFields(missing));
    }

    let date_of_birth = NaiveDate::parse_from_str(fields.date_of_birth.trim(), "%Y-%m-%d")
        .map_err(|e| IntakeError::InvalidField {
            field: "date_of_birth",
            reason: e.to_string(),
        })?;
    if date_of_birth > today {
        return Err(IntakeError::InvalidField {
            field: "date_of_birth",
            reason: "must not be in the future".into(),
        });
    }

    let gender = Gender::from_str(&fields.gender).map_err(|_| IntakeError::InvalidField {
        field: "gender",
        reason: format!("expected Male, Female or Other, got '{}'", fields.gender),
    })?;

    Ok((date_of_birth, gender))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    fn jane() -> PatientFields {
        PatientFields {
            name: "Jane".into(),
            date_of_birth: "1990-05-01".into(),
            gender: "Female".into(),
            symptoms: None,
        }
    }

    #[test]
    fn test_validate_lists_all_missing_fields() {
        let err = validate(&PatientFields::default()).unwrap_err();
        match err {
            IntakeError::MissingFields(missing) => {
                assert_eq!(missing, vec!["name", "date_of_birth", "gender"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_symptoms_always_valid() {
        let mut fields = jane();
        fields.symptoms = Some("   ".into());
        assert!(validate(&fields).is_ok());
    }

    #[test]
    fn test_future_date_rejected() {
        let mut fields = jane();
        fields.date_of_birth = "2999-01-01".into();
        assert!(matches!(
            validate(&fields),
            Err(IntakeError::InvalidField {
                field: "date_of_birth",
                ..
            })
        ));
    }

    #[test]
    fn test_unparsable_date_rejected() {
        let mut fields = jane();
        fields.date_of_birth = "01/05/1990".into();
        assert!(matches!(
            validate(&fields),
            Err(IntakeError::InvalidField {
                field: "date_of_birth",
                ..
            })
        ));
    }

    #[test]
    fn test_submit_derives_age_by_year_subtraction() {
        let storage = storage();
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let record = submit_at(&jane(), &storage, today).unwrap();

        // 2024 - 1990, even though the May birthday has not passed yet.
        assert_eq!(record.age, 34);
        assert_eq!(record.gender, Gender::Female);
    }

    #[test]
    fn test_submit_persists_record() {
        let storage = storage();
        let record = submit(&jane(), &storage).unwrap();

        let loaded: PatientRecord = storage.load(keys::PATIENT).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_submit_propagates_store_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_failing(true);
        let storage = Storage::new(store);

        assert!(matches!(
            submit(&jane(), &storage),
            Err(IntakeError::Store(_))
        ));
    }

    #[test]
    fn test_empty_symptoms_normalized_to_none() {
        let storage = storage();
        let mut fields = jane();
        fields.symptoms = Some("  ".into());
        let record = submit(&fields, &storage).unwrap();
        assert_eq!(record.symptoms, None);
    }
}

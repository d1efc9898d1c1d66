//! Append-only historical records attached to a patient.
//!
//! Every record type has a stored form (with `id` and `patient_id`) and a
//! `New*` payload used by the record sub-forms. Records are never edited in
//! place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::patient::not_in_future;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClinicalFeature {
    pub id: i64,
    pub patient_id: i64,
    pub record_date: NaiveDate,
    pub recurrent_fever: bool,
    pub lymphadenopathy: bool,
    pub hepatosplenomegaly: bool,
    pub eczema: bool,
    pub autoimmunity: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewClinicalFeature {
    #[validate(custom = "not_in_future")]
    pub record_date: NaiveDate,
    #[serde(default)]
    pub recurrent_fever: bool,
    #[serde(default)]
    pub lymphadenopathy: bool,
    #[serde(default)]
    pub hepatosplenomegaly: bool,
    #[serde(default)]
    pub eczema: bool,
    #[serde(default)]
    pub autoimmunity: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FamilyHistory {
    pub id: i64,
    pub patient_id: i64,
    pub record_date: NaiveDate,
    pub relation: String,
    pub condition: String,
    pub deceased: bool,
    pub age_at_death: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "age_at_death_requires_deceased"))]
pub struct NewFamilyHistory {
    #[validate(custom = "not_in_future")]
    pub record_date: NaiveDate,
    #[validate(length(min = 1))]
    pub relation: String,
    #[validate(length(min = 1))]
    pub condition: String,
    #[serde(default)]
    pub deceased: bool,
    #[validate(range(min = 0, max = 130))]
    pub age_at_death: Option<i32>,
    pub notes: Option<String>,
}

fn age_at_death_requires_deceased(history: &NewFamilyHistory) -> Result<(), ValidationError> {
    if history.age_at_death.is_some() && !history.deceased {
        return Err(ValidationError::new("age_at_death_without_death"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Hospitalization {
    pub id: i64,
    pub patient_id: i64,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    pub reason: String,
    pub icu: bool,
    pub notes: Option<String>,
}

impl Hospitalization {
    /// Length of stay in days; `None` while the patient is still admitted.
    pub fn length_of_stay(&self) -> Option<i64> {
        self.discharge_date
            .map(|discharge| (discharge - self.admission_date).num_days())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "discharge_after_admission"))]
pub struct NewHospitalization {
    #[validate(custom = "not_in_future")]
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(default)]
    pub icu: bool,
    pub notes: Option<String>,
}

fn discharge_after_admission(stay: &NewHospitalization) -> Result<(), ValidationError> {
    match stay.discharge_date {
        Some(discharge) if discharge < stay.admission_date => {
            Err(ValidationError::new("discharge_before_admission"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Infection {
    pub id: i64,
    pub patient_id: i64,
    pub onset_date: NaiveDate,
    pub infection_type: String,
    pub site: Option<String>,
    pub pathogen: Option<String>,
    pub required_iv_antibiotics: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewInfection {
    #[validate(custom = "not_in_future")]
    pub onset_date: NaiveDate,
    #[validate(length(min = 1))]
    pub infection_type: String,
    pub site: Option<String>,
    pub pathogen: Option<String>,
    #[serde(default)]
    pub required_iv_antibiotics: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LabResult {
    pub id: i64,
    pub patient_id: i64,
    pub test_date: NaiveDate,
    pub test_name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub reference_low: Option<f64>,
    pub reference_high: Option<f64>,
    pub notes: Option<String>,
}

impl LabResult {
    /// True when the value falls outside whichever reference bounds are set.
    pub fn is_out_of_range(&self) -> bool {
        let Some(value) = self.value else {
            return false;
        };
        self.reference_low.map_or(false, |low| value < low)
            || self.reference_high.map_or(false, |high| value > high)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "reference_range_ordered"))]
pub struct NewLabResult {
    #[validate(custom = "not_in_future")]
    pub test_date: NaiveDate,
    #[validate(length(min = 1))]
    pub test_name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub reference_low: Option<f64>,
    pub reference_high: Option<f64>,
    pub notes: Option<String>,
}

fn reference_range_ordered(lab: &NewLabResult) -> Result<(), ValidationError> {
    match (lab.reference_low, lab.reference_high) {
        (Some(low), Some(high)) if low > high => Err(ValidationError::new("inverted_range")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Treatment {
    pub id: i64,
    pub patient_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub treatment_type: String,
    pub drug_name: Option<String>,
    pub dose: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTreatment {
    #[validate(custom = "not_in_future")]
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub treatment_type: String,
    pub drug_name: Option<String>,
    pub dose: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vaccination {
    pub id: i64,
    pub patient_id: i64,
    pub vaccine_date: NaiveDate,
    pub vaccine_name: String,
    pub dose_number: Option<i32>,
    pub adverse_reaction: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVaccination {
    #[validate(custom = "not_in_future")]
    pub vaccine_date: NaiveDate,
    #[validate(length(min = 1))]
    pub vaccine_name: String,
    #[validate(range(min = 1, max = 10))]
    pub dose_number: Option<i32>,
    pub adverse_reaction: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lab(value: Option<f64>, low: Option<f64>, high: Option<f64>) -> LabResult {
        LabResult {
            id: 1,
            patient_id: 1,
            test_date: date(2024, 1, 5),
            test_name: "IgG".into(),
            value,
            unit: Some("mg/dL".into()),
            reference_low: low,
            reference_high: high,
            notes: None,
        }
    }

    #[test]
    fn lab_range_checks_each_bound() {
        assert!(lab(Some(250.0), Some(400.0), Some(1300.0)).is_out_of_range());
        assert!(lab(Some(1500.0), Some(400.0), Some(1300.0)).is_out_of_range());
        assert!(!lab(Some(800.0), Some(400.0), Some(1300.0)).is_out_of_range());
        assert!(!lab(Some(250.0), None, None).is_out_of_range());
        assert!(!lab(None, Some(400.0), None).is_out_of_range());
    }

    #[test]
    fn inverted_reference_range_is_rejected() {
        let new = NewLabResult {
            test_date: date(2024, 1, 5),
            test_name: "IgA".into(),
            value: Some(10.0),
            unit: None,
            reference_low: Some(50.0),
            reference_high: Some(20.0),
            notes: None,
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn discharge_before_admission_is_rejected() {
        let stay = NewHospitalization {
            admission_date: date(2024, 2, 10),
            discharge_date: Some(date(2024, 2, 1)),
            reason: "Pnömoni".into(),
            icu: false,
            notes: None,
        };
        assert!(stay.validate().is_err());
    }

    #[test]
    fn age_at_death_needs_deceased_flag() {
        let history = NewFamilyHistory {
            record_date: date(2024, 2, 10),
            relation: "Kardeş".into(),
            condition: "Enfeksiyon".into(),
            deceased: false,
            age_at_death: Some(2),
            notes: None,
        };
        assert!(history.validate().is_err());
    }

    #[test]
    fn length_of_stay_counts_days() {
        let stay = Hospitalization {
            id: 1,
            patient_id: 1,
            admission_date: date(2024, 2, 1),
            discharge_date: Some(date(2024, 2, 8)),
            reason: "Sepsis".into(),
            icu: true,
            notes: None,
        };
        assert_eq!(stay.length_of_stay(), Some(7));
    }
}

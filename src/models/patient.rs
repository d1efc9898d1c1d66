use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "erkek")]
    Male,
    #[serde(alias = "kız", alias = "kiz")]
    Female,
}

impl Gender {
    /// Sex code expected by the prediction service.
    pub fn ml_code(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub birth_weight_g: Option<f64>,
    pub gestational_age_weeks: Option<i32>,
    pub cord_fall_day: Option<i32>,
    pub parental_consanguinity: bool,
    pub diagnosis: Option<String>,
    pub diagnosis_date: Option<NaiveDate>,
    // Mirrored from the newest risk assessment
    pub rule_based_score: Option<i32>,
    pub final_risk_level: Option<String>,
    pub ml_score: Option<f64>,
    pub last_assessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Lowercases `text` with Turkish casing rules.
///
/// `İ` folds to `i` and `I` to `ı`; everything else uses Unicode lowercasing,
/// which SQLite's `LOWER()` only does for ASCII.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'İ' => folded.push('i'),
            'I' => folded.push('ı'),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded
}

/// Key stored alongside a patient and matched by the name search.
pub fn search_name(first_name: &str, last_name: &str) -> String {
    fold_case(&format!("{} {}", first_name.trim(), last_name.trim()))
}

impl Patient {
    /// Age in years on `today`, two decimal places.
    pub fn age_years(&self, today: NaiveDate) -> f64 {
        let days = (today - self.birth_date).num_days().max(0) as f64;
        (days / 365.25 * 100.0).round() / 100.0
    }

    /// Completed months of age on `today`.
    pub fn age_months(&self, today: NaiveDate) -> i32 {
        let mut months = (today.year() - self.birth_date.year()) * 12
            + today.month() as i32
            - self.birth_date.month() as i32;
        if today.day() < self.birth_date.day() {
            months -= 1;
        }
        months.max(0)
    }
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPatient {
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[validate(custom = "not_in_future")]
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[validate(range(min = 20.0, max = 250.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 0.3, max = 200.0))]
    pub weight_kg: Option<f64>,
    #[validate(range(min = 300.0, max = 7000.0))]
    pub birth_weight_g: Option<f64>,
    #[validate(range(min = 20, max = 45))]
    pub gestational_age_weeks: Option<i32>,
    #[validate(range(min = 0, max = 90))]
    pub cord_fall_day: Option<i32>,
    #[serde(default)]
    pub parental_consanguinity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiagnosisUpdate {
    #[validate(custom = "not_blank")]
    pub diagnosis: String,
    #[validate(custom = "not_in_future")]
    pub diagnosis_date: NaiveDate,
}

/// Filters for the patient list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientQuery {
    /// Case-insensitive match on first or last name
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub(crate) fn not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        return Err(ValidationError::new("future_date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_patient() -> NewPatient {
        NewPatient {
            first_name: "Elif".into(),
            last_name: "Yılmaz".into(),
            birth_date: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
            gender: Gender::Female,
            height_cm: Some(92.0),
            weight_kg: Some(13.4),
            birth_weight_g: Some(3100.0),
            gestational_age_weeks: Some(39),
            cord_fall_day: Some(9),
            parental_consanguinity: false,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(new_patient().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = new_patient();
        p.first_name = "   ".into();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut p = new_patient();
        p.birth_date = Utc::now().date_naive() + Duration::days(3);
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("birth_date"));
    }

    #[test]
    fn implausible_measurements_are_rejected() {
        let mut p = new_patient();
        p.birth_weight_g = Some(50.0);
        p.cord_fall_day = Some(120);
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("birth_weight_g"));
        assert!(errors.field_errors().contains_key("cord_fall_day"));
    }

    #[test]
    fn gender_accepts_turkish_labels() {
        let g: Gender = serde_json::from_str("\"erkek\"").unwrap();
        assert_eq!(g, Gender::Male);
        let g: Gender = serde_json::from_str("\"kız\"").unwrap();
        assert_eq!(g.ml_code(), 0);
    }

    #[test]
    fn fold_case_follows_turkish_dotted_and_dotless_i() {
        assert_eq!(fold_case("ÇELİK"), "çelik");
        assert_eq!(fold_case("IŞIK"), "ışık");
        assert_eq!(fold_case("Öztürk Ğ Ü"), "öztürk ğ ü");
        assert_eq!(search_name("  Ayşe ", "Demir"), "ayşe demir");
    }
}

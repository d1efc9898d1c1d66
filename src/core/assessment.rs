//! Assessment pipeline: rule score, ML prediction, audit row.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use super::ml::{MlFeatures, MlPrediction, RiskPredictor};
use super::rules;
use crate::db::Database;
use crate::error::AppError;
use crate::models::assessment::NewRiskAssessment;
use crate::models::{ClinicalIndicators, Patient, RiskAssessment, RiskLevel};

/// Runs one assessment per call; holds no state between calls.
#[derive(Clone)]
pub struct AssessmentService {
    db: Database,
    predictor: Arc<dyn RiskPredictor>,
}

impl AssessmentService {
    pub fn new(db: Database, predictor: Arc<dyn RiskPredictor>) -> Self {
        Self { db, predictor }
    }

    /// Score `indicators` for a patient and persist the result.
    ///
    /// Nothing is written when the prediction service fails.
    #[instrument(skip(self, indicators))]
    pub async fn assess(
        &self,
        patient_id: i64,
        indicators: ClinicalIndicators,
    ) -> Result<RiskAssessment, AppError> {
        let patient = self.db.require_patient(patient_id).await?;
        let today = Utc::now().date_naive();
        validate_demographics(&patient, today)?;

        if consanguinity_disagrees(&patient, &indicators) {
            warn!(
                patient_id,
                on_record = patient.parental_consanguinity,
                submitted = indicators.parental_consanguinity,
                "submitted consanguinity differs from the patient record"
            );
        }

        let score = rules::score(&indicators);
        let bucket = rules::risk_bucket(score);

        let features = build_features(&patient, indicators, today);
        let prediction = self.predictor.predict(&features).await.map_err(|e| {
            warn!(patient_id, error = %e, "prediction failed, assessment not saved");
            AppError::MlUnavailable(e)
        })?;

        let new = NewRiskAssessment {
            patient_id,
            assessed_at: Utc::now(),
            rule_based_score: score,
            rule_risk_level: bucket,
            ml_prediction: prediction.prediction_code(),
            ml_probability: prediction.probability,
            ml_risk_level: prediction.risk_level.clone(),
            ml_message: prediction.message.clone(),
            final_risk_level: final_risk_level(bucket, &prediction),
            recommendation: prediction.recommendation().to_string(),
            features_json: serde_json::to_string(&features)?,
        };

        let stored = self.db.record_assessment(&new).await?;
        info!(
            patient_id,
            score,
            ml_probability = ?stored.ml_probability,
            "assessment completed"
        );
        Ok(stored)
    }
}

/// Demographic checks that must hold before anything is scored.
pub fn validate_demographics(patient: &Patient, today: NaiveDate) -> Result<(), AppError> {
    if patient.first_name.trim().is_empty() || patient.last_name.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "patient {} has no name on record",
            patient.id
        )));
    }
    if patient.birth_date > today {
        return Err(AppError::Validation(format!(
            "patient {} has a birth date in the future",
            patient.id
        )));
    }
    Ok(())
}

/// The submitted flag is scored as sent; a disagreement is only reported.
pub fn consanguinity_disagrees(patient: &Patient, indicators: &ClinicalIndicators) -> bool {
    patient.parental_consanguinity != indicators.parental_consanguinity
}

pub fn build_features(
    patient: &Patient,
    indicators: ClinicalIndicators,
    today: NaiveDate,
) -> MlFeatures {
    MlFeatures {
        indicators,
        age_years: patient.age_years(today),
        sex: patient.gender.ml_code(),
        cord_fall_day: patient.cord_fall_day.unwrap_or(0),
    }
}

/// The more severe of the rule bucket and the service's label.
pub fn final_risk_level(bucket: RiskLevel, prediction: &MlPrediction) -> RiskLevel {
    match RiskLevel::from_label(&prediction.risk_level) {
        Some(ml_level) => bucket.max(ml_level),
        None => bucket,
    }
}

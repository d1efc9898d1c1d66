use sqlx::SqliteConnection;
use tracing::{info, instrument};

use super::Database;
use crate::error::AppError;
use crate::models::assessment::{NewRiskAssessment, RiskAssessment};

impl Database {
    /// Write the audit row and refresh the patient's mirrored fields in a
    /// single transaction.
    #[instrument(skip(self, assessment), fields(patient_id = assessment.patient_id))]
    pub async fn record_assessment(
        &self,
        assessment: &NewRiskAssessment,
    ) -> Result<RiskAssessment, AppError> {
        let mut tx = self.pool.begin().await?;

        let stored = sqlx::query_as::<_, RiskAssessment>(
            "INSERT INTO risk_assessments (
                patient_id, assessed_at, rule_based_score, rule_risk_level,
                ml_prediction, ml_probability, ml_risk_level, ml_message,
                final_risk_level, recommendation, features_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(assessment.patient_id)
        .bind(assessment.assessed_at)
        .bind(assessment.rule_based_score)
        .bind(assessment.rule_risk_level.label())
        .bind(assessment.ml_prediction)
        .bind(assessment.ml_probability)
        .bind(&assessment.ml_risk_level)
        .bind(&assessment.ml_message)
        .bind(assessment.final_risk_level.label())
        .bind(&assessment.recommendation)
        .bind(&assessment.features_json)
        .fetch_one(&mut *tx)
        .await?;

        mirror_latest_assessment(&mut tx, assessment.patient_id).await?;

        tx.commit().await?;

        info!(
            assessment_id = stored.id,
            score = stored.rule_based_score,
            final_risk = %stored.final_risk_level,
            "risk assessment recorded"
        );
        Ok(stored)
    }

    /// Assessment history, newest first.
    #[instrument(skip(self))]
    pub async fn list_assessments(&self, patient_id: i64) -> Result<Vec<RiskAssessment>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, RiskAssessment>(
            "SELECT * FROM risk_assessments WHERE patient_id = ?
             ORDER BY assessed_at DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn latest_assessment(&self, patient_id: i64) -> Result<Option<RiskAssessment>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, RiskAssessment>(
            "SELECT * FROM risk_assessments WHERE patient_id = ?
             ORDER BY assessed_at DESC, id DESC
             LIMIT 1",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn get_assessment(&self, id: i64) -> Result<Option<RiskAssessment>, AppError> {
        Ok(sqlx::query_as::<_, RiskAssessment>("SELECT * FROM risk_assessments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// Read-model step: copy the newest assessment row onto the patient.
///
/// Run inside the transaction that wrote the assessment, so the patient's
/// mirrored fields always describe exactly one stored row.
pub async fn mirror_latest_assessment(
    conn: &mut SqliteConnection,
    patient_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE patients
         SET (rule_based_score, final_risk_level, ml_score, last_assessed_at) = (
             SELECT rule_based_score, final_risk_level, ml_probability, assessed_at
             FROM risk_assessments
             WHERE patient_id = ?1
             ORDER BY assessed_at DESC, id DESC
             LIMIT 1
         )
         WHERE id = ?1",
    )
    .bind(patient_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

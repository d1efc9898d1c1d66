use chrono::Utc;
use tracing::{info, instrument};

use super::Database;
use crate::error::AppError;
use crate::models::assessment::{DashboardSummary, RiskLevelCount};
use crate::models::patient::{
    fold_case, search_name, DiagnosisUpdate, NewPatient, Patient, PatientQuery,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

impl Database {
    #[instrument(skip(self, patient))]
    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, AppError> {
        let created = sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (
                first_name, last_name, search_name, birth_date, gender,
                height_cm, weight_kg, birth_weight_g, gestational_age_weeks,
                cord_fall_day, parental_consanguinity, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient.first_name.trim())
        .bind(patient.last_name.trim())
        .bind(search_name(&patient.first_name, &patient.last_name))
        .bind(patient.birth_date)
        .bind(patient.gender)
        .bind(patient.height_cm)
        .bind(patient.weight_kg)
        .bind(patient.birth_weight_g)
        .bind(patient.gestational_age_weeks)
        .bind(patient.cord_fall_day)
        .bind(patient.parental_consanguinity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(patient_id = created.id, "patient registered");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_patient(&self, id: i64) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    /// Like [`Database::get_patient`] but a missing patient is an error.
    pub async fn require_patient(&self, id: i64) -> Result<Patient, AppError> {
        self.get_patient(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("patient {id}")))
    }

    pub(crate) async fn ensure_patient_exists(&self, id: i64) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("patient {id}")));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<Patient>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0).max(0);

        let patients = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let pattern = format!("%{}%", escape_like(&fold_case(q)));
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients
                     WHERE search_name LIKE ?1 ESCAPE '\\'
                     ORDER BY last_name, first_name, id
                     LIMIT ?2 OFFSET ?3",
                )
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Patient>(
                    "SELECT * FROM patients
                     ORDER BY last_name, first_name, id
                     LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(patients)
    }

    #[instrument(skip(self, update))]
    pub async fn update_diagnosis(
        &self,
        id: i64,
        update: &DiagnosisUpdate,
    ) -> Result<Patient, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            "UPDATE patients SET diagnosis = ?, diagnosis_date = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(update.diagnosis.trim())
        .bind(update.diagnosis_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("patient {id}")))?;

        info!(patient_id = id, "diagnosis updated");
        Ok(patient)
    }

    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, AppError> {
        let total_patients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;
        let total_assessments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM risk_assessments")
            .fetch_one(&self.pool)
            .await?;
        let never_assessed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE final_risk_level IS NULL")
                .fetch_one(&self.pool)
                .await?;
        let by_risk_level = sqlx::query_as::<_, RiskLevelCount>(
            "SELECT final_risk_level AS risk_level, COUNT(*) AS patients
             FROM patients
             WHERE final_risk_level IS NOT NULL
             GROUP BY final_risk_level
             ORDER BY patients DESC, final_risk_level",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardSummary {
            total_patients,
            total_assessments,
            never_assessed,
            by_risk_level,
        })
    }
}

/// Makes `%` and `_` in user input match literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

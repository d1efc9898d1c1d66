//! Insert/list queries for the append-only patient records.

use tracing::{debug, instrument};

use super::Database;
use crate::error::AppError;
use crate::models::records::*;

impl Database {
    // ===== Clinical features =====

    #[instrument(skip(self, record))]
    pub async fn add_clinical_feature(
        &self,
        patient_id: i64,
        record: &NewClinicalFeature,
    ) -> Result<ClinicalFeature, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, ClinicalFeature>(
            "INSERT INTO clinical_features (
                patient_id, record_date, recurrent_fever, lymphadenopathy,
                hepatosplenomegaly, eczema, autoimmunity, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.record_date)
        .bind(record.recurrent_fever)
        .bind(record.lymphadenopathy)
        .bind(record.hepatosplenomegaly)
        .bind(record.eczema)
        .bind(record.autoimmunity)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "clinical feature recorded");
        Ok(row)
    }

    pub async fn list_clinical_features(&self, patient_id: i64) -> Result<Vec<ClinicalFeature>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, ClinicalFeature>(
            "SELECT * FROM clinical_features WHERE patient_id = ?
             ORDER BY record_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Family history =====

    #[instrument(skip(self, record))]
    pub async fn add_family_history(
        &self,
        patient_id: i64,
        record: &NewFamilyHistory,
    ) -> Result<FamilyHistory, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, FamilyHistory>(
            "INSERT INTO family_history (
                patient_id, record_date, relation, condition, deceased, age_at_death, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.record_date)
        .bind(&record.relation)
        .bind(&record.condition)
        .bind(record.deceased)
        .bind(record.age_at_death)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "family history recorded");
        Ok(row)
    }

    pub async fn list_family_history(&self, patient_id: i64) -> Result<Vec<FamilyHistory>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, FamilyHistory>(
            "SELECT * FROM family_history WHERE patient_id = ?
             ORDER BY record_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Hospitalizations =====

    #[instrument(skip(self, record))]
    pub async fn add_hospitalization(
        &self,
        patient_id: i64,
        record: &NewHospitalization,
    ) -> Result<Hospitalization, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, Hospitalization>(
            "INSERT INTO hospitalizations (
                patient_id, admission_date, discharge_date, reason, icu, notes
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.admission_date)
        .bind(record.discharge_date)
        .bind(&record.reason)
        .bind(record.icu)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "hospitalization recorded");
        Ok(row)
    }

    pub async fn list_hospitalizations(&self, patient_id: i64) -> Result<Vec<Hospitalization>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, Hospitalization>(
            "SELECT * FROM hospitalizations WHERE patient_id = ?
             ORDER BY admission_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Infections =====

    #[instrument(skip(self, record))]
    pub async fn add_infection(
        &self,
        patient_id: i64,
        record: &NewInfection,
    ) -> Result<Infection, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, Infection>(
            "INSERT INTO infections (
                patient_id, onset_date, infection_type, site, pathogen,
                required_iv_antibiotics, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.onset_date)
        .bind(&record.infection_type)
        .bind(&record.site)
        .bind(&record.pathogen)
        .bind(record.required_iv_antibiotics)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "infection recorded");
        Ok(row)
    }

    pub async fn list_infections(&self, patient_id: i64) -> Result<Vec<Infection>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, Infection>(
            "SELECT * FROM infections WHERE patient_id = ?
             ORDER BY onset_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Lab results =====

    #[instrument(skip(self, record), fields(test = %record.test_name))]
    pub async fn add_lab_result(
        &self,
        patient_id: i64,
        record: &NewLabResult,
    ) -> Result<LabResult, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, LabResult>(
            "INSERT INTO lab_results (
                patient_id, test_date, test_name, value, unit,
                reference_low, reference_high, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.test_date)
        .bind(&record.test_name)
        .bind(record.value)
        .bind(&record.unit)
        .bind(record.reference_low)
        .bind(record.reference_high)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        if row.is_out_of_range() {
            debug!(record_id = row.id, "lab result outside reference range");
        }
        Ok(row)
    }

    pub async fn list_lab_results(&self, patient_id: i64) -> Result<Vec<LabResult>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, LabResult>(
            "SELECT * FROM lab_results WHERE patient_id = ?
             ORDER BY test_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Treatments =====

    #[instrument(skip(self, record))]
    pub async fn add_treatment(
        &self,
        patient_id: i64,
        record: &NewTreatment,
    ) -> Result<Treatment, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, Treatment>(
            "INSERT INTO treatments (
                patient_id, start_date, end_date, treatment_type, drug_name, dose, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.treatment_type)
        .bind(&record.drug_name)
        .bind(&record.dose)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "treatment recorded");
        Ok(row)
    }

    pub async fn list_treatments(&self, patient_id: i64) -> Result<Vec<Treatment>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, Treatment>(
            "SELECT * FROM treatments WHERE patient_id = ?
             ORDER BY start_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ===== Vaccinations =====

    #[instrument(skip(self, record), fields(vaccine = %record.vaccine_name))]
    pub async fn add_vaccination(
        &self,
        patient_id: i64,
        record: &NewVaccination,
    ) -> Result<Vaccination, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        let row = sqlx::query_as::<_, Vaccination>(
            "INSERT INTO vaccinations (
                patient_id, vaccine_date, vaccine_name, dose_number, adverse_reaction, notes
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *",
        )
        .bind(patient_id)
        .bind(record.vaccine_date)
        .bind(&record.vaccine_name)
        .bind(record.dose_number)
        .bind(&record.adverse_reaction)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;
        debug!(record_id = row.id, "vaccination recorded");
        Ok(row)
    }

    pub async fn list_vaccinations(&self, patient_id: i64) -> Result<Vec<Vaccination>, AppError> {
        self.ensure_patient_exists(patient_id).await?;
        Ok(sqlx::query_as::<_, Vaccination>(
            "SELECT * FROM vaccinations WHERE patient_id = ?
             ORDER BY vaccine_date DESC, id DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

use actix_web::{web, HttpResponse};
use validator::Validate;

use super::AppState;
use crate::error::AppError;
use crate::models::assessment::AssessmentRequest;
use crate::models::patient::{DiagnosisUpdate, NewPatient, PatientQuery};
use crate::models::records::*;

type ApiResult = Result<HttpResponse, AppError>;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn dashboard(state: web::Data<AppState>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.dashboard_summary().await?))
}

// ===== Patients =====

pub async fn list_patients(state: web::Data<AppState>, query: web::Query<PatientQuery>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_patients(&query).await?))
}

pub async fn create_patient(state: web::Data<AppState>, body: web::Json<NewPatient>) -> ApiResult {
    body.validate()?;
    let patient = state.db.create_patient(&body).await?;
    Ok(HttpResponse::Created().json(patient))
}

pub async fn get_patient(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.require_patient(*path).await?))
}

pub async fn update_diagnosis(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<DiagnosisUpdate>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Ok().json(state.db.update_diagnosis(*path, &body).await?))
}

// ===== Patient records =====

pub async fn list_clinical_features(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_clinical_features(*path).await?))
}

pub async fn add_clinical_feature(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewClinicalFeature>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_clinical_feature(*path, &body).await?))
}

pub async fn list_family_history(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_family_history(*path).await?))
}

pub async fn add_family_history(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewFamilyHistory>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_family_history(*path, &body).await?))
}

pub async fn list_hospitalizations(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_hospitalizations(*path).await?))
}

pub async fn add_hospitalization(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewHospitalization>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_hospitalization(*path, &body).await?))
}

pub async fn list_infections(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_infections(*path).await?))
}

pub async fn add_infection(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewInfection>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_infection(*path, &body).await?))
}

pub async fn list_lab_results(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_lab_results(*path).await?))
}

pub async fn add_lab_result(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewLabResult>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_lab_result(*path, &body).await?))
}

pub async fn list_treatments(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_treatments(*path).await?))
}

pub async fn add_treatment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewTreatment>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_treatment(*path, &body).await?))
}

pub async fn list_vaccinations(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_vaccinations(*path).await?))
}

pub async fn add_vaccination(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewVaccination>,
) -> ApiResult {
    body.validate()?;
    Ok(HttpResponse::Created().json(state.db.add_vaccination(*path, &body).await?))
}

// ===== Risk assessments =====

pub async fn run_assessment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AssessmentRequest>,
) -> ApiResult {
    let request = body.into_inner();
    let stored = state.assessments.assess(*path, request.indicators).await?;
    Ok(HttpResponse::Created().json(stored))
}

pub async fn list_assessments(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.db.list_assessments(*path).await?))
}

pub async fn latest_assessment(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let patient_id = *path;
    let latest = state
        .db
        .latest_assessment(patient_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no assessment for patient {patient_id}")))?;
    Ok(HttpResponse::Ok().json(latest))
}

pub async fn get_assessment(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let id = *path;
    let assessment = state
        .db
        .get_assessment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("assessment {id}")))?;
    Ok(HttpResponse::Ok().json(assessment))
}

use actix_web::web;

use super::handlers;
use crate::error::AppError;

/// Register every route on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(handlers::health))
    .service(
        web::scope("/api")
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/assessments/{id}", web::get().to(handlers::get_assessment))
            .service(
                web::scope("/patients")
                    .route("", web::get().to(handlers::list_patients))
                    .route("", web::post().to(handlers::create_patient))
                    .route("/{id}", web::get().to(handlers::get_patient))
                    .route("/{id}/diagnosis", web::put().to(handlers::update_diagnosis))
                    .route(
                        "/{id}/clinical-features",
                        web::get().to(handlers::list_clinical_features),
                    )
                    .route(
                        "/{id}/clinical-features",
                        web::post().to(handlers::add_clinical_feature),
                    )
                    .route("/{id}/family-history", web::get().to(handlers::list_family_history))
                    .route("/{id}/family-history", web::post().to(handlers::add_family_history))
                    .route(
                        "/{id}/hospitalizations",
                        web::get().to(handlers::list_hospitalizations),
                    )
                    .route(
                        "/{id}/hospitalizations",
                        web::post().to(handlers::add_hospitalization),
                    )
                    .route("/{id}/infections", web::get().to(handlers::list_infections))
                    .route("/{id}/infections", web::post().to(handlers::add_infection))
                    .route("/{id}/lab-results", web::get().to(handlers::list_lab_results))
                    .route("/{id}/lab-results", web::post().to(handlers::add_lab_result))
                    .route("/{id}/treatments", web::get().to(handlers::list_treatments))
                    .route("/{id}/treatments", web::post().to(handlers::add_treatment))
                    .route("/{id}/vaccinations", web::get().to(handlers::list_vaccinations))
                    .route("/{id}/vaccinations", web::post().to(handlers::add_vaccination))
                    .route("/{id}/assessments", web::get().to(handlers::list_assessments))
                    .route("/{id}/assessments", web::post().to(handlers::run_assessment))
                    .route(
                        "/{id}/assessments/latest",
                        web::get().to(handlers::latest_assessment),
                    ),
            ),
    );
}

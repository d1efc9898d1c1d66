use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use immunoscreen::api::{self, AppState};
use immunoscreen::config::MlConfig;
use immunoscreen::core::{AssessmentService, MlClient};
use immunoscreen::db::Database;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn state_for(ml_url: &str) -> web::Data<AppState> {
    let db = Database::in_memory().await.unwrap();
    let client = MlClient::new(&MlConfig {
        service_url: ml_url.to_string(),
        timeout_secs: Some(5),
    })
    .unwrap();
    web::Data::new(AppState {
        assessments: AssessmentService::new(db.clone(), Arc::new(client)),
        db,
    })
}

fn patient_body() -> Value {
    json!({
        "first_name": "Ali",
        "last_name": "Çelik",
        "birth_date": "2021-05-10",
        "gender": "erkek",
        "cord_fall_day": 31,
        "parental_consanguinity": true
    })
}

#[actix_web::test]
async fn assessment_round_trip_through_http() {
    let ml = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prediction": 1,
            "probability": 0.77,
            "risk_level": "Yüksek Risk"
        })))
        .expect(1)
        .mount(&ml)
        .await;

    let state = state_for(&ml.uri()).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/patients")
        .set_json(patient_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let patient: Value = test::read_body_json(resp).await;
    let id = patient["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/patients/{id}/assessments"))
        .set_json(json!({
            "otit_4_ve_uzeri": true,
            "akraba_evliligi": true,
            "ailede_erken_olum": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let assessment: Value = test::read_body_json(resp).await;
    assert_eq!(assessment["rule_based_score"], 5);
    assert_eq!(assessment["rule_risk_level"], "Orta Risk");
    assert_eq!(assessment["final_risk_level"], "Yüksek Risk");

    // The feature vector sent upstream is kept verbatim
    let features: Value =
        serde_json::from_str(assessment["features_json"].as_str().unwrap()).unwrap();
    assert_eq!(features["otit_4_ve_uzeri"], true);
    assert_eq!(features["cinsiyet"], 1);
    assert_eq!(features["gobek_dusme_gunu"], 31);

    let req = test::TestRequest::get().uri(&format!("/api/patients/{id}")).to_request();
    let patient: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(patient["rule_based_score"], 5);
    assert_eq!(patient["ml_score"], 0.77);
    assert_eq!(patient["final_risk_level"], "Yüksek Risk");

    let req = test::TestRequest::get()
        .uri(&format!("/api/patients/{id}/assessments/latest"))
        .to_request();
    let latest: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(latest["id"], assessment["id"]);

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["total_assessments"], 1);
    assert_eq!(summary["never_assessed"], 0);
}

#[actix_web::test]
async fn ml_outage_is_reported_and_nothing_is_saved() {
    let ml = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ml)
        .await;

    let state = state_for(&ml.uri()).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/patients")
        .set_json(patient_body())
        .to_request();
    let patient: Value = test::call_and_read_body_json(&app, req).await;
    let id = patient["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/patients/{id}/assessments"))
        .set_json(json!({ "hastane_yatisi": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "ML_SERVICE_UNAVAILABLE");

    let req = test::TestRequest::get()
        .uri(&format!("/api/patients/{id}/assessments"))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history.as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/patients/{id}/assessments/latest"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let stored = state.db.require_patient(id).await.unwrap();
    assert!(stored.final_risk_level.is_none());
}

#[actix_web::test]
async fn invalid_registration_is_rejected() {
    let state = state_for("http://127.0.0.1:1").await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let mut body = patient_body();
    body["first_name"] = json!("");
    let req = test::TestRequest::post()
        .uri("/api/patients")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing gender fails JSON extraction
    let req = test::TestRequest::post()
        .uri("/api/patients")
        .set_json(json!({ "first_name": "A", "last_name": "B", "birth_date": "2022-01-01" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");

    let req = test::TestRequest::get().uri("/api/patients").to_request();
    let patients: Value = test::call_and_read_body_json(&app, req).await;
    assert!(patients.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn records_are_appended_and_listed() {
    let state = state_for("http://127.0.0.1:1").await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/patients")
        .set_json(patient_body())
        .to_request();
    let patient: Value = test::call_and_read_body_json(&app, req).await;
    let id = patient["id"].as_i64().unwrap();

    for (date, name) in [("2023-02-01", "IgG"), ("2024-02-01", "IgA")] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/patients/{id}/lab-results"))
            .set_json(json!({
                "test_date": date,
                "test_name": name,
                "value": 35.0,
                "unit": "mg/dL",
                "reference_low": 40.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/patients/{id}/lab-results"))
        .to_request();
    let labs: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<_> = labs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["test_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["IgA", "IgG"]);

    let req = test::TestRequest::post()
        .uri("/api/patients/999/vaccinations")
        .set_json(json!({ "vaccine_date": "2022-01-01", "vaccine_name": "BCG" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/patients/{id}/diagnosis"))
        .set_json(json!({ "diagnosis": "Ağır kombine immün yetmezlik", "diagnosis_date": "2024-03-01" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["diagnosis"], "Ağır kombine immün yetmezlik");
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Warning signs evaluated for a single assessment.
///
/// Field names on the wire are the keys the prediction service was trained
/// with. Missing fields deserialize as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalIndicators {
    #[serde(rename = "otit_4_ve_uzeri")]
    pub otitis_4_or_more: bool,
    #[serde(rename = "sinuzit_2_ve_uzeri")]
    pub sinusitis_2_or_more: bool,
    #[serde(rename = "antibiyotik_2_ay_uzeri")]
    pub antibiotics_2_months: bool,
    #[serde(rename = "pnomoni_2_ve_uzeri")]
    pub pneumonia_2_or_more: bool,
    #[serde(rename = "gelisme_geriligi")]
    pub failure_to_thrive: bool,
    #[serde(rename = "tekrarlayan_derin_apse")]
    pub recurrent_deep_abscess: bool,
    #[serde(rename = "inatci_pamukcuk")]
    pub persistent_thrush: bool,
    #[serde(rename = "iv_antibiyotik_gereksinimi")]
    pub iv_antibiotics: bool,
    #[serde(rename = "derin_enfeksiyon_2_ve_uzeri")]
    pub deep_infections_2_or_more: bool,
    #[serde(rename = "ailede_bagisiklik_yetmezligi")]
    pub family_history_pid: bool,
    #[serde(rename = "hastane_yatisi")]
    pub hospitalization: bool,
    #[serde(rename = "bcg_lenfadenopati")]
    pub bcg_lymphadenopathy: bool,
    #[serde(rename = "kronik_cilt_sorunu")]
    pub chronic_skin_issue: bool,
    #[serde(rename = "konjenital_kalp_hastaligi")]
    pub congenital_heart_disease: bool,
    #[serde(rename = "kronik_ishal")]
    pub chronic_diarrhea: bool,
    #[serde(rename = "yogun_bakim_yatisi")]
    pub icu_admission: bool,
    #[serde(rename = "akraba_evliligi")]
    pub parental_consanguinity: bool,
    #[serde(rename = "ailede_erken_olum")]
    pub early_family_death: bool,
}

/// Coarse risk bucket, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Düşük Risk",
            RiskLevel::Medium => "Orta Risk",
            RiskLevel::High => "Yüksek Risk",
            RiskLevel::VeryHigh => "Çok Yüksek Risk",
        }
    }

    /// Recognizes the labels the prediction service emits.
    pub fn from_label(label: &str) -> Option<Self> {
        // "Çok Yüksek" also contains "Yüksek"
        if label.contains("Çok Yüksek") {
            Some(RiskLevel::VeryHigh)
        } else if label.contains("Yüksek") {
            Some(RiskLevel::High)
        } else if label.contains("Orta") {
            Some(RiskLevel::Medium)
        } else if label.contains("Düşük") {
            Some(RiskLevel::Low)
        } else {
            None
        }
    }
}

/// Assessment request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(flatten)]
    pub indicators: ClinicalIndicators,
}

/// Immutable audit row written once per evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RiskAssessment {
    pub id: i64,
    pub patient_id: i64,
    pub assessed_at: DateTime<Utc>,
    pub rule_based_score: i32,
    pub rule_risk_level: String,
    pub ml_prediction: i32,
    pub ml_probability: Option<f64>,
    pub ml_risk_level: String,
    pub ml_message: Option<String>,
    pub final_risk_level: String,
    pub recommendation: String,
    /// Feature vector sent to the prediction service, as JSON
    pub features_json: String,
}

/// Everything needed to write a [`RiskAssessment`] row.
#[derive(Debug, Clone)]
pub struct NewRiskAssessment {
    pub patient_id: i64,
    pub assessed_at: DateTime<Utc>,
    pub rule_based_score: i32,
    pub rule_risk_level: RiskLevel,
    pub ml_prediction: i32,
    pub ml_probability: Option<f64>,
    pub ml_risk_level: String,
    pub ml_message: Option<String>,
    pub final_risk_level: RiskLevel,
    pub recommendation: String,
    pub features_json: String,
}

/// Aggregate view for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_patients: i64,
    pub total_assessments: i64,
    pub never_assessed: i64,
    /// Patients per mirrored final risk level label
    pub by_risk_level: Vec<RiskLevelCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RiskLevelCount {
    pub risk_level: String,
    pub patients: i64,
}

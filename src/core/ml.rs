//! Client for the external PID prediction service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::MlConfig;
use crate::models::ClinicalIndicators;

pub const URGENT_REFERRAL: &str =
    "Acil immünoloji konsültasyonu ve genetik test önerilir.";
pub const IMMUNOLOGY_REFERRAL: &str = "İmmünoloji bölümüne sevk önerilir; serum immünoglobulin düzeyleri ve lenfosit alt grup analizi yapılmalıdır.";
pub const FOLLOW_UP: &str = "6 ay içinde kontrol ve ek tetkikler önerilir.";
pub const ROUTINE_FOLLOW_UP: &str = "Rutin pediatrik takip önerilir.";

#[derive(Debug, thiserror::Error)]
pub enum MlError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Feature vector posted to `/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlFeatures {
    #[serde(flatten)]
    pub indicators: ClinicalIndicators,
    #[serde(rename = "yas")]
    pub age_years: f64,
    /// 1 male, 0 female
    #[serde(rename = "cinsiyet")]
    pub sex: u8,
    /// 0 when unknown
    #[serde(rename = "gobek_dusme_gunu")]
    pub cord_fall_day: i32,
}

/// Wire shape of the `/predict` response.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    // Some services emit the class as a float
    prediction: f64,
    probability: Option<f64>,
    risk_level: String,
    #[serde(default)]
    message: Option<String>,
}

/// Validated prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct MlPrediction {
    pub positive: bool,
    pub probability: Option<f64>,
    pub risk_level: String,
    pub message: Option<String>,
}

impl MlPrediction {
    pub fn prediction_code(&self) -> i32 {
        i32::from(self.positive)
    }

    pub fn recommendation(&self) -> &'static str {
        recommendation(self.positive, &self.risk_level)
    }
}

impl TryFrom<PredictResponse> for MlPrediction {
    type Error = MlError;

    fn try_from(response: PredictResponse) -> Result<Self, Self::Error> {
        let positive = match response.prediction {
            p if p == 0.0 => false,
            p if p == 1.0 => true,
            other => {
                return Err(MlError::InvalidResponse(format!(
                    "prediction must be 0 or 1, got {other}"
                )))
            }
        };
        if let Some(p) = response.probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(MlError::InvalidResponse(format!(
                    "probability out of range: {p}"
                )));
            }
        }
        Ok(Self {
            positive,
            probability: response.probability,
            risk_level: response.risk_level,
            message: response.message,
        })
    }
}

/// Canned recommendation for a prediction and the service's risk label.
pub fn recommendation(positive: bool, risk_level: &str) -> &'static str {
    if !positive {
        return ROUTINE_FOLLOW_UP;
    }
    if risk_level.contains("Çok Yüksek") {
        URGENT_REFERRAL
    } else if risk_level.contains("Yüksek") {
        IMMUNOLOGY_REFERRAL
    } else {
        FOLLOW_UP
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskPredictor: Send + Sync {
    async fn predict(&self, features: &MlFeatures) -> Result<MlPrediction, MlError>;
}

/// HTTP implementation of [`RiskPredictor`].
#[derive(Debug, Clone)]
pub struct MlClient {
    client: Client,
    predict_url: Url,
}

impl MlClient {
    pub fn new(config: &MlConfig) -> Result<Self, MlError> {
        let mut base = Url::parse(&config.service_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let predict_url = base.join("predict")?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            predict_url,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }
}

#[async_trait]
impl RiskPredictor for MlClient {
    #[instrument(skip(self, features), fields(url = %self.predict_url))]
    async fn predict(&self, features: &MlFeatures) -> Result<MlPrediction, MlError> {
        let response = self
            .client
            .post(self.predict_url.clone())
            .json(features)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MlError::Status(status.as_u16()));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| MlError::InvalidResponse(e.to_string()))?;
        debug!(prediction = body.prediction, risk_level = %body.risk_level, "prediction received");

        body.try_into()
    }
}

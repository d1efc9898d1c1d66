pub mod assessment;
pub mod patient;
pub mod records;

pub use assessment::{ClinicalIndicators, RiskAssessment, RiskLevel};
pub use patient::{Gender, NewPatient, Patient};

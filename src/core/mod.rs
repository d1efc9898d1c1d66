//! Risk assessment: rule table, ML client and the pipeline tying them to
//! the database.

pub mod assessment;
pub mod ml;
pub mod rules;

pub use assessment::AssessmentService;
pub use ml::{MlClient, RiskPredictor};

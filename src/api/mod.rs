//! HTTP API
//!
//! JSON endpoints for the patient registry and risk assessments.

pub mod handlers;
pub mod routes;

pub use routes::configure;

use crate::core::AssessmentService;
use crate::db::Database;

/// Application state shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub assessments: AssessmentService,
}

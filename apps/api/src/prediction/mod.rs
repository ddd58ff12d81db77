//! Scoring a job posting: field assembly, the shared service, and the
//! threshold/confidence rules applied to the model output.

pub mod confidence;
pub mod posting;
pub mod service;

pub use confidence::{ConfidenceLevel, Label, PredictionResult};
pub use posting::JobPosting;
pub use service::{PredictionError, PredictionService};

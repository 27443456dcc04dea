//! Feedback Sentiment Core
//!
//! Types and errors shared across the feedback sentiment crates:
//! - The `/analyze` request and response schema
//! - The fallback result returned when classification fails
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{AnalysisResult, FeedbackRequest, FALLBACK_LABEL, FALLBACK_SCORE};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{AnalysisResult, FeedbackRequest};
}

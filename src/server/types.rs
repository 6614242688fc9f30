use serde::{Deserialize, Serialize};

/// Message returned for every failure other than a rejected method.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn generic() -> Self {
        Self {
            error: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

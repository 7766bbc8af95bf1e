use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Acknowledgement sent back to the recorder for every stored event
#[derive(Debug, Serialize, Deserialize)]
pub struct EventReceivedResponse {
    pub status: String,
    pub message: String,
}

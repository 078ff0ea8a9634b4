//! Email message and dispatch error models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One templated email handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub template_id: String,
    pub template_data: Value,
}

/// Failure reported by an email transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Dispatch timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

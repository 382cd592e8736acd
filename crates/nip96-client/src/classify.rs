//! Classification of upload responses.
//!
//! A 2xx response is either still processing, complete, or an application-level
//! rejection. Anything else is a rejection whose message is chosen in a fixed
//! order: the server's structured error message, then the status explanation
//! table, then the raw status code.

use nip96_core::{PartialEvent, ProcessingStatus, StatusExplanations, StatusKind, StatusMessage};

/// Result of classifying the initial upload response.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server is working on the file; poll `processing_url`.
    Processing(ProcessingStatus),
    /// The upload is final.
    Completed(PartialEvent),
    /// The server declined the upload.
    Rejected { message: String },
}

/// Classify an upload response by status code and body.
pub fn classify_upload_response(
    status: u16,
    body: &str,
    explanations: &StatusExplanations,
) -> UploadOutcome {
    if !(200..300).contains(&status) {
        return UploadOutcome::Rejected {
            message: explain_failure(status, body, explanations, "Upload"),
        };
    }

    match serde_json::from_str::<ProcessingStatus>(body) {
        Ok(parsed) => classify_status(parsed),
        Err(e) => {
            tracing::debug!(status, error = %e, "Unreadable upload response body");
            UploadOutcome::Rejected {
                message: format!("Upload failed: unreadable response (HTTP {})", status),
            }
        }
    }
}

/// Branch on a parsed 2xx body.
pub fn classify_status(status: ProcessingStatus) -> UploadOutcome {
    if status.processing_url().is_some() {
        return UploadOutcome::Processing(status);
    }

    match (status.kind(), status.final_payload) {
        (StatusKind::Success, Some(payload)) => UploadOutcome::Completed(payload),
        _ => {
            let message = match non_blank(status.message) {
                Some(message) => message,
                None => format!(
                    "Upload failed with status {}",
                    status.status.as_deref().unwrap_or("unknown")
                ),
            };
            UploadOutcome::Rejected { message }
        }
    }
}

/// Message for a non-2xx response: structured message, table explanation, raw code.
pub fn explain_failure(
    status: u16,
    body: &str,
    explanations: &StatusExplanations,
    action: &str,
) -> String {
    if let Ok(parsed) = serde_json::from_str::<StatusMessage>(body) {
        if parsed.kind() == StatusKind::Error {
            if let Some(message) = parsed.message() {
                return message.to_string();
            }
        }
    }

    if let Some(explanation) = explanations.explain(status) {
        return explanation.to_string();
    }

    format!("{} failed with HTTP status {}", action, status)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

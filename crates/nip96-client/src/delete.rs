//! Interpretation of delete responses.

use nip96_core::{DeleteOutcome, StatusExplanations, StatusKind, StatusMessage};

use crate::classify::explain_failure;
use crate::error::{Nip96Error, Nip96Result};

/// Map a delete response to an outcome.
///
/// A 2xx answer succeeds only when its body says `"status": "success"`; a body
/// that cannot be read counts as not succeeded. Other statuses fail with
/// [`Nip96Error::Deletion`] using the same message order as uploads.
pub fn interpret_delete_response(
    status: u16,
    body: &str,
    explanations: &StatusExplanations,
) -> Nip96Result<DeleteOutcome> {
    if !(200..300).contains(&status) {
        return Err(Nip96Error::Deletion {
            message: explain_failure(status, body, explanations, "Delete"),
        });
    }

    let parsed = serde_json::from_str::<StatusMessage>(body).unwrap_or_default();
    Ok(DeleteOutcome {
        succeeded: parsed.kind() == StatusKind::Success,
        raw_status: parsed.status,
    })
}

use serde::{Deserialize, Serialize};

use super::{non_blank, PartialEvent};

/// Normalized value of the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Processing,
    Unknown,
}

impl StatusKind {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("success") => StatusKind::Success,
            Some("error") => StatusKind::Error,
            Some("processing") => StatusKind::Processing,
            _ => StatusKind::Unknown,
        }
    }
}

/// Body of an upload or processing-status response.
///
/// A non-blank `processing_url` with `percentage < 100` means the server is still
/// working; a final payload without a processing URL means the upload is done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub processing_url: Option<String>,
    /// 0..=100
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default, rename = "nip94_event")]
    pub final_payload: Option<PartialEvent>,
}

impl ProcessingStatus {
    pub fn kind(&self) -> StatusKind {
        StatusKind::parse(self.status.as_deref())
    }

    pub fn processing_url(&self) -> Option<&str> {
        non_blank(self.processing_url.as_deref())
    }

    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }

    /// Reported percentage, treating a missing value as complete.
    pub fn percentage_or_complete(&self) -> f64 {
        self.percentage.unwrap_or(100.0)
    }

    pub fn is_processing(&self) -> bool {
        self.processing_url().is_some() && self.percentage_or_complete() < 100.0
    }

    /// Progress in `[0, 1]`.
    pub fn progress_fraction(&self) -> f32 {
        let pct = self.percentage_or_complete();
        if pct.is_nan() {
            return 1.0;
        }
        (pct.clamp(0.0, 100.0) / 100.0) as f32
    }
}

/// `{status, message}` body returned by error responses and deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusMessage {
    pub fn kind(&self) -> StatusKind {
        StatusKind::parse(self.status.as_deref())
    }

    pub fn message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_processing_response() {
        let status: ProcessingStatus = serde_json::from_str(
            r#"{"status":"processing","message":"queued","processing_url":"https://x/p/1","percentage":40,"extra":true}"#,
        )
        .unwrap();
        assert_eq!(status.kind(), StatusKind::Processing);
        assert!(status.is_processing());
        assert!((status.progress_fraction() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn blank_processing_url_is_not_processing() {
        let status: ProcessingStatus =
            serde_json::from_str(r#"{"status":"processing","processing_url":"  ","percentage":10}"#)
                .unwrap();
        assert_eq!(status.processing_url(), None);
        assert!(!status.is_processing());
    }

    #[test]
    fn missing_percentage_counts_as_complete() {
        let status: ProcessingStatus =
            serde_json::from_str(r#"{"status":"processing","processing_url":"https://x/p"}"#)
                .unwrap();
        assert!(!status.is_processing());
        assert_eq!(status.progress_fraction(), 1.0);
    }

    #[test]
    fn progress_is_clamped() {
        let over = ProcessingStatus {
            percentage: Some(250.0),
            ..Default::default()
        };
        let under = ProcessingStatus {
            percentage: Some(-5.0),
            ..Default::default()
        };
        assert_eq!(over.progress_fraction(), 1.0);
        assert_eq!(under.progress_fraction(), 0.0);
    }

    #[test]
    fn unknown_status_text() {
        assert_eq!(StatusKind::parse(Some("queued")), StatusKind::Unknown);
        assert_eq!(StatusKind::parse(None), StatusKind::Unknown);
    }

    #[test]
    fn final_payload_reads_nip94_event() {
        let status: ProcessingStatus = serde_json::from_str(
            r#"{"status":"success","nip94_event":{"tags":[["url","https://x/a.png"]],"content":""}}"#,
        )
        .unwrap();
        let payload = status.final_payload.unwrap();
        assert_eq!(payload.tag_value("url"), Some("https://x/a.png"));
    }
}

//! Upload request and multipart body construction.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::io::Cursor;
use std::pin::Pin;

use nip96_core::extension_for;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::{Nip96Error, Nip96Result};

const FILENAME_TOKEN_LEN: usize = 16;

/// Byte stream consumed exactly once by the upload.
pub type ByteSource = Pin<Box<dyn AsyncRead + Send + Sync>>;

/// A file to upload and its metadata.
///
/// `length` must be the exact number of bytes `source` yields; a mismatch
/// surfaces as a transport error.
pub struct UploadRequest {
    pub source: ByteSource,
    pub length: u64,
    pub content_type: Option<String>,
    pub alt: Option<String>,
    /// Reason shown before the media is revealed (`content-warning`).
    pub content_warning: Option<String>,
}

impl Debug for UploadRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("UploadRequest")
            .field("length", &self.length)
            .field("content_type", &self.content_type)
            .field("alt", &self.alt)
            .field("content_warning", &self.content_warning)
            .finish()
    }
}

impl UploadRequest {
    pub fn new(source: impl AsyncRead + Send + Sync + 'static, length: u64) -> Self {
        Self {
            source: Box::pin(source),
            length,
            content_type: None,
            alt: None,
            content_warning: None,
        }
    }

    /// Upload an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let length = data.len() as u64;
        Self::new(Cursor::new(data), length)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_content_warning(mut self, reason: impl Into<String>) -> Self {
        self.content_warning = Some(reason.into());
        self
    }

    fn content_type(&self) -> Option<&str> {
        non_blank(self.content_type.as_deref())
    }

    /// Text fields of the form, in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("expiration", String::new()),
            ("size", self.length.to_string()),
        ];
        let optional = [
            ("alt", self.alt.as_deref()),
            ("content-warning", self.content_warning.as_deref()),
            ("content_type", self.content_type.as_deref()),
        ];
        for (name, value) in optional {
            if let Some(value) = non_blank(value) {
                fields.push((name, value.to_string()));
            }
        }
        fields
    }

    /// Random token plus the extension derived from the content type.
    pub fn file_name(&self) -> String {
        let token = random_filename_token();
        match self.content_type().map(extension_for) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", token, ext),
            _ => token,
        }
    }

    /// Build the multipart body. The file part streams from `source` with its
    /// length declared up front, so the payload is never buffered.
    pub fn into_form(self) -> Nip96Result<(Form, String)> {
        let file_name = self.file_name();
        let mut form = Form::new();
        for (name, value) in self.form_fields() {
            form = form.text(name, value);
        }

        let body = Body::wrap_stream(ReaderStream::new(self.source));
        let mut part = Part::stream_with_length(body, self.length).file_name(file_name.clone());
        if let Some(content_type) = non_blank(self.content_type.as_deref()) {
            part = part.mime_str(content_type).map_err(|e| {
                Nip96Error::InvalidRequest(format!("Invalid content type {}: {}", content_type, e))
            })?;
        }

        Ok((form.part("file", part), file_name))
    }
}

/// 16 characters from `[a-zA-Z0-9]`.
pub fn random_filename_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(FILENAME_TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_tokens_are_alphanumeric() {
        for _ in 0..10_000 {
            let token = random_filename_token();
            assert_eq!(token.len(), 16);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn file_name_uses_content_type_extension() {
        let png = UploadRequest::from_bytes(vec![1, 2, 3]).with_content_type("image/png");
        let name = png.file_name();
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 16 + 4);

        let unknown = UploadRequest::from_bytes(vec![1]).with_content_type("application/x-thing");
        assert_eq!(unknown.file_name().len(), 16);

        let untyped = UploadRequest::from_bytes(vec![1]);
        assert!(!untyped.file_name().contains('.'));
    }

    #[test]
    fn required_fields_always_present() {
        let request = UploadRequest::from_bytes(vec![0; 42]);
        assert_eq!(
            request.form_fields(),
            vec![("expiration", String::new()), ("size", "42".to_string())]
        );
    }

    #[test]
    fn optional_fields_only_when_non_blank() {
        let request = UploadRequest::from_bytes(vec![0; 3])
            .with_alt("a cat")
            .with_content_warning("  ")
            .with_content_type("image/jpeg");
        assert_eq!(
            request.form_fields(),
            vec![
                ("expiration", String::new()),
                ("size", "3".to_string()),
                ("alt", "a cat".to_string()),
                ("content_type", "image/jpeg".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_content_type_is_rejected() {
        let request = UploadRequest::from_bytes(vec![0]).with_content_type("not a mime");
        assert!(matches!(
            request.into_form(),
            Err(Nip96Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn form_is_built_for_valid_request() {
        let request = UploadRequest::from_bytes(b"hello".to_vec()).with_content_type("text/plain");
        let (form, file_name) = request.into_form().unwrap();
        assert!(file_name.ends_with(".txt"));
        assert!(!form.boundary().is_empty());
    }
}

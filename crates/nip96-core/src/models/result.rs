use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel dimensions, written `<width>x<height>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once('x')
            .ok_or_else(|| format!("Invalid dimension: {}", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid width in dimension: {}", s))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid height in dimension: {}", s))?;
        Ok(Dimension { width, height })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Normalized outcome of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUploadResult {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    /// Hash of the original file as uploaded (`ox` tag).
    pub sha256_hash: Option<String>,
    pub dimension: Option<Dimension>,
    pub magnet_link: Option<String>,
}

/// Outcome of a delete request that the server answered with 2xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub succeeded: bool,
    pub raw_status: Option<String>,
}

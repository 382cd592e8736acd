use serde::{Deserialize, Serialize};

/// The subset of a Nostr event returned by the server once an upload is final.
///
/// Tags are positional: element 0 is the tag name, the rest are tag-specific values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialEvent {
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: Option<String>,
}

impl PartialEvent {
    /// Value of the first tag named `name` that carries one.
    ///
    /// Tags without a value are skipped like unknown ones. A blank value on the
    /// first candidate still wins and reads as absent.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.len() > 1 && tag[0] == name)
            .map(|tag| tag[1].as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

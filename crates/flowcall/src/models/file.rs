use serde::Serialize;

/// A file ready to travel inside a request: its bytes as standard base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub content: String,
}

impl EncodedFile {
    pub fn new<N, T, C>(name: N, media_type: T, content: C) -> Self
    where
        N: Into<String>,
        T: Into<String>,
        C: Into<String>,
    {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content: content.into(),
        }
    }
}

use std::fmt;

/// Body of an API response decoded on a best-effort basis.
/// The raw text is preserved if the body isn't valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    Json(serde_json::Value),
    Text(String),
}

impl ApiPayload {
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(json) => Self::Json(json),
            Err(_) => Self::Text(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Returns the value of the top-level string field if this is a JSON object
    pub fn str_field(&self, key: &str) -> Option<&str> {
        match self {
            Self::Json(json) => json.get(key)?.as_str(),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ApiPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(json) => fmt::Display::fmt(json, f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

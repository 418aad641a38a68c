use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Parameters of a single image post. They are not validated locally,
/// the API is the source of truth for what's acceptable.
#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct PublishRequest {
    /// Publicly reachable URL of the image. The API downloads it by itself.
    pub image_url: String,
    pub caption: String,

    #[derivative(Debug = "ignore")]
    pub access_token: String,

    pub instagram_account_id: String,
}

/// Server-side staging object that represents a not-yet-published post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    creation_id: String,
}

impl ContainerHandle {
    pub(crate) fn new(creation_id: String) -> Self {
        Self { creation_id }
    }

    pub fn creation_id(&self) -> &str {
        &self.creation_id
    }
}

/// JSON body returned by the publishing step passed through as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishResult(serde_json::Value);

impl PublishResult {
    pub(crate) fn new(json: serde_json::Value) -> Self {
        Self(json)
    }

    /// ID of the published media, if the API returned one
    pub fn media_id(&self) -> Option<&str> {
        self.0.get("id")?.as_str()
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}

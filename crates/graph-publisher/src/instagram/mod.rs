//! Publishing of image posts to Instagram via the content publishing flow
//! of the Graph API: a media container is created first, and then it is
//! published as a separate step.
//!
//! API docs: <https://developers.facebook.com/docs/instagram-platform/content-publishing>
mod model;
mod observer;
mod publisher;

use crate::http::ApiPayload;
use derivative::Derivative;
use reqwest::StatusCode;
use serde::Deserialize;

pub use model::*;
pub use observer::*;
pub use publisher::*;

#[derive(Derivative, Clone, Deserialize)]
#[derivative(Debug)]
pub struct Config {
    #[derivative(Debug = "ignore")]
    pub(crate) access_token: String,

    pub(crate) account_id: String,

    #[serde(default = "crate::graph::default_api_url")]
    pub(crate) graph_api_url: url::Url,
}

impl Config {
    pub(crate) const ENV_PREFIX: &'static str = "INSTAGRAM_";

    /// Creates the request to publish the given image on behalf of the
    /// configured account
    pub(crate) fn publish_request(&self, image_url: String, caption: String) -> PublishRequest {
        PublishRequest {
            image_url,
            caption,
            access_token: self.access_token.clone(),
            instagram_account_id: self.account_id.clone(),
        }
    }
}

/// The step of the publishing flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PublishStage {
    ContainerCreation,
    Publish,
}

#[derive(Debug, thiserror::Error)]
pub enum InstagramError {
    #[error("Container creation failed (HTTP status: {status}): {payload}")]
    ContainerCreation {
        status: StatusCode,
        payload: ApiPayload,
    },

    /// The API reported success, but there is no usable creation ID in the response
    #[error("Container creation returned no usable `id` (HTTP status: {status}): {payload}")]
    MalformedContainer {
        status: StatusCode,
        payload: ApiPayload,
    },

    #[error("Publishing failed (HTTP status: {status}): {payload}")]
    Publish {
        status: StatusCode,
        payload: ApiPayload,
    },
}

impl InstagramError {
    pub fn stage(&self) -> PublishStage {
        match self {
            Self::ContainerCreation { .. } | Self::MalformedContainer { .. } => {
                PublishStage::ContainerCreation
            }
            Self::Publish { .. } => PublishStage::Publish,
        }
    }

    /// The response payload returned by the API
    pub fn payload(&self) -> &ApiPayload {
        match self {
            Self::ContainerCreation { payload, .. }
            | Self::MalformedContainer { payload, .. }
            | Self::Publish { payload, .. } => payload,
        }
    }
}

/// Publishes the image post using a fresh HTTP client and the public Graph API.
/// Failures are logged via [`TracingObserver`].
pub async fn publish(request: &PublishRequest) -> crate::Result<PublishResult> {
    let http = crate::http::create_client()?;
    MediaPublisher::new(http, crate::graph::default_api_url())
        .publish(request)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display() {
        assert_eq!(PublishStage::ContainerCreation.to_string(), "container_creation");
        assert_eq!(PublishStage::Publish.to_string(), "publish");
    }

    #[test_log::test(tokio::test)]
    #[ignore]
    async fn manual_sandbox() {
        let _ = dotenvy::dotenv();

        let cfg: Config = crate::config::from_env_or_panic(Config::ENV_PREFIX);

        let request = cfg.publish_request(
            "https://upload.wikimedia.org/wikipedia/commons/4/47/PNG_transparency_demonstration_1.png"
                .to_owned(),
            "Sandbox post".to_owned(),
        );

        let result = publish(&request).await.unwrap();

        eprintln!("{result:#?}");
    }
}

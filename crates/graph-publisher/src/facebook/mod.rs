//! Publishing of photos to a Facebook page on behalf of the page access token.
//!
//! API docs: <https://developers.facebook.com/docs/graph-api/reference/page/photos>
mod client;
mod model;

use crate::http::ApiPayload;
use derivative::Derivative;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

pub use client::*;
pub use model::*;

#[serde_as]
#[derive(Derivative, Clone, Deserialize)]
#[derivative(Debug)]
pub struct Config {
    #[derivative(Debug = "ignore")]
    pub(crate) access_token: String,

    #[serde(default = "crate::graph::default_api_url")]
    pub(crate) graph_api_url: url::Url,

    /// If set, relayed photos are scheduled to be published after this delay
    /// instead of being published immediately.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub(crate) schedule_delay_secs: Option<Duration>,
}

impl Config {
    pub(crate) const ENV_PREFIX: &'static str = "FACEBOOK_";
}

#[derive(Debug, thiserror::Error)]
pub enum FacebookError {
    #[error("Publishing a photo failed (HTTP status: {status}): {payload}")]
    PublishPhoto {
        status: StatusCode,
        payload: ApiPayload,
    },
}

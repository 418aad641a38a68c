//! Source of the images to relay: posts from the "hot" listing of a subreddit.
mod client;
mod model;

use serde::Deserialize;

pub use client::*;
pub use model::*;

crate::util::url::def!(www_reddit_com, "https://www.reddit.com");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_subreddit")]
    pub(crate) subreddit: String,

    #[serde(default = "default_api_url")]
    pub(crate) api_url: url::Url,
}

impl Config {
    pub(crate) const ENV_PREFIX: &'static str = "REDDIT_";
}

fn default_subreddit() -> String {
    "ProgrammerHumor".to_owned()
}

fn default_api_url() -> url::Url {
    www_reddit_com::<&str>([])
}

#[derive(Debug, thiserror::Error)]
pub enum RedditError {
    #[error("Subreddit name must not be empty")]
    EmptySubreddit,
}

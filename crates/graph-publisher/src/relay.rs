//! Periodic relaying of the top image post from reddit to the configured
//! publishing targets.
use crate::facebook::{FacebookClient, PagePhoto};
use crate::instagram::MediaPublisher;
use crate::prelude::*;
use crate::reddit::{ImagePost, RedditClient};
use crate::{facebook, instagram, reddit, Result};
use chrono::prelude::*;
use futures::prelude::*;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_interval")]
    pub(crate) interval_secs: Duration,
}

impl Config {
    pub(crate) const ENV_PREFIX: &'static str = "RELAY_";
}

fn default_interval() -> Duration {
    Duration::from_secs(6 * 60 * 60)
}

pub(crate) struct RelayOptions {
    pub(crate) http: crate::http::Client,
    pub(crate) relay: Config,
    pub(crate) reddit: reddit::Config,
    pub(crate) facebook: Option<facebook::Config>,
    pub(crate) instagram: Option<instagram::Config>,
}

struct FacebookTarget {
    client: FacebookClient,
    schedule_delay: Option<Duration>,
}

struct InstagramTarget {
    publisher: MediaPublisher,
    cfg: instagram::Config,
}

/// Outcome of a single relay iteration
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RelayReport {
    pub(crate) post: Option<ImagePost>,
    pub(crate) published: Vec<Target>,
    pub(crate) failed: Vec<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Facebook,
    Instagram,
}

pub(crate) struct Relay {
    reddit: RedditClient,
    subreddit: String,
    interval: Duration,
    facebook: Option<FacebookTarget>,
    instagram: Option<InstagramTarget>,
}

impl Relay {
    pub(crate) fn new(opts: RelayOptions) -> Self {
        let RelayOptions {
            http,
            relay,
            reddit,
            facebook,
            instagram,
        } = opts;

        let facebook = facebook.map(|cfg| FacebookTarget {
            schedule_delay: cfg.schedule_delay_secs,
            client: FacebookClient::new(cfg, http.clone()),
        });

        let instagram = instagram.map(|cfg| InstagramTarget {
            publisher: MediaPublisher::new(http.clone(), cfg.graph_api_url.clone()),
            cfg,
        });

        Self {
            subreddit: reddit.subreddit.clone(),
            reddit: RedditClient::new(reddit, http),
            interval: relay.interval_secs,
            facebook,
            instagram,
        }
    }

    /// Relays posts until the `shutdown` future resolves. Failures don't stop
    /// the loop, they are logged and the next attempt is made after the interval.
    pub(crate) async fn run(self, shutdown: impl Future<Output = ()>) {
        if self.facebook.is_none() && self.instagram.is_none() {
            warn!("No publishing targets are configured, posts will only be looked up");
        }

        let relay_loop = async {
            loop {
                match self.relay_once().with_duration_log("Relay iteration").await {
                    Ok(report) => report.log(),
                    Err(err) => error!(err = tracing_err(&err), "Relay iteration failed"),
                }

                info!(
                    interval = tracing_duration(self.interval),
                    "Waiting before the next post..."
                );

                tokio::time::sleep(self.interval).await;
            }
        };

        tokio::select! {
            () = relay_loop => {}
            () = shutdown => info!("Shutdown requested, stopping the relay"),
        }
    }

    pub(crate) async fn relay_once(&self) -> Result<RelayReport> {
        let Some(post) = self.reddit.top_image_post(&self.subreddit).await? else {
            return Ok(RelayReport::default());
        };

        let mut report = RelayReport::default();

        if let Some(target) = &self.facebook {
            let outcome = self.publish_to_facebook(target, &post).await;
            report.record(Target::Facebook, outcome);
        }

        if let Some(target) = &self.instagram {
            let request = target
                .cfg
                .publish_request(post.url.clone(), post.title.clone());

            // The publisher logs the failures on its own
            let outcome = target.publisher.publish(&request).await.map(drop);
            report.record(Target::Instagram, outcome);
        }

        report.post = Some(post);

        Ok(report)
    }

    async fn publish_to_facebook(&self, target: &FacebookTarget, post: &ImagePost) -> Result {
        let scheduled_publish_time = target
            .schedule_delay
            .map(chrono::Duration::from_std)
            .transpose()
            .fatal_ctx(|| "Facebook schedule delay is out of range")?
            .map(|delay| Utc::now() + delay);

        let photo = PagePhoto {
            url: post.url.clone(),
            caption: post.title.clone(),
            scheduled_publish_time,
        };

        target
            .client
            .publish_photo(&photo)
            .await
            .map(drop)
            .map_err(|err| {
                error!(err = tracing_err(&err), "Error publishing to Facebook");
                err
            })
    }
}

impl RelayReport {
    fn log(&self) {
        let Some(post) = &self.post else {
            info!("There was nothing to relay");
            return;
        };

        info!(
            url = %post.url,
            published = ?self.published,
            failed = ?self.failed,
            "Relayed the post"
        );
    }

    fn record(&mut self, target: Target, outcome: Result) {
        match outcome {
            Ok(()) => self.published.push(target),
            Err(_) => self.failed.push(target),
        }
    }
}

use crate::facebook::{FacebookClient, PagePhoto};
use crate::instagram::MediaPublisher;
use crate::prelude::*;
use crate::relay::{Relay, RelayOptions};
use crate::{facebook, fatal, http, instagram, Config, Result};
use chrono::prelude::*;
use futures::prelude::*;
use serde::Serialize;

/// Publishes images to Instagram and Facebook pages via the Graph API
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Publish a single image post to the Instagram account
    PublishInstagram(PostArgs),

    /// Publish a single photo to the Facebook page
    PublishFacebook {
        #[command(flatten)]
        post: PostArgs,

        /// Schedule the photo to be published after the given number of seconds
        #[arg(long)]
        schedule_in_secs: Option<u32>,
    },

    /// Periodically relay the top image post from the subreddit to all the
    /// configured targets until Ctrl+C is pressed
    Relay,
}

#[derive(Debug, clap::Args)]
struct PostArgs {
    /// Publicly reachable URL of the image
    #[arg(long)]
    image_url: String,

    #[arg(long, default_value = "")]
    caption: String,
}

impl Cli {
    pub async fn run(self, config: Config, shutdown: impl Future<Output = ()>) -> Result {
        let http = http::create_client()?;

        match self.cmd {
            Cmd::PublishInstagram(post) => {
                let cfg = require_section(config.instagram, instagram::Config::ENV_PREFIX)?;
                let request = cfg.publish_request(post.image_url, post.caption);

                let result = MediaPublisher::new(http, cfg.graph_api_url)
                    .publish(&request)
                    .await?;

                print_json(&result)
            }
            Cmd::PublishFacebook {
                post,
                schedule_in_secs,
            } => {
                let cfg = require_section(config.facebook, facebook::Config::ENV_PREFIX)?;

                let photo = PagePhoto {
                    url: post.image_url,
                    caption: post.caption,
                    scheduled_publish_time: schedule_in_secs
                        .map(|secs| Utc::now() + chrono::Duration::seconds(secs.into())),
                };

                let result = FacebookClient::new(cfg, http).publish_photo(&photo).await?;

                print_json(&result)
            }
            Cmd::Relay => {
                let opts = RelayOptions {
                    http,
                    relay: config.relay,
                    reddit: config.reddit,
                    facebook: config.facebook,
                    instagram: config.instagram,
                };

                Relay::new(opts).run(shutdown).await;

                Ok(())
            }
        }
    }
}

fn require_section<T>(section: Option<T>, env_prefix: &str) -> Result<T> {
    section.ok_or_else(|| fatal!("No config with {env_prefix} env vars prefix was provided"))
}

fn print_json(value: &impl Serialize) -> Result {
    let json = serde_json::to_string_pretty(value).fatal_ctx(|| "Failed to serialize the result")?;
    println!("{json}");
    Ok(())
}

use super::{Config, ImagePost, Listing, RedditError};
use crate::prelude::*;
use crate::{err, http, Result};

pub struct RedditClient {
    http: http::Client,
    api_url: url::Url,
}

impl RedditClient {
    pub fn new(cfg: Config, http: http::Client) -> Self {
        Self {
            http,
            api_url: cfg.api_url,
        }
    }

    /// Returns the first image post from the first page of the subreddit's
    /// "hot" listing, if there is any.
    ///
    /// API docs: <https://www.reddit.com/dev/api#GET_hot>
    #[instrument(skip(self))]
    pub async fn top_image_post(&self, subreddit: &str) -> Result<Option<ImagePost>> {
        if subreddit.is_empty() {
            return Err(err!(RedditError::EmptySubreddit));
        }

        let url = self.api_url.join_segments(["r", subreddit, "hot.json"])?;

        let post = self.http.get(url).read_json::<Listing>().await?.first_image_post();

        match &post {
            Some(post) => info!(url = %post.url, title = %post.title, "Found an image post"),
            None => info!("No image posts found"),
        }

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClientError;
    use crate::ErrorKind;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RedditClient {
        let cfg = Config {
            subreddit: "ProgrammerHumor".to_owned(),
            api_url: server.uri().parse().unwrap(),
        };
        RedditClient::new(cfg, http::create_client().unwrap())
    }

    #[test_log::test(tokio::test)]
    async fn fetches_top_image_post() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/ProgrammerHumor/hot.json"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "Listing",
                "data": {
                    "after": "t3_xyz",
                    "children": [
                        { "kind": "t3", "data": { "title": "Rules", "url": "https://www.reddit.com/r/ProgrammerHumor/about/rules" } },
                        { "kind": "t3", "data": { "title": "It works on my machine", "url": "https://i.redd.it/abc.png" } },
                    ],
                },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let post = client(&server)
            .top_image_post("ProgrammerHumor")
            .await
            .unwrap();

        assert_eq!(
            post,
            Some(ImagePost {
                url: "https://i.redd.it/abc.png".to_owned(),
                title: "It works on my machine".to_owned(),
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn error_status_is_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/ProgrammerHumor/hot.json"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let err = client(&server)
            .top_image_post("ProgrammerHumor")
            .await
            .unwrap_err();

        assert_matches!(
            err.kind(),
            ErrorKind::HttpClient {
                source: HttpClientError::BadResponseStatusCode { body, .. }
            } if body == "Too Many Requests"
        );
    }

    #[test_log::test(tokio::test)]
    async fn unexpected_json_shape() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/r/ProgrammerHumor/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Forbidden" })))
            .mount(&server)
            .await;

        let err = client(&server)
            .top_image_post("ProgrammerHumor")
            .await
            .unwrap_err();

        assert_matches!(
            err.kind(),
            ErrorKind::HttpClient {
                source: HttpClientError::UnexpectedResponseJsonShape { .. }
            }
        );
    }

    #[test_log::test(tokio::test)]
    async fn empty_subreddit_is_rejected() {
        let server = MockServer::start().await;

        let err = client(&server).top_image_post("").await.unwrap_err();

        assert_matches!(
            err.kind(),
            ErrorKind::Reddit {
                source: RedditError::EmptySubreddit
            }
        );
    }
}

use super::{FacebookError, PagePhoto, PhotoPostResult};
use crate::http::{self, ApiPayload, HttpClientError};
use crate::prelude::*;
use crate::{err, err_ctx, Result};

pub struct FacebookClient {
    http: http::Client,
    graph_api_url: url::Url,
    access_token: String,
}

impl FacebookClient {
    pub fn new(cfg: super::Config, http: http::Client) -> Self {
        Self {
            http,
            graph_api_url: cfg.graph_api_url,
            access_token: cfg.access_token,
        }
    }

    #[instrument(skip_all, fields(url = %photo.url))]
    pub async fn publish_photo(&self, photo: &PagePhoto) -> Result<PhotoPostResult> {
        let url = self.graph_api_url.join_segments(["me", "photos"])?;

        let response = self
            .http
            .post(url)
            .query(&photo.to_query())
            .query(&[("access_token", &self.access_token)])
            .send_raw()
            .await?;

        let status = response.status;

        if !status.is_success() {
            let payload = ApiPayload::from_body(&response.body);
            return Err(err!(FacebookError::PublishPhoto { status, payload }));
        }

        let result: PhotoPostResult = serde_json::from_slice(&response.body)
            .map_err(err_ctx!(HttpClientError::UnexpectedResponseJsonShape))?;

        info!(
            photo_id = %result.id,
            post_id = result.post_id.as_deref(),
            "Published Facebook photo"
        );

        Ok(result)
    }
}
